use crate::index::Entry;
use crate::tui::state::AppMode;
use anyhow::Result;
use crossterm::event::KeyCode;

pub struct InfoContext<'a> {
    pub mode: &'a mut AppMode,
    pub info: &'a mut Option<Entry>,
}

pub fn handle_info_key(ctx: &mut InfoContext, code: KeyCode) -> Result<()> {
    if matches!(
        code,
        KeyCode::Enter | KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('q')
    ) {
        *ctx.info = None;
        *ctx.mode = AppMode::Browse;
    }
    Ok(())
}

pub struct HelpContext<'a> {
    pub mode: &'a mut AppMode,
    pub prev_mode: &'a mut Option<AppMode>,
}

pub fn handle_help_key(ctx: &mut HelpContext, code: KeyCode) -> Result<()> {
    if matches!(code, KeyCode::Char('q') | KeyCode::Esc | KeyCode::Char('?')) {
        *ctx.mode = ctx.prev_mode.unwrap_or(AppMode::Browse);
        *ctx.prev_mode = None;
    }
    Ok(())
}
