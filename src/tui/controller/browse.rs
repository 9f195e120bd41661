use crate::index::{path, DirectoryIndex};
use crate::tui::logic::navigation::{navigate_down, navigate_up, reset_selection};
use crate::tui::state::{AppMode, BrowseState, PendingLoad, StatusMessage};
use anyhow::Result;
use crossterm::event::KeyCode;
use ratatui::widgets::ListState;

pub struct BrowseContext<'a> {
    pub index: &'a mut DirectoryIndex,
    pub browse: &'a mut BrowseState,
    pub list_state: &'a mut ListState,
    pub mode: &'a mut AppMode,
    pub prev_mode: &'a mut Option<AppMode>,
    pub should_quit: &'a mut bool,
}

/// Navigation changed the directory: the new one may need parts loaded.
fn navigated(ctx: &mut BrowseContext) {
    ctx.browse.status = None;
    ctx.browse.pending = Some(PendingLoad::Current);
    ctx.browse.refresh(ctx.index);
    reset_selection(ctx.list_state, ctx.browse.listing.entries.len());
}

/// Same directory, different view (page or search).
fn relisted(ctx: &mut BrowseContext) {
    ctx.browse.refresh(ctx.index);
    reset_selection(ctx.list_state, ctx.browse.listing.entries.len());
}

fn open_selected(ctx: &mut BrowseContext) {
    let Some(entry) = ctx
        .list_state
        .selected()
        .and_then(|idx| ctx.browse.listing.entries.get(idx))
        .cloned()
    else {
        return;
    };

    if entry.is_dir() {
        match ctx.index.enter(&entry.name) {
            Ok(()) => navigated(ctx),
            Err(err) => ctx.browse.status = Some(StatusMessage::error(err.to_string())),
        }
    } else {
        ctx.browse.info = Some(entry);
        *ctx.mode = AppMode::FileInfo;
    }
}

pub fn handle_browse_key(ctx: &mut BrowseContext, code: KeyCode) -> Result<()> {
    match code {
        KeyCode::Char('q') => *ctx.should_quit = true,
        KeyCode::Up => navigate_up(ctx.list_state),
        KeyCode::Down => navigate_down(ctx.list_state, ctx.browse.listing.entries.len()),
        KeyCode::Enter => open_selected(ctx),
        KeyCode::Esc | KeyCode::Backspace => {
            if !ctx.index.navigation().search_text().is_empty() {
                ctx.index.set_search("");
                relisted(ctx);
            } else if ctx.index.back() {
                navigated(ctx);
            }
        }
        KeyCode::Char('h') => {
            ctx.index.home();
            navigated(ctx);
        }
        KeyCode::Char('/') => {
            ctx.browse.search_input = ctx.index.navigation().search_text().to_string();
            *ctx.mode = AppMode::Search;
        }
        KeyCode::Left => {
            let page = ctx.index.navigation().page();
            if page > 1 {
                ctx.index.set_page(page - 1);
                relisted(ctx);
            }
        }
        KeyCode::Right => {
            let page = ctx.index.navigation().page();
            if page < ctx.browse.total_pages() {
                ctx.index.set_page(page + 1);
                relisted(ctx);
            }
        }
        KeyCode::Char(c @ '0'..='9') => {
            let depth = c.to_digit(10).unwrap_or(0) as usize;
            let crumbs = path::breadcrumbs(ctx.index.current_path());
            // The last crumb is the current directory.
            if depth + 1 < crumbs.len() {
                ctx.index.jump_to(&crumbs[depth].1);
                navigated(ctx);
            }
        }
        KeyCode::Char('r') => {
            ctx.browse.status = Some(StatusMessage::info("Reloading manifest..."));
            ctx.browse.pending = Some(PendingLoad::Reload);
        }
        KeyCode::Char('?') => {
            *ctx.prev_mode = Some(*ctx.mode);
            *ctx.mode = AppMode::Help;
        }
        _ => {}
    }
    Ok(())
}

pub struct SearchContext<'a> {
    pub index: &'a mut DirectoryIndex,
    pub browse: &'a mut BrowseState,
    pub list_state: &'a mut ListState,
    pub mode: &'a mut AppMode,
}

pub fn handle_search_key(ctx: &mut SearchContext, code: KeyCode) -> Result<()> {
    match code {
        KeyCode::Enter => {
            ctx.index.set_search(&ctx.browse.search_input);
            ctx.browse.refresh(ctx.index);
            reset_selection(ctx.list_state, ctx.browse.listing.entries.len());
            *ctx.mode = AppMode::Browse;
        }
        KeyCode::Esc => {
            ctx.browse.search_input.clear();
            *ctx.mode = AppMode::Browse;
        }
        KeyCode::Backspace => {
            ctx.browse.search_input.pop();
        }
        KeyCode::Char(c) => ctx.browse.search_input.push(c),
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{RawRecord, SortOrder};

    struct Harness {
        index: DirectoryIndex,
        browse: BrowseState,
        list_state: ListState,
        mode: AppMode,
        prev_mode: Option<AppMode>,
        should_quit: bool,
    }

    impl Harness {
        fn new(page_size: usize) -> Self {
            let mut index = DirectoryIndex::new();
            let mut records = vec![
                RawRecord::dir("", "docs"),
                RawRecord::dir("docs", "api"),
                RawRecord::file("docs", "guide.pdf", 10),
                RawRecord::file("docs/api", "v1.md", 3),
            ];
            for i in 0..5 {
                records.push(RawRecord::file("", &format!("note{}.txt", i), 1));
            }
            index.ingest("files.json", records);

            let mut browse = BrowseState::new(SortOrder::KindThenName, page_size);
            browse.pending = None;
            browse.refresh(&index);
            let mut list_state = ListState::default();
            reset_selection(&mut list_state, browse.listing.entries.len());

            Self {
                index,
                browse,
                list_state,
                mode: AppMode::Browse,
                prev_mode: None,
                should_quit: false,
            }
        }

        fn press(&mut self, code: KeyCode) {
            match self.mode {
                AppMode::Search => {
                    let mut ctx = SearchContext {
                        index: &mut self.index,
                        browse: &mut self.browse,
                        list_state: &mut self.list_state,
                        mode: &mut self.mode,
                    };
                    handle_search_key(&mut ctx, code).unwrap();
                }
                _ => {
                    let mut ctx = BrowseContext {
                        index: &mut self.index,
                        browse: &mut self.browse,
                        list_state: &mut self.list_state,
                        mode: &mut self.mode,
                        prev_mode: &mut self.prev_mode,
                        should_quit: &mut self.should_quit,
                    };
                    handle_browse_key(&mut ctx, code).unwrap();
                }
            }
        }
    }

    #[test]
    fn test_enter_back_and_breadcrumb_jump() {
        let mut h = Harness::new(100);
        h.press(KeyCode::Enter);
        assert_eq!(h.index.current_path(), "docs");
        assert_eq!(h.browse.pending, Some(PendingLoad::Current));

        h.press(KeyCode::Enter);
        assert_eq!(h.index.current_path(), "docs/api");

        h.press(KeyCode::Char('1'));
        assert_eq!(h.index.current_path(), "docs");
        h.press(KeyCode::Char('1'));
        assert_eq!(h.index.current_path(), "docs");

        h.press(KeyCode::Backspace);
        assert_eq!(h.index.current_path(), "");
        h.press(KeyCode::Esc);
        assert_eq!(h.index.current_path(), "");
    }

    #[test]
    fn test_enter_on_file_opens_info() {
        let mut h = Harness::new(100);
        h.press(KeyCode::Down);
        h.press(KeyCode::Enter);
        assert_eq!(h.mode, AppMode::FileInfo);
        assert_eq!(h.browse.info.as_ref().map(|e| e.name.as_str()), Some("note0.txt"));
        assert_eq!(h.index.current_path(), "");
    }

    #[test]
    fn test_paging_with_arrows() {
        let mut h = Harness::new(4);
        assert_eq!(h.browse.total_pages(), 2);
        h.press(KeyCode::Left);
        assert_eq!(h.index.navigation().page(), 1);
        h.press(KeyCode::Right);
        assert_eq!(h.index.navigation().page(), 2);
        assert_eq!(h.browse.listing.names(), vec!["note3.txt", "note4.txt"]);
        h.press(KeyCode::Right);
        assert_eq!(h.index.navigation().page(), 2);
    }

    #[test]
    fn test_search_apply_cancel_and_clear() {
        let mut h = Harness::new(100);
        h.press(KeyCode::Char('/'));
        assert_eq!(h.mode, AppMode::Search);
        for c in "NOTE3".chars() {
            h.press(KeyCode::Char(c));
        }
        h.press(KeyCode::Enter);
        assert_eq!(h.mode, AppMode::Browse);
        assert_eq!(h.browse.listing.names(), vec!["note3.txt"]);

        h.press(KeyCode::Char('/'));
        h.press(KeyCode::Char('x'));
        h.press(KeyCode::Esc);
        assert_eq!(h.index.navigation().search_text(), "NOTE3");

        h.press(KeyCode::Esc);
        assert_eq!(h.index.navigation().search_text(), "");
        assert_eq!(h.browse.listing.total_items, 6);
    }

    #[test]
    fn test_reload_help_and_quit() {
        let mut h = Harness::new(100);
        h.press(KeyCode::Char('r'));
        assert_eq!(h.browse.pending, Some(PendingLoad::Reload));
        h.press(KeyCode::Char('?'));
        assert_eq!(h.mode, AppMode::Help);
        assert_eq!(h.prev_mode, Some(AppMode::Browse));
        h.mode = AppMode::Browse;
        h.press(KeyCode::Char('q'));
        assert!(h.should_quit);
    }
}
