use crate::tui::state::App;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use ratatui::{backend::Backend, Terminal};
use std::time::Duration;

use crate::tui::controller::browse::{BrowseContext, SearchContext};
use crate::tui::controller::common::{HelpContext, InfoContext};
use crate::tui::controller::{handle_browse_key, handle_help_key, handle_info_key, handle_search_key};
use crate::tui::logic::navigation::{clamp_selection, reset_selection};
use crate::tui::state::{AppMode, PendingLoad, StatusMessage};
use crate::tui::view::components::modal::{render_file_info_modal, render_help_modal};
use crate::tui::view::render_browse;

impl App {
    pub fn run(&mut self, terminal: &mut Terminal<impl Backend>) -> Result<()> {
        while !self.should_quit {
            if self.browse.is_loading() {
                // One frame with the loading indicator before blocking on disk.
                terminal.draw(|f| self.render(f))?;
                self.load_pending();
            }

            terminal.draw(|f| self.render(f))?;

            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, key.modifiers)?;
                    }
                }
            }
        }

        Ok(())
    }

    fn load_pending(&mut self) {
        let Some(pending) = self.browse.pending.take() else {
            return;
        };

        if pending == PendingLoad::Reload {
            if let Err(err) = self.loader.refresh(&mut self.index) {
                self.browse.status = Some(StatusMessage::error(format!("{:#}", err)));
                return;
            }
        }

        let dir = self.index.current_path().to_string();
        let result = self
            .runtime
            .block_on(self.loader.load_for(&dir, &mut self.index));

        self.browse.status = match result {
            Ok(report) => match report.failure_summary() {
                Some(summary) => Some(StatusMessage::error(summary)),
                None if pending == PendingLoad::Reload => Some(StatusMessage::info(format!(
                    "Reloaded {}",
                    self.loader.location().display()
                ))),
                None => None,
            },
            Err(err) => Some(StatusMessage::error(format!("{:#}", err))),
        };

        self.browse.refresh(&self.index);
        if pending == PendingLoad::Reload {
            clamp_selection(&mut self.list_state, self.browse.listing.entries.len());
        } else {
            reset_selection(&mut self.list_state, self.browse.listing.entries.len());
        }
    }

    fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> Result<()> {
        if modifiers.contains(KeyModifiers::CONTROL) && code == KeyCode::Char('c') {
            self.should_quit = true;
            return Ok(());
        }

        match self.mode {
            AppMode::Browse => {
                let mut ctx = BrowseContext {
                    index: &mut self.index,
                    browse: &mut self.browse,
                    list_state: &mut self.list_state,
                    mode: &mut self.mode,
                    prev_mode: &mut self.prev_mode,
                    should_quit: &mut self.should_quit,
                };
                handle_browse_key(&mut ctx, code)
            }
            AppMode::Search => {
                let mut ctx = SearchContext {
                    index: &mut self.index,
                    browse: &mut self.browse,
                    list_state: &mut self.list_state,
                    mode: &mut self.mode,
                };
                handle_search_key(&mut ctx, code)
            }
            AppMode::FileInfo => {
                let mut ctx = InfoContext {
                    mode: &mut self.mode,
                    info: &mut self.browse.info,
                };
                handle_info_key(&mut ctx, code)
            }
            AppMode::Help => {
                let mut ctx = HelpContext {
                    mode: &mut self.mode,
                    prev_mode: &mut self.prev_mode,
                };
                handle_help_key(&mut ctx, code)
            }
        }
    }

    fn render(&mut self, f: &mut ratatui::Frame) {
        render_browse(
            f,
            &mut self.list_state,
            &self.index,
            &self.browse,
            self.mode,
            self.config.ui.show_sizes_in_bytes,
        );

        match self.mode {
            AppMode::FileInfo => {
                if let Some(entry) = &self.browse.info {
                    render_file_info_modal(f, entry, self.config.ui.show_sizes_in_bytes);
                }
            }
            AppMode::Help => render_help_modal(f),
            _ => {}
        }
    }
}
