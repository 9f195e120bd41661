use crate::config::Config;
use crate::index::DirectoryIndex;
use crate::loader::ManifestLoader;
use crate::tui::state::{AppMode, BrowseState};
use ratatui::widgets::ListState;
use tokio::runtime::Runtime;

pub struct App {
    pub config: Config,
    pub loader: ManifestLoader,
    pub runtime: Runtime,
    pub index: DirectoryIndex,
    pub browse: BrowseState,
    pub list_state: ListState,
    pub mode: AppMode,
    pub prev_mode: Option<AppMode>,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: Config, loader: ManifestLoader, runtime: Runtime) -> Self {
        let browse = BrowseState::new(config.browse.sort, config.browse.page_size);

        Self {
            config,
            loader,
            runtime,
            index: DirectoryIndex::new(),
            browse,
            list_state: ListState::default(),
            mode: AppMode::Browse,
            prev_mode: None,
            should_quit: false,
        }
    }
}
