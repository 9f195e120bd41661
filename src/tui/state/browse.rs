use crate::index::{DirectoryIndex, Entry, Listing, SortOrder};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PendingLoad {
    /// Make sure the parts covering the current directory are loaded.
    Current,
    /// Re-read the manifest from disk and start over.
    Reload,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatusLevel {
    Info,
    Error,
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub level: StatusLevel,
    pub text: String,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Error,
            text: text.into(),
        }
    }
}

pub struct BrowseState {
    pub listing: Listing,
    pub sort: SortOrder,
    pub page_size: usize,
    pub search_input: String,
    pub info: Option<Entry>,
    pub status: Option<StatusMessage>,
    pub pending: Option<PendingLoad>,
}

impl BrowseState {
    pub fn new(sort: SortOrder, page_size: usize) -> Self {
        Self {
            listing: Listing::default(),
            sort,
            page_size: page_size.max(1),
            search_input: String::new(),
            info: None,
            status: None,
            pending: Some(PendingLoad::Current),
        }
    }

    pub fn refresh(&mut self, index: &DirectoryIndex) {
        self.listing = index.current_listing(self.sort, self.page_size);
    }

    pub fn total_pages(&self) -> usize {
        self.listing.page.map(|p| p.total_pages).unwrap_or(1)
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }
}
