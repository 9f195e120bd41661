//! In-memory directory index over path-tagged file records.

pub mod directory;
pub mod entry;
pub mod error;
pub mod navigation;
pub mod path;

pub use directory::{
    DirectoryIndex, IndexStats, ListOptions, Listing, PageInfo, PartitionId,
    SortOrder, DEFAULT_PAGE_SIZE,
};
pub use entry::{Entry, EntryKind, RawRecord};
