use crate::index::{Entry, IndexStats, Listing, PageInfo};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingResult {
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    pub total_items: usize,
    pub dir_count: usize,
    pub file_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<PageOutput>,
    pub entries: Vec<EntryOutput>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed_partitions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageOutput {
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryOutput {
    pub name: String,
    pub kind: String,
    pub path: String,
    pub size_bytes: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResult {
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub partitioned: bool,
    pub total_files: usize,
    pub total_folders: usize,
    pub total_size_bytes: u64,
    pub partitions_loaded: usize,
    pub warnings: Vec<String>,
}

impl From<&Entry> for EntryOutput {
    fn from(entry: &Entry) -> Self {
        Self {
            name: entry.name.clone(),
            kind: entry.kind.as_str().to_string(),
            path: entry.full_path(),
            size_bytes: entry.size,
            modified: entry.modified(),
            extension: entry.extension.clone(),
        }
    }
}

impl From<PageInfo> for PageOutput {
    fn from(page: PageInfo) -> Self {
        Self {
            page: page.page,
            page_size: page.page_size,
            total_pages: page.total_pages,
        }
    }
}

impl ListingResult {
    pub fn new(source: String, path: String, search: Option<String>, listing: &Listing) -> Self {
        Self {
            version: "1.0".to_string(),
            timestamp: Utc::now(),
            source,
            path,
            search,
            total_items: listing.total_items,
            dir_count: listing.dir_count,
            file_count: listing.file_count,
            page: listing.page.map(PageOutput::from),
            entries: listing.entries.iter().map(EntryOutput::from).collect(),
            failed_partitions: Vec::new(),
        }
    }
}

impl StatsResult {
    pub fn new(source: String, partitioned: bool, stats: IndexStats, warnings: Vec<String>) -> Self {
        Self {
            version: "1.0".to_string(),
            timestamp: Utc::now(),
            source,
            partitioned,
            total_files: stats.files,
            total_folders: stats.directories,
            total_size_bytes: stats.total_size,
            partitions_loaded: stats.partitions,
            warnings,
        }
    }
}
