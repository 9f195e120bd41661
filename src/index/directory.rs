use crate::index::entry::{Entry, EntryKind, RawRecord};
use crate::index::error::{IndexError, Result};
use crate::index::navigation::NavigationState;
use crate::index::path;
use icu_collator::{Collator, CollatorOptions, Strength};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::str::FromStr;

pub const DEFAULT_PAGE_SIZE: usize = 100;

pub type PartitionId = String;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    /// Directories first, then by name.
    #[default]
    #[serde(rename = "kind")]
    KindThenName,
    /// By name, directories before files on equal names.
    #[serde(rename = "name")]
    NameThenKind,
}

impl SortOrder {
    pub fn label(self) -> &'static str {
        match self {
            SortOrder::KindThenName => "kind",
            SortOrder::NameThenKind => "name",
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kind" | "kind_then_name" => Ok(SortOrder::KindThenName),
            "name" | "name_then_kind" => Ok(SortOrder::NameThenKind),
            other => Err(format!("unknown sort order: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub search_text: Option<String>,
    pub sort_by: SortOrder,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

impl ListOptions {
    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search_text = Some(text.into());
        self
    }

    pub fn sort_by(mut self, order: SortOrder) -> Self {
        self.sort_by = order;
        self
    }

    pub fn page(mut self, page: usize, page_size: usize) -> Self {
        self.page = Some(page);
        self.page_size = Some(page_size);
        self
    }

    fn is_paginated(&self) -> bool {
        self.page.is_some() || self.page_size.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

/// Result of a directory query. Counts cover the whole filtered listing, not
/// just the returned page.
#[derive(Debug, Clone, Default)]
pub struct Listing {
    pub entries: Vec<Entry>,
    pub total_items: usize,
    pub dir_count: usize,
    pub file_count: usize,
    pub page: Option<PageInfo>,
}

impl Listing {
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestSummary {
    pub inserted: usize,
    pub duplicates: usize,
    pub malformed: usize,
    pub already_loaded: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub files: usize,
    pub directories: usize,
    pub total_size: u64,
    pub partitions: usize,
    pub warnings: usize,
}

#[derive(Debug, Default)]
struct Bucket {
    entries: Vec<Entry>,
    keys: HashSet<(String, EntryKind)>,
}

#[derive(Debug, Default)]
pub struct DirectoryIndex {
    entries_by_parent: HashMap<String, Bucket>,
    loaded_partitions: HashSet<PartitionId>,
    navigation: NavigationState,
    warnings: Vec<IndexError>,
}

impl DirectoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges one partition. Re-ingesting a known partition id is a no-op;
    /// malformed records are skipped and kept as warnings.
    pub fn ingest<I>(&mut self, partition: impl Into<PartitionId>, records: I) -> IngestSummary
    where
        I: IntoIterator<Item = RawRecord>,
    {
        let partition = partition.into();
        let mut summary = IngestSummary::default();

        if !self.loaded_partitions.insert(partition.clone()) {
            log::debug!("partition {} already ingested, skipping", partition);
            summary.already_loaded = true;
            return summary;
        }

        for record in records {
            match record.into_entry() {
                Ok(entry) => {
                    let bucket = self
                        .entries_by_parent
                        .entry(entry.parent_path.clone())
                        .or_default();
                    if bucket.keys.insert((entry.name.clone(), entry.kind)) {
                        bucket.entries.push(entry);
                        summary.inserted += 1;
                    } else {
                        summary.duplicates += 1;
                    }
                }
                Err(err) => {
                    log::warn!("partition {}: {}", partition, err);
                    self.warnings.push(err);
                    summary.malformed += 1;
                }
            }
        }

        log::debug!(
            "ingested partition {}: {} inserted, {} duplicates, {} malformed",
            partition,
            summary.inserted,
            summary.duplicates,
            summary.malformed
        );
        summary
    }

    pub fn is_loaded(&self, partition: &str) -> bool {
        self.loaded_partitions.contains(partition)
    }

    /// Drops every entry and partition while keeping the navigation cursor.
    pub fn clear_entries(&mut self) {
        self.entries_by_parent.clear();
        self.loaded_partitions.clear();
        self.warnings.clear();
    }

    pub fn warnings(&self) -> &[IndexError] {
        &self.warnings
    }

    /// Direct children of `dir`, matched by exact normalized parent path.
    pub fn list_directory(&self, dir: &str, options: &ListOptions) -> Listing {
        let key = path::normalize(dir);
        let needle = options
            .search_text
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase);

        let mut entries: Vec<Entry> = self
            .entries_by_parent
            .get(&key)
            .map(|bucket| {
                bucket
                    .entries
                    .iter()
                    .filter(|e| match &needle {
                        Some(n) => e.name.to_lowercase().contains(n.as_str()),
                        None => true,
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        sort_entries(&mut entries, options.sort_by);

        let total_items = entries.len();
        let dir_count = entries.iter().filter(|e| e.is_dir()).count();
        let file_count = total_items - dir_count;

        let page = if options.is_paginated() {
            let page_size = options.page_size.unwrap_or(DEFAULT_PAGE_SIZE).max(1);
            let page = options.page.unwrap_or(1).max(1);
            let total_pages = total_items.div_ceil(page_size);
            let start = (page - 1).saturating_mul(page_size).min(total_items);
            let end = start.saturating_add(page_size).min(total_items);
            entries.truncate(end);
            entries.drain(..start);
            Some(PageInfo {
                page,
                page_size,
                total_pages,
            })
        } else {
            None
        };

        Listing {
            entries,
            total_items,
            dir_count,
            file_count,
            page,
        }
    }

    /// The entry at a full path, preferring a directory when a file and a
    /// directory share the name.
    pub fn get(&self, full_path: &str) -> Option<&Entry> {
        let (parent, name) = path::split_parent(full_path)?;
        let bucket = self.entries_by_parent.get(&parent)?;
        let mut matches = bucket.entries.iter().filter(|e| e.name == name);
        let first = matches.next()?;
        if first.is_dir() {
            Some(first)
        } else {
            matches.find(|e| e.is_dir()).or(Some(first))
        }
    }

    pub fn stats(&self) -> IndexStats {
        let mut stats = IndexStats {
            partitions: self.loaded_partitions.len(),
            warnings: self.warnings.len(),
            ..Default::default()
        };
        for entry in self.entries_by_parent.values().flat_map(|b| b.entries.iter()) {
            match entry.kind {
                EntryKind::Directory => stats.directories += 1,
                EntryKind::File => {
                    stats.files += 1;
                    stats.total_size += entry.size;
                }
            }
        }
        stats
    }

    pub fn navigation(&self) -> &NavigationState {
        &self.navigation
    }

    pub fn current_path(&self) -> &str {
        self.navigation.current_path()
    }

    pub fn can_go_back(&self) -> bool {
        self.navigation.can_go_back()
    }

    /// Moves into the child directory `name` of the current directory.
    /// `name` must be a single segment naming a directory listed directly
    /// under the cursor. Anything else is rejected without touching any state.
    pub fn enter(&mut self, name: &str) -> Result<()> {
        let current = self.navigation.current_path();
        let target = path::join(current, name);
        if name.is_empty() || name.contains('/') || path::normalize(name) != name {
            return Err(IndexError::NotADirectory(target));
        }

        let is_child_dir = self
            .entries_by_parent
            .get(current)
            .is_some_and(|bucket| bucket.keys.contains(&(name.to_string(), EntryKind::Directory)));
        if !is_child_dir {
            return Err(IndexError::NotADirectory(target));
        }

        self.navigation.descend(name);
        Ok(())
    }

    pub fn back(&mut self) -> bool {
        self.navigation.back()
    }

    pub fn home(&mut self) {
        self.navigation.home();
    }

    pub fn jump_to(&mut self, target: &str) {
        self.navigation.jump_to(target);
    }

    pub fn set_search(&mut self, text: &str) {
        self.navigation.set_search(text);
    }

    pub fn set_page(&mut self, page: usize) {
        self.navigation.set_page(page);
    }

    /// Listing for the cursor, using its search text and page.
    pub fn current_listing(&self, sort_by: SortOrder, page_size: usize) -> Listing {
        let nav = &self.navigation;
        let options = ListOptions {
            search_text: Some(nav.search_text().to_string()),
            sort_by,
            page: Some(nav.page()),
            page_size: Some(page_size),
        };
        self.list_directory(nav.current_path(), &options)
    }
}

fn kind_rank(kind: EntryKind) -> u8 {
    match kind {
        EntryKind::Directory => 0,
        EntryKind::File => 1,
    }
}

/// Root-locale collation, so accented and mixed-case names sort among
/// their base letters. ICU data ships with the binary, so construction only
/// fails if that data is broken.
fn name_collator() -> Option<Collator> {
    let mut options = CollatorOptions::new();
    options.strength = Some(Strength::Tertiary);
    match Collator::try_new(&Default::default(), options) {
        Ok(collator) => Some(collator),
        Err(err) => {
            log::warn!("name collation unavailable, falling back to case folding: {}", err);
            None
        }
    }
}

fn compare_names(collator: Option<&Collator>, a: &str, b: &str) -> Ordering {
    let collated = match collator {
        Some(collator) => collator.compare(a, b),
        None => a.to_lowercase().cmp(&b.to_lowercase()),
    };
    // Raw code points break collation ties so the order is total.
    collated.then_with(|| a.cmp(b))
}

fn sort_entries(entries: &mut [Entry], order: SortOrder) {
    let collator = name_collator();
    let collator = collator.as_ref();
    match order {
        SortOrder::KindThenName => entries.sort_by(|a, b| {
            kind_rank(a.kind)
                .cmp(&kind_rank(b.kind))
                .then_with(|| compare_names(collator, &a.name, &b.name))
        }),
        SortOrder::NameThenKind => entries.sort_by(|a, b| {
            compare_names(collator, &a.name, &b.name)
                .then_with(|| kind_rank(a.kind).cmp(&kind_rank(b.kind)))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_with(records: Vec<RawRecord>) -> DirectoryIndex {
        let mut index = DirectoryIndex::new();
        index.ingest("all", records);
        index
    }

    fn all_paths(index: &DirectoryIndex) -> Vec<String> {
        let mut paths: Vec<String> = index.entries_by_parent.keys().cloned().collect();
        paths.sort();
        paths
    }

    #[test]
    fn test_prefix_sibling_is_not_a_child() {
        let index = index_with(vec![
            RawRecord::dir("", "log"),
            RawRecord::dir("", "logs"),
            RawRecord::file("log", "today.txt", 10),
            RawRecord::file("logs", "archive.txt", 20),
            RawRecord::file("logs/old", "ancient.txt", 30),
        ]);

        let log = index.list_directory("log", &ListOptions::default());
        assert_eq!(log.names(), vec!["today.txt"]);

        let logs = index.list_directory("/logs/", &ListOptions::default());
        assert_eq!(logs.names(), vec!["archive.txt"]);
    }

    #[test]
    fn test_each_entry_listed_exactly_once() {
        let index = index_with(vec![
            RawRecord::dir(".", "a"),
            RawRecord::dir("a", "b"),
            RawRecord::file("a", "x.txt", 1),
            RawRecord::file("a/b", "x.txt", 2),
            RawRecord::file("", "x.txt", 3),
        ]);

        for dir in all_paths(&index) {
            let listing = index.list_directory(&dir, &ListOptions::default());
            for entry in &listing.entries {
                assert_eq!(entry.parent_path, dir);
                let occurrences = listing
                    .entries
                    .iter()
                    .filter(|e| e.name == entry.name && e.kind == entry.kind)
                    .count();
                assert_eq!(occurrences, 1);
            }
        }
        assert_eq!(index.stats().files + index.stats().directories, 5);
    }

    #[test]
    fn test_root_sentinels_are_synonyms() {
        let index = index_with(vec![
            RawRecord::file(".", "a.txt", 1),
            RawRecord::file("", "b.txt", 1),
            RawRecord::file("/", "c.txt", 1),
        ]);
        for root in ["", "/", "."] {
            let listing = index.list_directory(root, &ListOptions::default());
            assert_eq!(listing.names(), vec!["a.txt", "b.txt", "c.txt"]);
        }
    }

    #[test]
    fn test_reingest_same_partition_is_noop() {
        let records = vec![RawRecord::file("", "a.txt", 1), RawRecord::dir("", "docs")];
        let mut index = DirectoryIndex::new();
        let first = index.ingest("part_001", records.clone());
        let second = index.ingest("part_001", records);

        assert_eq!(first.inserted, 2);
        assert!(second.already_loaded);
        assert_eq!(
            index.list_directory("", &ListOptions::default()).names(),
            vec!["docs", "a.txt"]
        );
        assert_eq!(index.stats().partitions, 1);
    }

    #[test]
    fn test_ingestion_order_does_not_matter() {
        let part_a = vec![
            RawRecord::dir("", "docs"),
            RawRecord::file("docs", "b.md", 1),
            RawRecord::file("", "README", 5),
        ];
        let part_b = vec![
            RawRecord::file("docs", "a.md", 2),
            RawRecord::file("docs", "A.md", 3),
            RawRecord::dir("docs", "img"),
            RawRecord::dir("", "docs"),
        ];

        let mut ab = DirectoryIndex::new();
        ab.ingest("a", part_a.clone());
        ab.ingest("b", part_b.clone());

        let mut ba = DirectoryIndex::new();
        ba.ingest("b", part_b);
        ba.ingest("a", part_a);

        assert_eq!(all_paths(&ab), all_paths(&ba));
        for dir in all_paths(&ab) {
            for order in [SortOrder::KindThenName, SortOrder::NameThenKind] {
                let options = ListOptions::default().sort_by(order);
                assert_eq!(
                    ab.list_directory(&dir, &options).entries,
                    ba.list_directory(&dir, &options).entries
                );
            }
        }
    }

    #[test]
    fn test_duplicate_records_across_partitions_merge() {
        let mut index = DirectoryIndex::new();
        index.ingest("a", vec![RawRecord::dir("", "docs")]);
        let summary = index.ingest("b", vec![RawRecord::dir("", "docs")]);
        assert_eq!(summary.duplicates, 1);
        assert_eq!(index.list_directory("", &ListOptions::default()).total_items, 1);
    }

    #[test]
    fn test_search_is_case_insensitive_and_shallow() {
        let index = index_with(vec![
            RawRecord::file("", "Apple.txt", 1),
            RawRecord::file("", "banana.txt", 1),
            RawRecord::dir("", "Grapes"),
            RawRecord::file("Grapes", "apricot.txt", 1),
        ]);
        let listing = index.list_directory("", &ListOptions::default().search("ap"));
        assert_eq!(listing.names(), vec!["Grapes", "Apple.txt"]);
        assert!(!listing.names().contains(&"apricot.txt"));
    }

    #[test]
    fn test_blank_search_keeps_everything() {
        let index = index_with(vec![RawRecord::file("", "a", 1), RawRecord::file("", "b", 1)]);
        let listing = index.list_directory("", &ListOptions::default().search("   "));
        assert_eq!(listing.total_items, 2);
    }

    #[test]
    fn test_default_sort_directories_first() {
        let index = index_with(vec![
            RawRecord::file("", "b.txt", 1),
            RawRecord::file("", "a.txt", 1),
            RawRecord::dir("", "Z"),
            RawRecord::dir("", "A"),
        ]);
        let listing = index.list_directory("", &ListOptions::default());
        assert_eq!(listing.names(), vec!["A", "Z", "a.txt", "b.txt"]);
        assert_eq!(listing.dir_count, 2);
        assert_eq!(listing.file_count, 2);
    }

    #[test]
    fn test_name_then_kind_sort_interleaves() {
        let index = index_with(vec![
            RawRecord::file("", "b.txt", 1),
            RawRecord::dir("", "c"),
            RawRecord::file("", "a.txt", 1),
            RawRecord::dir("", "B"),
        ]);
        let listing =
            index.list_directory("", &ListOptions::default().sort_by(SortOrder::NameThenKind));
        assert_eq!(listing.names(), vec!["a.txt", "B", "b.txt", "c"]);
    }

    #[test]
    fn test_accented_names_sort_with_their_base_letters() {
        let index = index_with(vec![
            RawRecord::file("", "Zebra.txt", 1),
            RawRecord::file("", "éclair.txt", 1),
            RawRecord::file("", "apple.txt", 1),
            RawRecord::file("", "Ångström.txt", 1),
        ]);
        let listing = index.list_directory("", &ListOptions::default());
        assert_eq!(
            listing.names(),
            vec!["Ångström.txt", "apple.txt", "éclair.txt", "Zebra.txt"]
        );
    }

    #[test]
    fn test_case_variants_have_a_stable_order() {
        let records = vec![
            RawRecord::file("", "readme", 1),
            RawRecord::file("", "README", 1),
            RawRecord::file("", "Readme", 1),
        ];
        let forward = index_with(records.clone());
        let backward = index_with(records.into_iter().rev().collect());
        let options = ListOptions::default();
        assert_eq!(
            forward.list_directory("", &options).names(),
            backward.list_directory("", &options).names()
        );
    }

    #[test]
    fn test_pagination_last_page() {
        let records: Vec<RawRecord> = (0..250)
            .map(|i| RawRecord::file("big", &format!("file_{:03}.bin", i), i))
            .collect();
        let index = index_with(records);

        let listing = index.list_directory("big", &ListOptions::default().page(3, 100));
        assert_eq!(listing.entries.len(), 50);
        assert_eq!(listing.total_items, 250);
        assert_eq!(listing.page.unwrap().total_pages, 3);
        assert_eq!(listing.entries[0].name, "file_200.bin");
        assert_eq!(listing.entries[49].name, "file_249.bin");

        let beyond = index.list_directory("big", &ListOptions::default().page(4, 100));
        assert!(beyond.entries.is_empty());
        assert_eq!(beyond.total_items, 250);
    }

    #[test]
    fn test_unknown_directory_is_empty() {
        let index = index_with(vec![RawRecord::file("", "a", 1)]);
        let listing = index.list_directory("nowhere/at/all", &ListOptions::default());
        assert!(listing.entries.is_empty());
        assert_eq!(listing.total_items, 0);
    }

    #[test]
    fn test_malformed_records_are_skipped() {
        let mut index = DirectoryIndex::new();
        let summary = index.ingest(
            "p",
            vec![
                RawRecord::default(),
                RawRecord::file("a/../b", "x", 1),
                RawRecord::file("", "ok.txt", 1),
            ],
        );
        assert_eq!(summary.inserted, 1);
        assert_eq!(summary.malformed, 2);
        assert_eq!(index.warnings().len(), 2);
        assert_eq!(index.list_directory("", &ListOptions::default()).names(), vec!["ok.txt"]);
    }

    #[test]
    fn test_enter_then_back_restores_state() {
        let mut index = index_with(vec![
            RawRecord::dir("", "docs"),
            RawRecord::dir("docs", "2024"),
        ]);
        index.enter("docs").unwrap();
        let before_path = index.current_path().to_string();
        let before_len = index.navigation().history().len();

        index.enter("2024").unwrap();
        assert_eq!(index.current_path(), "docs/2024");
        assert!(index.back());

        assert_eq!(index.current_path(), before_path);
        assert_eq!(index.navigation().history().len(), before_len);
    }

    #[test]
    fn test_enter_file_is_rejected() {
        let mut index = index_with(vec![RawRecord::file("", "notes.txt", 1)]);
        index.set_search("no");
        let err = index.enter("notes.txt").unwrap_err();
        assert_eq!(err, IndexError::NotADirectory("notes.txt".to_string()));
        assert_eq!(index.current_path(), "");
        assert!(!index.can_go_back());
        assert_eq!(index.navigation().search_text(), "no");
    }

    #[test]
    fn test_enter_unknown_name_is_rejected() {
        let mut index = index_with(vec![RawRecord::dir("", "docs")]);
        assert!(index.enter("music").is_err());
        assert_eq!(index.current_path(), "");
    }

    #[test]
    fn test_enter_only_accepts_a_single_child_segment() {
        let mut index = index_with(vec![
            RawRecord::dir("", "docs"),
            RawRecord::dir("docs", "api"),
        ]);
        for name in ["docs/api", "", ".", "..", "docs/", "/docs", " docs"] {
            let err = index.enter(name).unwrap_err();
            assert!(matches!(err, IndexError::NotADirectory(_)), "{name:?}");
            assert_eq!(index.current_path(), "");
            assert!(index.navigation().history().is_empty(), "{name:?}");
        }

        index.enter("docs").unwrap();
        assert!(index.enter("docs").is_err());
        assert_eq!(index.current_path(), "docs");
        assert_eq!(index.navigation().history().len(), 1);
    }

    #[test]
    fn test_enter_prefers_directory_over_same_named_file() {
        let mut index = index_with(vec![
            RawRecord::file("", "build", 1),
            RawRecord::dir("", "build"),
        ]);
        assert!(index.enter("build").is_ok());
        assert_eq!(index.current_path(), "build");
    }

    #[test]
    fn test_home_always_resets() {
        let mut index = index_with(vec![RawRecord::dir("", "a"), RawRecord::dir("a", "b")]);
        index.home();
        assert_eq!(index.current_path(), "");
        index.enter("a").unwrap();
        index.enter("b").unwrap();
        index.set_search("x");
        index.home();
        assert_eq!(index.current_path(), "");
        assert!(index.navigation().history().is_empty());
        assert_eq!(index.navigation().search_text(), "");
    }

    #[test]
    fn test_current_listing_uses_cursor_state() {
        let mut index = index_with(vec![
            RawRecord::dir("", "docs"),
            RawRecord::file("docs", "alpha.md", 1),
            RawRecord::file("docs", "beta.md", 1),
        ]);
        index.enter("docs").unwrap();
        index.set_search("ALP");
        let listing = index.current_listing(SortOrder::default(), 10);
        assert_eq!(listing.names(), vec!["alpha.md"]);
        assert_eq!(listing.page.unwrap().page, 1);
    }

    #[test]
    fn test_get_and_stats() {
        let index = index_with(vec![
            RawRecord::dir("", "docs"),
            RawRecord::file("docs", "a.pdf", 100),
            RawRecord::file("", "b.pdf", 50),
        ]);
        assert_eq!(index.get("docs/a.pdf").map(|e| e.size), Some(100));
        assert!(index.get("docs").unwrap().is_dir());
        assert!(index.get("").is_none());
        let stats = index.stats();
        assert_eq!(stats.files, 2);
        assert_eq!(stats.directories, 1);
        assert_eq!(stats.total_size, 150);
    }

    #[test]
    fn test_clear_entries_keeps_cursor() {
        let mut index = index_with(vec![RawRecord::dir("", "docs")]);
        index.enter("docs").unwrap();
        index.clear_entries();
        assert_eq!(index.current_path(), "docs");
        assert!(!index.is_loaded("all"));
        assert_eq!(index.stats().directories, 0);
    }

    #[test]
    fn test_sort_order_parse() {
        assert_eq!("kind".parse::<SortOrder>(), Ok(SortOrder::KindThenName));
        assert_eq!("Name".parse::<SortOrder>(), Ok(SortOrder::NameThenKind));
        assert!("size".parse::<SortOrder>().is_err());
    }
}
