use crate::index::error::{IndexError, Result};
use crate::index::path;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Directory,
    File,
}

impl EntryKind {
    fn parse(raw: Option<&str>) -> Option<Self> {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            None | Some("") | Some("f") | Some("file") => Some(EntryKind::File),
            Some("d") | Some("dir") | Some("directory") | Some("folder") => {
                Some(EntryKind::Directory)
            }
            Some(_) => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EntryKind::Directory => "directory",
            EntryKind::File => "file",
        }
    }
}

/// One record as it appears on the wire, in either the verbose
/// (`name`/`path`/`type`) or compact (`n`/`p`/`t`) spelling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default, alias = "n", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, alias = "p", skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(
        default,
        rename = "type",
        alias = "t",
        skip_serializing_if = "Option::is_none"
    )]
    pub kind: Option<String>,
    #[serde(default, alias = "s", skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, alias = "m", skip_serializing_if = "Option::is_none")]
    pub modified: Option<f64>,
    #[serde(
        default,
        alias = "e",
        alias = "ext",
        skip_serializing_if = "Option::is_none"
    )]
    pub extension: Option<String>,
}

impl RawRecord {
    pub fn file(parent: &str, name: &str, size: u64) -> Self {
        Self {
            name: Some(name.to_string()),
            path: Some(parent.to_string()),
            kind: Some("file".to_string()),
            size: Some(size),
            ..Default::default()
        }
    }

    pub fn dir(parent: &str, name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            path: Some(parent.to_string()),
            kind: Some("directory".to_string()),
            ..Default::default()
        }
    }

    pub fn with_modified(mut self, timestamp: i64) -> Self {
        self.modified = Some(timestamp as f64);
        self
    }

    /// Validates and normalizes the record.
    pub fn into_entry(self) -> Result<Entry> {
        let name = self.name.as_deref().map(str::trim).unwrap_or_default();
        if name.is_empty() {
            return Err(IndexError::malformed("", "missing name"));
        }
        if name.contains('/') {
            return Err(IndexError::malformed(name, "name contains a path separator"));
        }
        if name == "." || name == ".." {
            return Err(IndexError::malformed(name, "self-referential name"));
        }

        let raw_parent = self.path.as_deref().unwrap_or_default();
        if path::has_parent_segment(raw_parent) {
            return Err(IndexError::malformed(
                name,
                format!("cyclic path {:?}", raw_parent),
            ));
        }

        let kind = EntryKind::parse(self.kind.as_deref()).ok_or_else(|| {
            IndexError::malformed(
                name,
                format!("unknown type {:?}", self.kind.as_deref().unwrap_or_default()),
            )
        })?;

        let extension = match kind {
            EntryKind::Directory => None,
            EntryKind::File => self
                .extension
                .as_deref()
                .map(|e| e.trim().trim_start_matches('.').to_lowercase())
                .filter(|e| !e.is_empty())
                .or_else(|| extension_of(name)),
        };

        Ok(Entry {
            name: name.to_string(),
            kind,
            parent_path: path::normalize(raw_parent),
            size: match kind {
                EntryKind::File => self.size.unwrap_or(0),
                EntryKind::Directory => 0,
            },
            modified_at: self
                .modified
                .filter(|m| m.is_finite())
                .map(|m| m.trunc() as i64),
            extension,
        })
    }
}

/// Lowercase text after the last `.`; dot-files such as `.bashrc` have none.
pub fn extension_of(name: &str) -> Option<String> {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext.to_lowercase()),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub name: String,
    pub kind: EntryKind,
    pub parent_path: String,
    pub size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
}

impl Entry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn full_path(&self) -> String {
        path::join(&self.parent_path, &self.name)
    }

    pub fn modified(&self) -> Option<DateTime<Utc>> {
        self.modified_at
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
    }
}
