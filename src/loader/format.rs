use crate::index::RawRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const INDEX_FILE: &str = "files_index.json";
pub const SINGLE_FILE: &str = "files.json";
pub const PARTS_DIR: &str = "parts";

/// `files_index.json`: totals plus the list of part files.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexDocument {
    pub parts: Vec<PartDescriptor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_files: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_folders: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartDescriptor {
    pub num: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    /// Normalized directories whose children live in this part.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dirs: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl PartDescriptor {
    pub fn id(&self) -> String {
        format!("part_{:03}", self.num)
    }

    pub fn relative_file(&self) -> String {
        self.file
            .clone()
            .unwrap_or_else(|| format!("{}/part_{:03}.json", PARTS_DIR, self.num))
    }
}

/// Every record-carrying document shape a manifest or part file may use.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RecordDocument {
    Records(Vec<RawRecord>),
    Scoped(ScopedDocument),
    Grouped(GroupedDocument),
    Wrapped(WrappedDocument),
}

/// Children of one directory: bare folder names plus file records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopedDocument {
    pub path: String,
    #[serde(default)]
    pub dirs: Vec<String>,
    #[serde(default)]
    pub files: Vec<RawRecord>,
}

/// Whole tree keyed by directory: `folders[path]` names subfolders,
/// `files[path]` holds the file records.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupedDocument {
    pub folders: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub files: BTreeMap<String, Vec<RawRecord>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WrappedDocument {
    #[serde(alias = "records", alias = "items")]
    pub files: Vec<RawRecord>,
}

impl RecordDocument {
    pub fn into_records(self) -> Vec<RawRecord> {
        match self {
            RecordDocument::Records(records) => records,
            RecordDocument::Wrapped(doc) => doc.files,
            RecordDocument::Scoped(doc) => scoped_records(&doc.path, doc.dirs, doc.files),
            RecordDocument::Grouped(doc) => {
                let mut records = Vec::new();
                for (parent, names) in doc.folders {
                    records.extend(names.iter().map(|name| RawRecord::dir(&parent, name)));
                }
                for (parent, files) in doc.files {
                    records.extend(files.into_iter().map(|file| with_parent(file, &parent)));
                }
                records
            }
        }
    }
}

fn scoped_records(parent: &str, dirs: Vec<String>, files: Vec<RawRecord>) -> Vec<RawRecord> {
    dirs.iter()
        .map(|name| RawRecord::dir(parent, name))
        .chain(files.into_iter().map(|file| with_parent(file, parent)))
        .collect()
}

fn with_parent(mut record: RawRecord, parent: &str) -> RawRecord {
    if record.path.is_none() {
        record.path = Some(parent.to_string());
    }
    if record.kind.is_none() {
        record.kind = Some("file".to_string());
    }
    record
}
