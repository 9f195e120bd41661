//! Reads manifests from the local filesystem and feeds them to a
//! [`DirectoryIndex`] one partition at a time.

pub mod decode;
pub mod format;

use crate::index::{path, DirectoryIndex, PartitionId, RawRecord};
use anyhow::{Context, Result};
use format::{IndexDocument, PartDescriptor, RecordDocument, INDEX_FILE, SINGLE_FILE};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

#[derive(Debug, Clone)]
pub enum ManifestSource {
    Single {
        path: PathBuf,
    },
    Partitioned {
        index_path: PathBuf,
        base_dir: PathBuf,
        document: IndexDocument,
    },
}

#[derive(Debug, Clone)]
pub struct PartitionRef {
    pub id: PartitionId,
    pub path: PathBuf,
    pub dirs: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub loaded: Vec<PartitionId>,
    pub cached: usize,
    pub records: usize,
    pub failed: Vec<(PartitionId, String)>,
}

impl LoadReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn failure_summary(&self) -> Option<String> {
        if self.failed.is_empty() {
            return None;
        }
        let ids: Vec<&str> = self.failed.iter().map(|(id, _)| id.as_str()).collect();
        Some(format!("Failed to load {}", ids.join(", ")))
    }
}

pub struct ManifestLoader {
    source: ManifestSource,
    concurrency: usize,
}

impl ManifestLoader {
    /// Accepts a manifest file, an index file, or a directory holding
    /// `files_index.json` or `files.json` (optionally gzip-compressed).
    pub fn open(location: impl AsRef<Path>, concurrency: usize) -> Result<Self> {
        let location = location.as_ref();
        let file = if location.is_dir() {
            [INDEX_FILE, SINGLE_FILE]
                .iter()
                .find_map(|name| decode::resolve_existing(&location.join(name)))
                .with_context(|| format!("No manifest found in {}", location.display()))?
        } else {
            decode::resolve_existing(location)
                .with_context(|| format!("Manifest not found: {}", location.display()))?
        };

        Ok(Self {
            source: Self::probe(&file)?,
            concurrency: concurrency.max(1),
        })
    }

    fn probe(file: &Path) -> Result<ManifestSource> {
        let data = decode::read_file(file)?;
        match serde_json::from_slice::<IndexDocument>(&data) {
            Ok(document) => {
                let base_dir = file
                    .parent()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| PathBuf::from("."));
                log::debug!(
                    "{} is a partitioned index with {} parts",
                    file.display(),
                    document.parts.len()
                );
                Ok(ManifestSource::Partitioned {
                    index_path: file.to_path_buf(),
                    base_dir,
                    document,
                })
            }
            Err(_) => Ok(ManifestSource::Single {
                path: file.to_path_buf(),
            }),
        }
    }

    pub fn source(&self) -> &ManifestSource {
        &self.source
    }

    pub fn location(&self) -> &Path {
        match &self.source {
            ManifestSource::Single { path } => path,
            ManifestSource::Partitioned { index_path, .. } => index_path,
        }
    }

    pub fn index_document(&self) -> Option<&IndexDocument> {
        match &self.source {
            ManifestSource::Partitioned { document, .. } => Some(document),
            ManifestSource::Single { .. } => None,
        }
    }

    pub fn partitions(&self) -> Vec<PartitionRef> {
        match &self.source {
            ManifestSource::Single { path } => vec![PartitionRef {
                id: single_partition_id(path),
                path: path.clone(),
                dirs: None,
            }],
            ManifestSource::Partitioned {
                base_dir, document, ..
            } => document
                .parts
                .iter()
                .map(|part| part_ref(base_dir, part))
                .collect(),
        }
    }

    /// True when every part declares the directories it covers, so a listing
    /// can be served without reading the whole manifest.
    pub fn supports_lazy(&self) -> bool {
        match &self.source {
            ManifestSource::Single { .. } => false,
            ManifestSource::Partitioned { document, .. } => {
                !document.parts.is_empty() && document.parts.iter().all(|p| p.dirs.is_some())
            }
        }
    }

    pub async fn load_all(&self, index: &mut DirectoryIndex) -> Result<LoadReport> {
        self.load_parts(self.partitions(), index).await
    }

    /// Loads whatever is needed to list `dir`: the covering parts when the
    /// manifest has directory hints, every outstanding part otherwise.
    pub async fn load_for(&self, dir: &str, index: &mut DirectoryIndex) -> Result<LoadReport> {
        if !self.supports_lazy() {
            return self.load_all(index).await;
        }
        let key = path::normalize(dir);
        let wanted: Vec<PartitionRef> = self
            .partitions()
            .into_iter()
            .filter(|part| {
                part.dirs
                    .as_ref()
                    .is_some_and(|dirs| dirs.iter().any(|d| path::normalize(d) == key))
            })
            .collect();
        self.load_parts(wanted, index).await
    }

    /// Re-reads the manifest from disk and drops everything ingested so far.
    pub fn refresh(&mut self, index: &mut DirectoryIndex) -> Result<()> {
        let location = self.location().to_path_buf();
        self.source = Self::probe(&location)?;
        index.clear_entries();
        Ok(())
    }

    async fn load_parts(
        &self,
        parts: Vec<PartitionRef>,
        index: &mut DirectoryIndex,
    ) -> Result<LoadReport> {
        let mut report = LoadReport::default();
        let single = matches!(self.source, ManifestSource::Single { .. });
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();

        for part in parts {
            if index.is_loaded(&part.id) {
                report.cached += 1;
                continue;
            }
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let path = part.path.clone();
                let result = tokio::task::spawn_blocking(move || read_records(&path))
                    .await
                    .map_err(anyhow::Error::from)
                    .and_then(|r| r);
                (part.id, result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            let (id, result) = joined.context("Partition reader task failed")?;
            match result {
                Ok(records) => {
                    let summary = index.ingest(id.clone(), records);
                    report.records += summary.inserted;
                    report.loaded.push(id);
                }
                Err(err) if single => return Err(err),
                Err(err) => {
                    log::warn!("failed to load partition {}: {:#}", id, err);
                    report.failed.push((id, format!("{:#}", err)));
                }
            }
        }

        Ok(report)
    }
}

fn single_partition_id(path: &Path) -> PartitionId {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| SINGLE_FILE.to_string())
}

fn part_ref(base_dir: &Path, part: &PartDescriptor) -> PartitionRef {
    PartitionRef {
        id: part.id(),
        path: base_dir.join(part.relative_file()),
        dirs: part.dirs.clone(),
    }
}

fn read_records(path: &Path) -> Result<Vec<RawRecord>> {
    let resolved = decode::resolve_existing(path)
        .with_context(|| format!("Part file not found: {}", path.display()))?;
    let document: RecordDocument = decode::read_json(&resolved)?;
    Ok(document.into_records())
}
