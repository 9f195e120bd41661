use crate::index::{path, RawRecord};
use crate::loader::format::{IndexDocument, PartDescriptor, INDEX_FILE, PARTS_DIR, SINGLE_FILE};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use flate2::write::GzEncoder;
use flate2::Compression;
use glob::Pattern;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    /// Records per part; 0 writes a single manifest.
    pub part_size: usize,
    pub gzip: bool,
    pub excluded: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct GenerateReport {
    pub files: u64,
    pub folders: u64,
    pub total_size: u64,
    pub parts: usize,
    pub written: Vec<PathBuf>,
}

#[derive(Serialize)]
struct SingleManifest<'a> {
    total_files: u64,
    total_folders: u64,
    total_size: u64,
    generated_at: String,
    files: &'a [RawRecord],
}

/// One output part: the records plus the directories they belong to.
#[derive(Debug, Default)]
struct PartPlan {
    dirs: Vec<String>,
    records: Vec<RawRecord>,
}

pub fn generate(root: &Path, out_dir: &Path, options: &GenerateOptions) -> Result<GenerateReport> {
    let patterns = options
        .excluded
        .iter()
        .map(|p| Pattern::new(p).with_context(|| format!("Invalid exclude pattern: {}", p)))
        .collect::<Result<Vec<_>>>()?;

    let records = collect_records(root, &patterns)?;
    let mut report = GenerateReport::default();
    for record in &records {
        if record.kind.as_deref() == Some("directory") {
            report.folders += 1;
        } else {
            report.files += 1;
            report.total_size += record.size.unwrap_or(0);
        }
    }

    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;
    let generated_at = Utc::now().to_rfc3339();

    if options.part_size == 0 {
        let manifest = SingleManifest {
            total_files: report.files,
            total_folders: report.folders,
            total_size: report.total_size,
            generated_at,
            files: &records,
        };
        let target = out_dir.join(SINGLE_FILE);
        report.written.push(write_json(&target, &manifest, options.gzip)?);
        return Ok(report);
    }

    let plans = plan_parts(records, options.part_size);
    let parts_dir = out_dir.join(PARTS_DIR);
    fs::create_dir_all(&parts_dir)
        .with_context(|| format!("Failed to create {}", parts_dir.display()))?;

    let written = plans
        .par_iter()
        .enumerate()
        .map(|(i, plan)| {
            let target = parts_dir.join(format!("part_{:03}.json", i + 1));
            write_json(&target, &plan.records, options.gzip)
        })
        .collect::<Result<Vec<_>>>()?;

    let document = IndexDocument {
        parts: plans
            .iter()
            .enumerate()
            .map(|(i, plan)| PartDescriptor {
                num: (i + 1) as u32,
                file: None,
                dirs: Some(plan.dirs.clone()),
                count: Some(plan.records.len()),
            })
            .collect(),
        total_files: Some(report.files),
        total_folders: Some(report.folders),
        total_size: Some(report.total_size),
        generated_at: Some(generated_at),
    };
    report.parts = plans.len();
    report.written = written;
    report
        .written
        .push(write_json(&out_dir.join(INDEX_FILE), &document, false)?);

    Ok(report)
}

fn collect_records(root: &Path, patterns: &[Pattern]) -> Result<Vec<RawRecord>> {
    if !root.is_dir() {
        anyhow::bail!("Not a directory: {}", root.display());
    }

    let mut records = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_excluded(root, e.path(), patterns));

    for entry in walker {
        let entry = match entry {
            Ok(e) => e,
            Err(err) => {
                log::warn!("skipping unreadable entry: {}", err);
                continue;
            }
        };
        let relative = relative_path(root, entry.path());
        let Some((parent, name)) = path::split_parent(&relative) else {
            continue;
        };

        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(err) => {
                log::warn!("skipping {}: {}", entry.path().display(), err);
                continue;
            }
        };
        let modified = metadata
            .modified()
            .ok()
            .map(|t| DateTime::<Utc>::from(t).timestamp());

        let record = if metadata.is_dir() {
            RawRecord::dir(&parent, &name)
        } else {
            RawRecord::file(&parent, &name, metadata.len())
        };
        records.push(match modified {
            Some(ts) => record.with_modified(ts),
            None => record,
        });
    }

    Ok(records)
}

fn relative_path(root: &Path, entry: &Path) -> String {
    let relative = entry.strip_prefix(root).unwrap_or(entry);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join("/")
}

fn is_excluded(root: &Path, entry: &Path, patterns: &[Pattern]) -> bool {
    if patterns.is_empty() || entry == root {
        return false;
    }
    let relative = relative_path(root, entry);
    let name = entry
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    patterns
        .iter()
        .any(|p| p.matches(&relative) || p.matches(&name))
}

/// Packs directories into parts so that a directory's children stay
/// together; a directory larger than `part_size` gets parts of its own.
fn plan_parts(records: Vec<RawRecord>, part_size: usize) -> Vec<PartPlan> {
    let part_size = part_size.max(1);
    let mut by_parent: BTreeMap<String, Vec<RawRecord>> = BTreeMap::new();
    for record in records {
        let parent = path::normalize(record.path.as_deref().unwrap_or_default());
        by_parent.entry(parent).or_default().push(record);
    }

    let mut plans = Vec::new();
    let mut current = PartPlan::default();

    for (parent, group) in by_parent {
        if group.len() > part_size {
            if !current.records.is_empty() {
                plans.push(std::mem::take(&mut current));
            }
            for chunk in group.chunks(part_size) {
                plans.push(PartPlan {
                    dirs: vec![parent.clone()],
                    records: chunk.to_vec(),
                });
            }
            continue;
        }
        if current.records.len() + group.len() > part_size && !current.records.is_empty() {
            plans.push(std::mem::take(&mut current));
        }
        current.dirs.push(parent);
        current.records.extend(group);
    }
    if !current.records.is_empty() {
        plans.push(current);
    }
    plans
}

fn write_json<T: Serialize + ?Sized>(target: &Path, value: &T, gzip: bool) -> Result<PathBuf> {
    let json = serde_json::to_vec(value)?;
    let (target, bytes) = if gzip {
        let mut name = target.as_os_str().to_owned();
        name.push(".gz");
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&json)?;
        (PathBuf::from(name), encoder.finish()?)
    } else {
        (target.to_path_buf(), json)
    };
    fs::write(&target, bytes).with_context(|| format!("Failed to write {}", target.display()))?;
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{DirectoryIndex, ListOptions};
    use crate::loader::ManifestLoader;

    fn sample_tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("log")).unwrap();
        fs::create_dir_all(root.join("logs/old")).unwrap();
        fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
        fs::write(root.join("log/today.txt"), "abc").unwrap();
        fs::write(root.join("logs/old/ancient.txt"), "abcdef").unwrap();
        fs::write(root.join("node_modules/pkg/index.js"), "x").unwrap();
        fs::write(root.join("README.md"), "hello").unwrap();
        dir
    }

    #[test]
    fn test_plan_parts_keeps_directories_together() {
        let records = vec![
            RawRecord::file("", "a", 1),
            RawRecord::file("", "b", 1),
            RawRecord::file("x", "c", 1),
            RawRecord::file("y", "d", 1),
            RawRecord::file("y", "e", 1),
        ];
        let plans = plan_parts(records, 3);
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].dirs, vec!["".to_string(), "x".to_string()]);
        assert_eq!(plans[1].dirs, vec!["y".to_string()]);
    }

    #[test]
    fn test_plan_parts_splits_oversized_directory() {
        let records: Vec<RawRecord> = (0..5)
            .map(|i| RawRecord::file("big", &format!("f{}", i), 1))
            .collect();
        let plans = plan_parts(records, 2);
        assert_eq!(plans.len(), 3);
        assert!(plans.iter().all(|p| p.dirs == vec!["big".to_string()]));
        assert_eq!(plans[2].records.len(), 1);
    }

    #[test]
    fn test_exclude_patterns() {
        let root = Path::new("/data");
        let patterns = vec![Pattern::new("node_modules").unwrap(), Pattern::new("*.tmp").unwrap()];
        assert!(is_excluded(root, Path::new("/data/app/node_modules"), &patterns));
        assert!(is_excluded(root, Path::new("/data/x.tmp"), &patterns));
        assert!(!is_excluded(root, Path::new("/data/app/src"), &patterns));
        assert!(!is_excluded(root, root, &patterns));
    }

    #[tokio::test]
    async fn test_generate_single_manifest_round_trips_through_loader() {
        let tree = sample_tree();
        let out = tempfile::tempdir().unwrap();
        let options = GenerateOptions {
            excluded: vec!["node_modules".into()],
            ..Default::default()
        };
        let report = generate(tree.path(), out.path(), &options).unwrap();
        assert_eq!(report.files, 3);
        assert_eq!(report.folders, 3);
        assert_eq!(report.total_size, 14);

        let loader = ManifestLoader::open(out.path(), 2).unwrap();
        let mut index = DirectoryIndex::new();
        loader.load_all(&mut index).await.unwrap();
        assert_eq!(
            index.list_directory("", &ListOptions::default()).names(),
            vec!["log", "logs", "README.md"]
        );
        assert_eq!(
            index.list_directory("log", &ListOptions::default()).names(),
            vec!["today.txt"]
        );
    }

    #[tokio::test]
    async fn test_generate_gzip_parts_load_lazily() {
        let tree = sample_tree();
        let out = tempfile::tempdir().unwrap();
        let options = GenerateOptions {
            part_size: 2,
            gzip: true,
            excluded: Vec::new(),
        };
        let report = generate(tree.path(), out.path(), &options).unwrap();
        assert!(report.parts >= 2);
        assert!(out.path().join("parts/part_001.json.gz").is_file());

        let loader = ManifestLoader::open(out.path(), 2).unwrap();
        assert!(loader.supports_lazy());
        let mut index = DirectoryIndex::new();
        loader.load_for("logs/old", &mut index).await.unwrap();
        assert_eq!(
            index.list_directory("logs/old", &ListOptions::default()).names(),
            vec!["ancient.txt"]
        );
        assert!(index.stats().partitions < report.parts);
    }
}
