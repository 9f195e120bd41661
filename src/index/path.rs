//! Path helpers for the `/`-joined, slash-free canonical form used as index keys.
//!
//! The root is the empty string. `"."`, `"/"` and `""` all normalize to it.

pub const ROOT: &str = "";

/// Canonical form of a raw path: no leading/trailing slashes, no empty or `.`
/// segments.
pub fn normalize(raw: &str) -> String {
    raw.split('/')
        .map(str::trim)
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// True if any segment of `raw` walks upward (`..`), which would let a record
/// point back into its own ancestry.
pub fn has_parent_segment(raw: &str) -> bool {
    raw.split('/').any(|segment| segment.trim() == "..")
}

/// Root-aware join: joining onto the root yields `name` alone.
pub fn join(parent: &str, name: &str) -> String {
    let parent = normalize(parent);
    let name = normalize(name);
    match (parent.is_empty(), name.is_empty()) {
        (true, _) => name,
        (false, true) => parent,
        (false, false) => format!("{}/{}", parent, name),
    }
}

/// Splits a full path into `(parent, leaf)`. The root has no leaf.
pub fn split_parent(path: &str) -> Option<(String, String)> {
    let path = normalize(path);
    if path.is_empty() {
        return None;
    }
    match path.rsplit_once('/') {
        Some((parent, leaf)) => Some((parent.to_string(), leaf.to_string())),
        None => Some((String::new(), path)),
    }
}

/// `(label, path)` pairs from the root down to `path`, root first.
pub fn breadcrumbs(path: &str) -> Vec<(String, String)> {
    let mut crumbs = vec![("/".to_string(), ROOT.to_string())];
    let mut current = String::new();
    for segment in normalize(path).split('/').filter(|s| !s.is_empty()) {
        current = join(&current, segment);
        crumbs.push((segment.to_string(), current.clone()));
    }
    crumbs
}

/// Display form with a leading slash.
pub fn display(path: &str) -> String {
    format!("/{}", normalize(path))
}
