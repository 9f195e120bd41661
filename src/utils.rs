use crate::index::Entry;
use byte_unit::{Byte, UnitType};
use chrono::{DateTime, Local, Utc};

pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{} B", bytes);
    }
    let adjusted = Byte::from_u64(bytes).get_appropriate_unit(UnitType::Binary);
    format!("{:.1}", adjusted)
}

pub fn format_size_with(bytes: u64, raw: bool) -> String {
    if raw {
        format!("{} B", bytes)
    } else {
        format_size(bytes)
    }
}

/// Relative form for the last week, calendar date before that.
pub fn format_modified(modified: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let days = (now - modified).num_days();
    match days {
        0 => "today".to_string(),
        1 => "yesterday".to_string(),
        2..=6 => format!("{} days ago", days),
        _ => modified.with_timezone(&Local).format("%Y-%m-%d").to_string(),
    }
}

pub fn format_timestamp(modified: DateTime<Utc>) -> String {
    modified
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileCategory {
    Folder,
    Config,
    Image,
    Audio,
    Video,
    Document,
    Archive,
    Text,
    Code,
    Other,
}

impl FileCategory {
    pub fn of(entry: &Entry) -> Self {
        if entry.is_dir() {
            return FileCategory::Folder;
        }
        match entry.extension.as_deref().unwrap_or_default() {
            "ecfg" => FileCategory::Config,
            "jpg" | "jpeg" | "png" | "gif" | "svg" | "webp" => FileCategory::Image,
            "mp3" | "wav" | "ogg" | "flac" => FileCategory::Audio,
            "mp4" | "avi" | "mov" | "mkv" => FileCategory::Video,
            "pdf" => FileCategory::Document,
            "zip" | "rar" | "7z" | "tar" | "gz" => FileCategory::Archive,
            "txt" | "md" | "ini" | "cfg" | "json" => FileCategory::Text,
            "js" | "ts" | "py" | "java" | "cpp" | "html" | "css" | "rs" => FileCategory::Code,
            _ => FileCategory::Other,
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            FileCategory::Folder => "📁",
            FileCategory::Config => "⚙️",
            FileCategory::Image => "🖼️",
            FileCategory::Audio => "🎵",
            FileCategory::Video => "🎬",
            FileCategory::Document => "📕",
            FileCategory::Archive => "📦",
            FileCategory::Text => "📝",
            FileCategory::Code | FileCategory::Other => "📄",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FileCategory::Folder => "Folder",
            FileCategory::Config => "Config",
            FileCategory::Image => "Image",
            FileCategory::Audio => "Audio",
            FileCategory::Video => "Video",
            FileCategory::Document => "Document",
            FileCategory::Archive => "Archive",
            FileCategory::Text => "Text",
            FileCategory::Code => "Source code",
            FileCategory::Other => "File",
        }
    }
}
