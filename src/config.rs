use crate::index::{SortOrder, DEFAULT_PAGE_SIZE};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub browse: BrowseConfig,
    #[serde(default)]
    pub loader: LoaderConfig,
    #[serde(default)]
    pub generate: GenerateConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub default_manifest: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowseConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default)]
    pub sort: SortOrder,
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            sort: SortOrder::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_concurrency() -> usize {
    4
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateConfig {
    #[serde(default)]
    pub part_size: usize,
    #[serde(default)]
    pub gzip: bool,
    #[serde(default)]
    pub excluded: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default)]
    pub show_sizes_in_bytes: bool,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = fs::read_to_string(&config_path)?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("Invalid config file {}", config_path.display()))?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dirlens")
            .join("config.toml")
    }

    /// Applies a `config set` assignment. Returns false for unknown keys.
    pub fn set(&mut self, key: &str, value: &str) -> Result<bool> {
        match key {
            "default_manifest" => {
                self.source.default_manifest = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }
            "page_size" => {
                let size: usize = value.parse()?;
                if size == 0 {
                    anyhow::bail!("page_size must be at least 1");
                }
                self.browse.page_size = size;
            }
            "sort" => self.browse.sort = value.parse().map_err(anyhow::Error::msg)?,
            "concurrency" => self.loader.concurrency = value.parse::<usize>()?.max(1),
            "part_size" => self.generate.part_size = value.parse()?,
            "gzip" => self.generate.gzip = value.parse()?,
            "show_sizes_in_bytes" => self.ui.show_sizes_in_bytes = value.parse()?,
            _ => return Ok(false),
        }
        Ok(true)
    }

    pub fn add_excluded_pattern(&mut self, pattern: String) {
        if !self.generate.excluded.contains(&pattern) {
            self.generate.excluded.push(pattern);
        }
    }
}
