use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Config file looked up in the working directory when no override is set.
pub const DEFAULT_CONFIG_FILE: &str = "social-dash.json";

/// Environment variable pointing at an alternative config file.
pub const CONFIG_ENV: &str = "SOCIAL_DASH_CONFIG";

/// Environment variable overriding `data_dir`.
pub const DATA_DIR_ENV: &str = "SOCIAL_DASH_DATA_DIR";

// ---------------------------------------------------------------------------
// Runtime configuration
// ---------------------------------------------------------------------------

/// Where the exports live and how the table is paged.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding both workbooks.
    pub data_dir: PathBuf,
    /// Facebook workbook file name inside `data_dir`.
    pub fb_workbook: String,
    /// Instagram workbook file name inside `data_dir`.
    pub ig_workbook: String,
    /// Rows per page of the data table.
    pub page_size: usize,
    /// Font with CJK glyphs; common system locations are tried when unset.
    pub cjk_font: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            fb_workbook: "FB_all_data.xlsx".to_string(),
            ig_workbook: "IG_all_data.xlsx".to_string(),
            page_size: 100,
            cjk_font: None,
        }
    }
}

impl Config {
    /// Resolve the configuration from file and environment.
    ///
    /// A missing config file means defaults; a malformed one is logged and
    /// also falls back to defaults.
    pub fn load() -> Self {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let mut config = if path.exists() {
            match Self::from_file(&path) {
                Ok(config) => {
                    log::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    log::warn!("Ignoring config {}: {e:#}", path.display());
                    Self::default()
                }
            }
        } else {
            Self::default()
        };

        if let Some(dir) = std::env::var_os(DATA_DIR_ENV) {
            config.data_dir = PathBuf::from(dir);
        }
        config
    }

    /// Parse a JSON config file; absent fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).context("reading config file")?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let mut config: Config = serde_json::from_str(text).context("parsing config JSON")?;
        if config.page_size == 0 {
            config.page_size = Self::default().page_size;
        }
        Ok(config)
    }

    pub fn fb_path(&self) -> PathBuf {
        self.data_dir.join(&self.fb_workbook)
    }

    pub fn ig_path(&self) -> PathBuf {
        self.data_dir.join(&self.ig_workbook)
    }
}
