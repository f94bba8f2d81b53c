//! User settings, read from `config.toml` in the platform config dir.
//!
//! ```toml
//! rows = 200
//! cols = 26
//! recalc = "direct"
//! log_level = "debug"
//! ```

use directories::ProjectDirs;
use serde::Deserialize;
use sheetcalc_core::RecalcMode;
use sheetcalc_core::document::{DEFAULT_COLS, DEFAULT_ROWS, check_grid_size};
use std::path::{Path, PathBuf};
use thiserror::Error;

const MAX_CONFIG_FILE_BYTES: u64 = 1_048_576; // 1 MiB

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Refusing to read {path}: file too large ({size} bytes, max {max})")]
    TooLarge { path: PathBuf, size: u64, max: u64 },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid grid size in {path}: rows and cols must be at least 1")]
    EmptyGrid { path: PathBuf },

    #[error("Invalid grid size in {path}: {source}")]
    GridTooLarge {
        path: PathBuf,
        source: sheetcalc_core::SheetError,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub rows: usize,
    pub cols: usize,
    pub recalc: RecalcMode,
    pub log_level: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            recalc: RecalcMode::default(),
            log_level: None,
        }
    }
}

impl Settings {
    pub fn from_file(path: &Path) -> Result<Settings, ConfigError> {
        let meta = std::fs::metadata(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        if meta.len() > MAX_CONFIG_FILE_BYTES {
            return Err(ConfigError::TooLarge {
                path: path.to_path_buf(),
                size: meta.len(),
                max: MAX_CONFIG_FILE_BYTES,
            });
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    fn parse(content: &str, path: &Path) -> Result<Settings, ConfigError> {
        let settings: Settings = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if settings.rows == 0 || settings.cols == 0 {
            return Err(ConfigError::EmptyGrid {
                path: path.to_path_buf(),
            });
        }
        check_grid_size(settings.rows, settings.cols).map_err(|source| {
            ConfigError::GridTooLarge {
                path: path.to_path_buf(),
                source,
            }
        })?;
        Ok(settings)
    }
}

pub(crate) fn default_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("me", "shoryuken", "sheetcalc")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}

/// Resolve the settings to run with.
///
/// An explicit path must load; the default location is optional and only
/// used when the file is present. Problems are returned as warnings and the
/// defaults are used instead.
pub fn load_settings(explicit: Option<&Path>, no_config: bool) -> (Settings, Vec<String>) {
    let mut warnings = Vec::new();
    if no_config {
        return (Settings::default(), warnings);
    }

    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => match default_config_path() {
            Some(p) if p.is_file() => p,
            _ => return (Settings::default(), warnings),
        },
    };

    match Settings::from_file(&path) {
        Ok(settings) => (settings, warnings),
        Err(err) => {
            warnings.push(err.to_string());
            (Settings::default(), warnings)
        }
    }
}
