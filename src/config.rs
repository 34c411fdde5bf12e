use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::Level;

use crate::error::{AppError, Result};

const APP_DIR: &str = "fillgo";
const CONFIG_FILE_NAME: &str = "config.toml";
const DATA_FILE_NAME: &str = "templates.json";
const LOG_FILE_NAME: &str = "fillgo.log";
const EXPORT_DIR_NAME: &str = "exports";
const DEFAULT_STATUS_DURATION_MS: u64 = 1500;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Config {
    pub(crate) data_file: PathBuf,
    pub(crate) export_dir: PathBuf,
    pub(crate) log_file: PathBuf,
    pub(crate) log_level: String,
    pub(crate) editor: Option<String>,
    pub(crate) status_duration_ms: u64,
}

/// On-disk shape; every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    data_file: Option<PathBuf>,
    export_dir: Option<PathBuf>,
    log_file: Option<PathBuf>,
    log_level: Option<String>,
    editor: Option<String>,
    status_duration_ms: Option<u64>,
}

impl Config {
    /// Reads `<config_dir>/fillgo/config.toml`, falling back to defaults
    /// when the file does not exist.
    pub(crate) fn load() -> Result<Self> {
        let base = config_dir().ok_or(AppError::ConfigDirNotFound)?;
        let path = base.join(CONFIG_FILE_NAME);
        if !path.exists() {
            return Ok(Self::defaults(&base));
        }
        let text = fs::read_to_string(&path).map_err(|source| AppError::Read {
            path: path.clone(),
            source,
        })?;
        Self::from_toml_str(&text, &base, &path)
    }

    pub(crate) fn defaults(base: &Path) -> Self {
        Self {
            data_file: base.join(DATA_FILE_NAME),
            export_dir: base.join(EXPORT_DIR_NAME),
            log_file: base.join(LOG_FILE_NAME),
            log_level: Level::INFO.to_string().to_lowercase(),
            editor: None,
            status_duration_ms: DEFAULT_STATUS_DURATION_MS,
        }
    }

    pub(crate) fn from_toml_str(text: &str, base: &Path, path: &Path) -> Result<Self> {
        let file: ConfigFile = toml::from_str(text).map_err(|source| AppError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        let defaults = Self::defaults(base);
        let resolve = |value: Option<PathBuf>, fallback: PathBuf| match value {
            Some(value) if value.is_relative() => base.join(value),
            Some(value) => value,
            None => fallback,
        };
        Ok(Self {
            data_file: resolve(file.data_file, defaults.data_file),
            export_dir: resolve(file.export_dir, defaults.export_dir),
            log_file: resolve(file.log_file, defaults.log_file),
            log_level: file.log_level.unwrap_or(defaults.log_level),
            editor: file.editor.filter(|editor| !editor.trim().is_empty()),
            status_duration_ms: file
                .status_duration_ms
                .unwrap_or(defaults.status_duration_ms),
        })
    }

    /// The configured editor command, else `$EDITOR`.
    pub(crate) fn editor_command(&self) -> Option<String> {
        self.editor.clone().or_else(|| match env::var("EDITOR") {
            Ok(value) if !value.trim().is_empty() => Some(value),
            _ => None,
        })
    }
}

fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR))
}
