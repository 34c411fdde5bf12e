use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("could not locate a config directory")]
    ConfigDirNotFound,
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid config {path}: {source}")]
    Config {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("failed to encode data: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("{0}")]
    Validation(String),
    #[error("template {0} not found")]
    TemplateNotFound(u32),
    #[error("category {0} not found")]
    CategoryNotFound(u32),
    #[error("clipboard error: {0}")]
    Clipboard(#[from] arboard::Error),
    #[error("editor error: {0}")]
    Editor(String),
    #[error("logging setup failed: {0}")]
    Logging(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub(crate) type Result<T> = std::result::Result<T, AppError>;
