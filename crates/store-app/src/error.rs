//! Application error types.

use std::path::PathBuf;

use store_cache::CacheError;
use store_data::FetchError;
use store_i18n::I18nError;
use thiserror::Error;

/// Errors raised while assembling or running the application context.
#[derive(Error, Debug)]
pub enum AppError {
    /// Config file could not be read or written.
    #[error("Config file {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML/JSON for the expected shape.
    #[error("Failed to parse config {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// Config could not be serialized.
    #[error("Failed to serialize config: {0}")]
    ConfigSerialize(String),

    /// Config parsed but failed validation.
    #[error("Invalid configuration: {}", .0.join("; "))]
    InvalidConfig(Vec<String>),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    I18n(#[from] I18nError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A global logger was already installed.
    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}
