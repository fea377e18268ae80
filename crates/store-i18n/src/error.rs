//! Localization error types.

use store_cache::CacheError;
use thiserror::Error;

/// Errors raised while loading translations or switching language.
#[derive(Error, Debug)]
pub enum I18nError {
    /// Language code not supported by the storefront.
    #[error("Unsupported language: {0}")]
    UnknownLanguage(String),

    /// The language preference could not be persisted.
    #[error("Failed to persist language preference: {0}")]
    Persist(#[from] CacheError),

    /// Translation file could not be read or parsed.
    #[error("Invalid translations: {0}")]
    Translations(String),

    /// The application restart could not be issued.
    #[error("Reload failed: {0}")]
    Reload(String),
}
