//! Storefront application wiring.
//!
//! Everything a storefront process sets up once at startup:
//!
//! - **Config**: `storefront.toml` / `storefront.json` discovery, validation, defaults
//! - **Logging**: `tracing-subscriber` with a human or JSON formatter
//! - **Context**: the shared [`AppContext`] holding session, language, and badge counts
//!
//! # Example
//!
//! ```rust,ignore
//! use store_app::prelude::*;
//!
//! let (config, _) = StoreConfig::discover(&std::env::current_dir()?)?;
//! init_logging(&config.logging, false)?;
//!
//! let ctx = AppContext::open(config, reloader)?;
//! let screen = ctx.search_controller(SearchScope::Deals)?;
//! screen.open(&route_params).await;
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod logging;

pub use config::{
    generate_default_config, ApiConfig, I18nConfig, LoggingConfig, SearchSettings, StorageConfig,
    StoreConfig, ValidationReport, CONFIG_FILE_NAMES,
};
pub use context::{AppContext, BadgeCounts, Badges, ListingScreen, SharedStore};
pub use error::AppError;
pub use logging::{init_logging, LogFormat, LogLevel};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::config::{generate_default_config, StoreConfig};
    pub use crate::context::{AppContext, Badges, ListingScreen};
    pub use crate::error::AppError;
    pub use crate::logging::{init_logging, LogFormat, LogLevel};

    pub use store_commerce::prelude::*;
    pub use store_i18n::{AppReloader, Language, SwitchOutcome};
}
