//! Languages, translations, and the language switch for the storefront.
//!
//! - **Language**: The supported languages and their text direction
//! - **Translations**: Per-language string tables with English fallback
//! - **Switcher**: Persists the preference, publishes it, and restarts the
//!   app when the layout direction changes
//!
//! # Example
//!
//! ```rust,ignore
//! use store_i18n::prelude::*;
//!
//! let switcher = LanguageSwitcher::load(store, reloader, ReloadPolicy::default(), Language::En);
//! if let SwitchOutcome::Switched { reloaded: true, .. } = switcher.switch(Language::Ar).await? {
//!     // the reloader has already been asked to restart the app
//! }
//! ```

mod error;
mod language;
mod switcher;
mod translations;

pub use error::I18nError;
pub use language::{Language, TextDirection};
pub use switcher::{
    load_preferred_language, AppReloader, LanguageSwitcher, ReloadPolicy, SwitchOutcome,
    DEFAULT_RELOAD_DELAY, LANGUAGE_KEY,
};
pub use translations::{TranslationMap, TranslationTable};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        AppReloader, I18nError, Language, LanguageSwitcher, ReloadPolicy, SwitchOutcome,
        TextDirection, TranslationTable,
    };
}
