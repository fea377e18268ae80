//! Language switching with a cold restart on layout-direction changes.
//!
//! The app's layout direction is fixed at startup, so moving between an LTR
//! and an RTL language needs a restart. The preference is written first and
//! the restart only happens once that write succeeded, so the restarted app
//! comes up in the new language.

use std::time::Duration;

use store_cache::{Cache, KvStore};
use tokio::sync::{watch, Mutex};
use tracing::{info, warn};

use crate::{I18nError, Language, TextDirection, TranslationTable};

/// Key the language preference is stored under.
pub const LANGUAGE_KEY: &str = "preferences:language";

/// Default pause between publishing a new language and restarting.
pub const DEFAULT_RELOAD_DELAY: Duration = Duration::from_millis(300);

/// Issues the application restart.
pub trait AppReloader: Send + Sync {
    fn reload(&self, language: Language) -> Result<(), I18nError>;
}

/// When and how to restart after a language change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadPolicy {
    /// Pause before restarting, so the UI can show the new language briefly.
    pub delay: Duration,
    /// Restart even when the text direction stays the same.
    pub reload_on_same_direction: bool,
}

impl Default for ReloadPolicy {
    fn default() -> Self {
        Self {
            delay: DEFAULT_RELOAD_DELAY,
            reload_on_same_direction: true,
        }
    }
}

impl ReloadPolicy {
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_reload_on_same_direction(mut self, reload: bool) -> Self {
        self.reload_on_same_direction = reload;
        self
    }

    /// Whether a switch between these directions needs a restart.
    pub fn requires_reload(&self, from: TextDirection, to: TextDirection) -> bool {
        from != to || self.reload_on_same_direction
    }
}

/// Result of [`LanguageSwitcher::switch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// The requested language was already active.
    Unchanged,
    Switched {
        from: Language,
        to: Language,
        reloaded: bool,
    },
}

/// Read the stored language preference.
///
/// Missing, unreadable, or unsupported values yield `fallback`.
pub fn load_preferred_language<S: KvStore>(store: &S, fallback: Language) -> Language {
    let stored = match store.get_raw(LANGUAGE_KEY) {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return fallback,
        Err(e) => {
            warn!(error = %e, "could not read language preference");
            return fallback;
        }
    };

    match serde_json::from_slice::<String>(&stored)
        .ok()
        .and_then(|code| Language::from_code(&code))
    {
        Some(language) => language,
        None => {
            warn!("ignoring unsupported stored language preference");
            fallback
        }
    }
}

/// Owns the active language and performs switches.
pub struct LanguageSwitcher<S, R> {
    cache: Cache<S>,
    reloader: R,
    policy: ReloadPolicy,
    translations: TranslationTable,
    current: watch::Sender<Language>,
    switching: Mutex<()>,
}

impl<S: KvStore, R: AppReloader> LanguageSwitcher<S, R> {
    /// Create a switcher starting from the stored preference (or `fallback`).
    pub fn load(store: S, reloader: R, policy: ReloadPolicy, fallback: Language) -> Self {
        let initial = load_preferred_language(&store, fallback);
        Self::new(store, reloader, policy, initial)
    }

    pub fn new(store: S, reloader: R, policy: ReloadPolicy, initial: Language) -> Self {
        let (current, _) = watch::channel(initial);
        Self {
            cache: Cache::new(store),
            reloader,
            policy,
            translations: TranslationTable::builtin(),
            current,
            switching: Mutex::new(()),
        }
    }

    pub fn with_translations(mut self, translations: TranslationTable) -> Self {
        self.translations = translations;
        self
    }

    pub fn current(&self) -> Language {
        *self.current.borrow()
    }

    pub fn direction(&self) -> TextDirection {
        self.current().direction()
    }

    /// Receive every published language.
    pub fn subscribe(&self) -> watch::Receiver<Language> {
        self.current.subscribe()
    }

    pub fn policy(&self) -> ReloadPolicy {
        self.policy
    }

    pub fn translations(&self) -> &TranslationTable {
        &self.translations
    }

    /// Translate a message id into the active language.
    pub fn translate(&self, key: &str) -> String {
        self.translations.translate(self.current(), key).to_string()
    }

    /// Switch to `language`.
    ///
    /// Persists the preference, publishes the language, and then restarts
    /// after the policy's delay when the policy requires it. A failed write
    /// aborts the switch: nothing is published and no restart happens.
    pub async fn switch(&self, language: Language) -> Result<SwitchOutcome, I18nError> {
        let _guard = self.switching.lock().await;

        let from = self.current();
        if from == language {
            return Ok(SwitchOutcome::Unchanged);
        }

        self.cache
            .set(LANGUAGE_KEY, &language.code())
            .inspect_err(|e| warn!(language = %language, error = %e, "language switch aborted"))?;

        self.current.send_replace(language);
        info!(from = %from, to = %language, direction = language.direction().as_str(), "language changed");

        let reloaded = self
            .policy
            .requires_reload(from.direction(), language.direction());
        if reloaded {
            tokio::time::sleep(self.policy.delay).await;
            info!(language = %language, "restarting to apply language");
            self.reloader.reload(language)?;
        }

        Ok(SwitchOutcome::Switched {
            from,
            to: language,
            reloaded,
        })
    }
}
