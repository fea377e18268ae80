//! CLI execution context.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use store_app::{AppContext, StoreConfig};
use store_i18n::{AppReloader, I18nError, Language, TranslationTable};

use crate::output::Output;

/// Execution context for CLI commands.
pub struct Context {
    pub config: StoreConfig,
    /// File the config was read from, if any.
    pub config_path: Option<PathBuf>,
    pub output: Output,
    pub cwd: PathBuf,
}

impl Context {
    /// Load the config named on the command line, or the nearest one.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (config, config_path) = match config_path {
            Some(path) => {
                let path = cwd.join(path);
                let config = StoreConfig::load(&path)
                    .with_context(|| format!("Failed to load config {}", path.display()))?;
                (config, Some(path))
            }
            None => StoreConfig::discover(&cwd)?,
        };

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
        })
    }

    /// Open the persisted application state.
    pub fn app(&self) -> Result<AppContext<RestartNotice>> {
        AppContext::open(self.config.clone(), RestartNotice::new(self.output.clone()))
            .with_context(|| {
                format!(
                    "Failed to open state in {}",
                    self.config.storage.data_dir.display()
                )
            })
    }
}

/// Reports the restart a direction change needs instead of re-executing.
pub struct RestartNotice {
    output: Output,
    translations: TranslationTable,
}

impl RestartNotice {
    pub fn new(output: Output) -> Self {
        Self {
            output,
            translations: TranslationTable::builtin(),
        }
    }
}

impl AppReloader for RestartNotice {
    fn reload(&self, language: Language) -> Result<(), I18nError> {
        self.output.warn(&format!(
            "{} ({})",
            self.translations.translate(language, "lang.restart"),
            language.direction().as_str()
        ));
        Ok(())
    }
}
