//! Storefront configuration file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use store_commerce::search::{SortKey, DEFAULT_PAGE_SIZE};
use store_i18n::{Language, ReloadPolicy};

use crate::logging::{LogFormat, LogLevel};
use crate::AppError;

/// File names searched for, in order, in each directory.
pub const CONFIG_FILE_NAMES: [&str; 3] = ["storefront.toml", ".storefront.toml", "storefront.json"];

/// Storefront configuration.
///
/// Every field has a default, so an empty file is a valid config.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub search: SearchSettings,

    #[serde(default)]
    pub i18n: I18nConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Remote API settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Static token for API access; a signed-in session takes precedence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearer_token: Option<String>,
}

fn default_base_url() -> String {
    "http://localhost:8080/api".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            bearer_token: None,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Listing screen settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSettings {
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    #[serde(default)]
    pub default_sort: SortKey,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            default_sort: SortKey::default(),
        }
    }
}

/// Language settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct I18nConfig {
    /// Language used until the user picks one.
    #[serde(default)]
    pub default_language: Language,

    #[serde(default = "default_reload_delay_ms")]
    pub reload_delay_ms: u64,

    #[serde(default = "default_true")]
    pub reload_on_same_direction: bool,

    /// Extra translations layered over the built-in strings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translations: Option<PathBuf>,
}

fn default_reload_delay_ms() -> u64 {
    300
}

fn default_true() -> bool {
    true
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            default_language: Language::default(),
            reload_delay_ms: default_reload_delay_ms(),
            reload_on_same_direction: true,
            translations: None,
        }
    }
}

impl I18nConfig {
    pub fn reload_policy(&self) -> ReloadPolicy {
        ReloadPolicy::default()
            .with_delay(Duration::from_millis(self.reload_delay_ms))
            .with_reload_on_same_direction(self.reload_on_same_direction)
    }
}

/// Where persisted state lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl StorageConfig {
    /// Path of the persisted key-value state.
    pub fn state_file(&self) -> PathBuf {
        self.data_dir.join("state.json")
    }
}

/// Platform-specific data directory.
fn default_data_dir() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home)
            .join(".local")
            .join("share")
            .join("storefront"),
        None => std::env::temp_dir().join("storefront"),
    }
}

/// Log output settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub level: LogLevel,

    #[serde(default)]
    pub format: LogFormat,
}

/// Outcome of [`StoreConfig::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Turn errors into [`AppError::InvalidConfig`].
    pub fn into_result(self) -> Result<Vec<String>, AppError> {
        if self.errors.is_empty() {
            Ok(self.warnings)
        } else {
            Err(AppError::InvalidConfig(self.errors))
        }
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

impl StoreConfig {
    /// Load config from a TOML or JSON file (by extension).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| AppError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &content)
    }

    fn parse(path: &Path, content: &str) -> Result<Self, AppError> {
        let parse_error = |message: String| AppError::ConfigParse {
            path: path.to_path_buf(),
            message,
        };
        if is_json(path) {
            serde_json::from_str(content).map_err(|e| parse_error(e.to_string()))
        } else {
            toml::from_str(content).map_err(|e| parse_error(e.to_string()))
        }
    }

    /// Save config to a file, in the format its extension implies.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), AppError> {
        let path = path.as_ref();
        let content = if is_json(path) {
            serde_json::to_string_pretty(self).map_err(|e| AppError::ConfigSerialize(e.to_string()))?
        } else {
            toml::to_string_pretty(self).map_err(|e| AppError::ConfigSerialize(e.to_string()))?
        };
        std::fs::write(path, content).map_err(|source| AppError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Find a config file in `start` or any parent directory.
    pub fn find(start: &Path) -> Option<PathBuf> {
        start.ancestors().find_map(|dir| {
            CONFIG_FILE_NAMES
                .iter()
                .map(|name| dir.join(name))
                .find(|candidate| candidate.is_file())
        })
    }

    /// Load the nearest config file, or defaults when none exists.
    pub fn discover(start: &Path) -> Result<(Self, Option<PathBuf>), AppError> {
        match Self::find(start) {
            Some(path) => Ok((Self::load(&path)?, Some(path))),
            None => Ok((Self::default(), None)),
        }
    }

    /// Check values that parse but cannot work.
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::default();

        let base_url = self.api.base_url.trim();
        if base_url.is_empty() {
            report.errors.push("api.base_url is required".to_string());
        } else if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            report
                .errors
                .push(format!("api.base_url '{}' must start with http:// or https://", base_url));
        } else if base_url.starts_with("http://") && !base_url.contains("localhost") {
            report
                .warnings
                .push("api.base_url uses plain HTTP outside localhost".to_string());
        }

        if self.api.timeout_ms == 0 {
            report.errors.push("api.timeout_ms must be greater than 0".to_string());
        }

        if !(1..=100).contains(&self.search.page_size) {
            report
                .errors
                .push("search.page_size must be between 1 and 100".to_string());
        }

        if self.i18n.reload_delay_ms > 5_000 {
            report.warnings.push(format!(
                "i18n.reload_delay_ms of {}ms delays the restart noticeably",
                self.i18n.reload_delay_ms
            ));
        }

        if let Some(path) = &self.i18n.translations {
            if !path.exists() {
                report
                    .errors
                    .push(format!("i18n.translations file not found: {}", path.display()));
            }
        }

        report
    }
}

/// Commented default `storefront.toml`.
pub fn generate_default_config() -> String {
    format!(
        r#"# Storefront configuration

[api]
base_url = "{base_url}"
timeout_ms = {timeout_ms}
# bearer_token = "..."

[search]
page_size = {page_size}
# date_added_desc | date_added_asc | price_asc | price_desc | relevance
default_sort = "{sort}"

[i18n]
# en | ar | fr | he
default_language = "en"
reload_delay_ms = {reload_delay_ms}
reload_on_same_direction = true
# translations = "translations.json"

[storage]
data_dir = "{data_dir}"

[logging]
# trace | debug | info | warn | error | off
level = "info"
# human | json
format = "human"
"#,
        base_url = default_base_url(),
        timeout_ms = default_timeout_ms(),
        page_size = DEFAULT_PAGE_SIZE,
        sort = SortKey::default().as_str(),
        reload_delay_ms = default_reload_delay_ms(),
        data_dir = default_data_dir().display(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = StoreConfig::parse(Path::new("storefront.toml"), "").unwrap();
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.search.page_size, 12);
        assert_eq!(config.search.default_sort, SortKey::DateAddedDesc);
        assert_eq!(config.i18n.reload_policy(), ReloadPolicy::default());
    }

    #[test]
    fn test_parse_toml_sections() {
        let config = StoreConfig::parse(
            Path::new("storefront.toml"),
            r#"
            [api]
            base_url = "https://shop.example.com/api"
            timeout_ms = 2500

            [search]
            page_size = 24
            default_sort = "price_asc"

            [i18n]
            default_language = "ar"
            reload_on_same_direction = false

            [logging]
            level = "debug"
            format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.api.timeout(), Duration::from_millis(2500));
        assert_eq!(config.search.default_sort, SortKey::PriceAsc);
        assert_eq!(config.i18n.default_language, Language::Ar);
        assert!(!config.i18n.reload_policy().reload_on_same_direction);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_parse_json_by_extension() {
        let config = StoreConfig::parse(
            Path::new("storefront.json"),
            r#"{"search": {"page_size": 6}}"#,
        )
        .unwrap();
        assert_eq!(config.search.page_size, 6);
    }

    #[test]
    fn test_parse_error_names_file() {
        let err = StoreConfig::parse(Path::new("bad.toml"), "[api\n").unwrap_err();
        assert!(matches!(err, AppError::ConfigParse { .. }));
        assert!(err.to_string().contains("bad.toml"));
    }

    #[test]
    fn test_generated_config_parses_to_defaults() {
        let config =
            StoreConfig::parse(Path::new("storefront.toml"), &generate_default_config()).unwrap();
        assert_eq!(config, StoreConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["a.toml", "b.json"] {
            let path = dir.path().join(name);
            let mut config = StoreConfig::default();
            config.api.bearer_token = Some("t".into());
            config.i18n.default_language = Language::He;
            config.save(&path).unwrap();
            assert_eq!(StoreConfig::load(&path).unwrap(), config);
        }
    }

    #[test]
    fn test_discover_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(".storefront.toml"), "[search]\npage_size = 30\n").unwrap();

        let (config, path) = StoreConfig::discover(&nested).unwrap();
        assert_eq!(config.search.page_size, 30);
        assert_eq!(path.unwrap(), dir.path().join(".storefront.toml"));
    }

    #[test]
    fn test_validate() {
        assert!(StoreConfig::default().validate().is_valid());

        let mut config = StoreConfig::default();
        config.api.base_url = "ftp://shop".into();
        config.search.page_size = 0;
        config.api.timeout_ms = 0;
        let report = config.validate();
        assert_eq!(report.errors.len(), 3);
        assert!(matches!(
            report.into_result(),
            Err(AppError::InvalidConfig(errors)) if errors.len() == 3
        ));

        let mut config = StoreConfig::default();
        config.api.base_url = "http://shop.example.com".into();
        let report = config.validate();
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 1);
    }
}
