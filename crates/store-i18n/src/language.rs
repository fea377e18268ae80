//! Supported languages and their layout direction.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::I18nError;

/// Layout direction of a language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    Ltr,
    Rtl,
}

impl TextDirection {
    pub fn is_rtl(&self) -> bool {
        matches!(self, TextDirection::Rtl)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TextDirection::Ltr => "ltr",
            TextDirection::Rtl => "rtl",
        }
    }
}

/// A storefront language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ar,
    Fr,
    He,
}

impl Language {
    pub const ALL: [Language; 4] = [Language::En, Language::Ar, Language::Fr, Language::He];

    /// ISO 639-1 code.
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ar => "ar",
            Language::Fr => "fr",
            Language::He => "he",
        }
    }

    /// Name of the language in itself, for the language picker.
    pub fn native_name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Ar => "العربية",
            Language::Fr => "Français",
            Language::He => "עברית",
        }
    }

    pub fn english_name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Ar => "Arabic",
            Language::Fr => "French",
            Language::He => "Hebrew",
        }
    }

    pub fn direction(&self) -> TextDirection {
        match self {
            Language::Ar | Language::He => TextDirection::Rtl,
            Language::En | Language::Fr => TextDirection::Ltr,
        }
    }

    /// Parse a code, ignoring case and any region suffix (`"ar-EG"` is Arabic).
    pub fn from_code(code: &str) -> Option<Self> {
        let primary = code.trim().split(['-', '_']).next()?.to_ascii_lowercase();
        Self::ALL.into_iter().find(|l| l.code() == primary)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Language {
    type Err = I18nError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| I18nError::UnknownLanguage(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction() {
        assert_eq!(Language::Ar.direction(), TextDirection::Rtl);
        assert_eq!(Language::He.direction(), TextDirection::Rtl);
        assert_eq!(Language::Fr.direction(), TextDirection::Ltr);
        assert!(!Language::En.direction().is_rtl());
    }

    #[test]
    fn test_from_code() {
        assert_eq!(Language::from_code("AR"), Some(Language::Ar));
        assert_eq!(Language::from_code("fr-CA"), Some(Language::Fr));
        assert_eq!(Language::from_code("he_IL"), Some(Language::He));
        assert_eq!(Language::from_code("de"), None);
        assert_eq!(Language::from_code(""), None);
        assert!("xx".parse::<Language>().is_err());
    }

    #[test]
    fn test_serde_uses_code() {
        assert_eq!(serde_json::to_string(&Language::He).unwrap(), r#""he""#);
        let lang: Language = serde_json::from_str(r#""ar""#).unwrap();
        assert_eq!(lang, Language::Ar);
    }
}
