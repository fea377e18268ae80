//! Translation tables.

use std::collections::HashMap;
use std::path::Path;

use tracing::debug;

use crate::{I18nError, Language};

/// Translated strings for one language, keyed by message id.
pub type TranslationMap = HashMap<String, String>;

/// Per-language translation maps.
///
/// Lookups fall back to English, then to the message id itself, so a missing
/// translation never blanks out the UI.
#[derive(Debug, Clone, Default)]
pub struct TranslationTable {
    maps: HashMap<Language, TranslationMap>,
}

impl TranslationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Strings used by the listing screens and the language picker.
    pub fn builtin() -> Self {
        let entries: [(&str, [&str; 4]); 6] = [
            (
                "search.results",
                ["{count} products", "{count} منتج", "{count} produits", "{count} מוצרים"],
            ),
            (
                "search.empty",
                [
                    "No products found",
                    "لم يتم العثور على منتجات",
                    "Aucun produit trouvé",
                    "לא נמצאו מוצרים",
                ],
            ),
            (
                "search.end_of_list",
                [
                    "You've reached the end",
                    "لقد وصلت إلى النهاية",
                    "Vous avez atteint la fin",
                    "הגעת לסוף",
                ],
            ),
            (
                "search.retry",
                ["Try again", "حاول مرة أخرى", "Réessayer", "נסה שוב"],
            ),
            (
                "lang.changed",
                [
                    "Language set to {language}",
                    "تم تغيير اللغة إلى {language}",
                    "Langue définie sur {language}",
                    "השפה שונתה ל{language}",
                ],
            ),
            (
                "lang.restart",
                [
                    "Restarting to apply layout direction",
                    "جارٍ إعادة التشغيل لتطبيق اتجاه التخطيط",
                    "Redémarrage pour appliquer le sens d'affichage",
                    "מפעיל מחדש כדי להחיל את כיוון התצוגה",
                ],
            ),
        ];

        let mut table = Self::new();
        for (key, texts) in entries {
            for (language, text) in Language::ALL.into_iter().zip(texts) {
                table.insert(language, key, text);
            }
        }
        table
    }

    /// Parse `{"en": {"key": "text"}, "ar": {...}}`.
    ///
    /// Unsupported language codes are skipped.
    pub fn from_json_str(json: &str) -> Result<Self, I18nError> {
        let raw: HashMap<String, TranslationMap> =
            serde_json::from_str(json).map_err(|e| I18nError::Translations(e.to_string()))?;

        let mut table = Self::new();
        for (code, map) in raw {
            match Language::from_code(&code) {
                Some(language) => table.extend(language, map),
                None => debug!(code = %code, "skipping translations for unsupported language"),
            }
        }
        Ok(table)
    }

    /// Load a JSON translation file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, I18nError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| I18nError::Translations(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    pub fn insert(&mut self, language: Language, key: impl Into<String>, text: impl Into<String>) {
        self.maps
            .entry(language)
            .or_default()
            .insert(key.into(), text.into());
    }

    pub fn extend(&mut self, language: Language, map: TranslationMap) {
        self.maps.entry(language).or_default().extend(map);
    }

    /// Layer `other` on top of `self`; its entries win.
    pub fn merge(mut self, other: TranslationTable) -> Self {
        for (language, map) in other.maps {
            self.extend(language, map);
        }
        self
    }

    /// Translated text, or the English text, or the key.
    pub fn translate<'a>(&'a self, language: Language, key: &'a str) -> &'a str {
        self.lookup(language, key)
            .or_else(|| self.lookup(Language::En, key))
            .unwrap_or(key)
    }

    /// Translate and substitute `{name}` placeholders.
    ///
    /// Placeholders without a matching argument are left as-is.
    pub fn format(&self, language: Language, key: &str, args: &[(&str, &str)]) -> String {
        let mut text = self.translate(language, key).to_string();
        for (name, value) in args {
            text = text.replace(&format!("{{{}}}", name), value);
        }
        text
    }

    pub fn has(&self, language: Language, key: &str) -> bool {
        self.lookup(language, key).is_some()
    }

    fn lookup(&self, language: Language, key: &str) -> Option<&str> {
        self.maps.get(&language)?.get(key).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_chain() {
        let mut table = TranslationTable::new();
        table.insert(Language::En, "cart.title", "Cart");
        table.insert(Language::Ar, "cart.title", "السلة");
        table.insert(Language::En, "cart.empty", "Your cart is empty");

        assert_eq!(table.translate(Language::Ar, "cart.title"), "السلة");
        assert_eq!(table.translate(Language::Ar, "cart.empty"), "Your cart is empty");
        assert_eq!(table.translate(Language::Fr, "cart.missing"), "cart.missing");
    }

    #[test]
    fn test_format_placeholders() {
        let table = TranslationTable::builtin();
        assert_eq!(
            table.format(Language::En, "search.results", &[("count", "42")]),
            "42 products"
        );
        assert_eq!(
            table.format(Language::Fr, "lang.changed", &[]),
            "Langue définie sur {language}"
        );
    }

    #[test]
    fn test_builtin_covers_every_language() {
        let table = TranslationTable::builtin();
        for language in Language::ALL {
            assert!(table.has(language, "search.empty"), "{} missing", language);
        }
    }

    #[test]
    fn test_from_json_skips_unknown_languages() {
        let table = TranslationTable::from_json_str(
            r#"{"en": {"hello": "Hello"}, "he": {"hello": "שלום"}, "de": {"hello": "Hallo"}}"#,
        )
        .unwrap();
        assert_eq!(table.translate(Language::He, "hello"), "שלום");
        assert_eq!(table.translate(Language::Fr, "hello"), "Hello");

        assert!(TranslationTable::from_json_str("[]").is_err());
    }

    #[test]
    fn test_merge_overrides() {
        let mut custom = TranslationTable::new();
        custom.insert(Language::En, "search.retry", "Retry");
        let table = TranslationTable::builtin().merge(custom);
        assert_eq!(table.translate(Language::En, "search.retry"), "Retry");
        assert_eq!(table.translate(Language::Ar, "search.retry"), "حاول مرة أخرى");
    }

    #[test]
    fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("strings.json");
        std::fs::write(&path, r#"{"fr": {"bye": "Au revoir"}}"#).unwrap();

        let table = TranslationTable::load(&path).unwrap();
        assert_eq!(table.translate(Language::Fr, "bye"), "Au revoir");
        assert!(TranslationTable::load(dir.path().join("missing.json")).is_err());
    }
}
