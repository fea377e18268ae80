//! Product summary as returned by search.

use std::collections::BTreeMap;

use crate::catalog::PriceInfo;
use crate::ids::{BrandId, ProductId};
use serde::{Deserialize, Serialize};

/// Language code used when a requested translation is missing.
pub const FALLBACK_LANGUAGE: &str = "en";

/// Text with per-language variants, keyed by language code.
///
/// Deserializes from either a plain string (treated as English) or an object
/// such as `{"en": "Phone", "ar": "هاتف"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WireText")]
pub struct LocalizedText(BTreeMap<String, String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum WireText {
    Plain(String),
    Variants(BTreeMap<String, String>),
}

impl From<WireText> for LocalizedText {
    fn from(wire: WireText) -> Self {
        match wire {
            WireText::Plain(text) => Self::new(text),
            WireText::Variants(map) => Self(
                map.into_iter()
                    .filter(|(_, v)| !v.trim().is_empty())
                    .collect(),
            ),
        }
    }
}

impl LocalizedText {
    /// Create text with only the fallback-language variant.
    pub fn new(text: impl Into<String>) -> Self {
        let mut map = BTreeMap::new();
        map.insert(FALLBACK_LANGUAGE.to_string(), text.into());
        Self(map)
    }

    /// Add or replace a variant.
    pub fn with(mut self, language: impl Into<String>, text: impl Into<String>) -> Self {
        self.0.insert(language.into(), text.into());
        self
    }

    /// Text for `language`, falling back to English and then to any variant.
    pub fn get(&self, language: &str) -> &str {
        self.0
            .get(language)
            .or_else(|| self.0.get(FALLBACK_LANGUAGE))
            .or_else(|| self.0.values().next())
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Whether no variant is present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Brand reference embedded in a product summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandRef {
    pub id: BrandId,
    pub name: String,
}

/// A denormalized product record as returned by search.
///
/// `id` is stable across pages and is what the accumulator deduplicates on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: LocalizedText,
    #[serde(flatten)]
    pub price: PriceInfo,
    /// Primary image URL.
    #[serde(default)]
    pub image: Option<String>,
    /// Aggregate rating, 0-5.
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub brand: Option<BrandRef>,
}

impl ProductSummary {
    /// Create a summary with a regular price and no optional fields.
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: PriceInfo) -> Self {
        Self {
            id: id.into(),
            name: LocalizedText::new(name),
            price,
            image: None,
            rating: None,
            brand: None,
        }
    }

    /// Display name in the given language.
    pub fn display_name(&self, language: &str) -> &str {
        self.name.get(language)
    }
}
