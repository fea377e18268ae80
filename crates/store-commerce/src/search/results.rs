//! Search response, facets, and pagination metadata.

use std::collections::BTreeMap;

use crate::catalog::ProductSummary;
use crate::search::{FilterDimension, FilterSelection};
use serde::{Deserialize, Serialize};

/// Pagination metadata reported for the current configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    /// Page this response answers (1-indexed).
    pub current_page: u32,
    /// Total number of pages; never below 1.
    #[serde(deserialize_with = "at_least_one")]
    pub total_pages: u32,
    /// Total number of matching items.
    pub total: u64,
}

fn at_least_one<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Ok(u32::deserialize(deserializer)?.max(1))
}

impl PaginationMeta {
    /// Derive pagination info from item counts.
    pub fn from_counts(page: u32, per_page: u32, total: u64) -> Self {
        let per_page = u64::from(per_page.max(1));
        let total_pages = if total == 0 {
            1
        } else {
            total.div_ceil(per_page)
        };

        Self {
            current_page: page.max(1),
            total_pages: u32::try_from(total_pages).unwrap_or(u32::MAX),
            total,
        }
    }

    /// Whether there's a page after the current one.
    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// Check if on last page.
    pub fn is_last(&self) -> bool {
        self.current_page >= self.total_pages
    }
}

impl Default for PaginationMeta {
    fn default() -> Self {
        Self::from_counts(1, 1, 0)
    }
}

/// Facet counts: dimension key → value → number of matching items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Facets(BTreeMap<String, BTreeMap<String, u64>>);

impl Facets {
    /// Create empty facets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: record a count.
    pub fn with_count(mut self, dimension: &str, value: &str, count: u64) -> Self {
        self.0
            .entry(dimension.to_string())
            .or_default()
            .insert(value.to_string(), count);
        self
    }

    /// Count for a single value.
    pub fn count(&self, dimension: &str, value: &str) -> Option<u64> {
        self.0.get(dimension)?.get(value).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Presentation facets with selection state.
    ///
    /// Known dimensions come first in display order, unknown ones after by
    /// key. Values are sorted by descending count, then by value.
    pub fn to_facet_list(&self, selection: &FilterSelection) -> Vec<Facet> {
        let rank = |key: &str| {
            FilterDimension::from_key(key)
                .and_then(|d| FilterDimension::ALL.iter().position(|x| *x == d))
                .unwrap_or(usize::MAX)
        };
        let mut keys: Vec<&String> = self.0.keys().collect();
        keys.sort_by(|a, b| {
            rank(a.as_str())
                .cmp(&rank(b.as_str()))
                .then_with(|| a.cmp(b))
        });

        keys.into_iter()
            .map(|key| {
                let dimension = FilterDimension::from_key(key);
                let mut values: Vec<FacetValue> = self.0[key]
                    .iter()
                    .map(|(value, count)| FacetValue {
                        selected: dimension.is_some_and(|d| selection.contains(d, value)),
                        value: value.clone(),
                        count: *count,
                    })
                    .collect();
                values.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));

                Facet {
                    name: dimension
                        .map(|d| d.display_name().to_string())
                        .unwrap_or_else(|| key.clone()),
                    field: key.clone(),
                    dimension,
                    values,
                }
            })
            .collect()
    }
}

/// A facet for the filter UI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Facet {
    /// Display name (e.g., "Brand").
    pub name: String,
    /// Key the API reported the counts under.
    pub field: String,
    /// Dimension the facet filters, if it is a known one.
    pub dimension: Option<FilterDimension>,
    pub values: Vec<FacetValue>,
}

/// A single facet value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FacetValue {
    pub value: String,
    /// Number of items with this value.
    pub count: u64,
    /// Whether currently selected.
    pub selected: bool,
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    pub items: Vec<ProductSummary>,
    #[serde(default)]
    pub facets: Facets,
    pub pagination: PaginationMeta,
}

impl SearchPage {
    /// Create a page without facets.
    pub fn new(items: Vec<ProductSummary>, pagination: PaginationMeta) -> Self {
        Self {
            items,
            facets: Facets::default(),
            pagination,
        }
    }

    /// Set facets.
    pub fn with_facets(mut self, facets: Facets) -> Self {
        self.facets = facets;
        self
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get number of items in this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }
}
