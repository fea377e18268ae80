//! Search configuration and the wire request.

use crate::search::filter::ON_SALE_FLAG;
use crate::search::{FilterDimension, FilterSelection, RouteParams, SearchScope};
use serde::{Deserialize, Serialize};

/// Query sent when the user has not typed anything.
pub const MATCH_ALL_QUERY: &str = "*";

/// Page size used by listing screens.
pub const DEFAULT_PAGE_SIZE: u32 = 12;

const MAX_PAGE_SIZE: u32 = 100;

/// Sort order for search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Newest first.
    #[default]
    DateAddedDesc,
    /// Oldest first.
    DateAddedAsc,
    /// Price, low to high.
    PriceAsc,
    /// Price, high to low.
    PriceDesc,
    /// Server-side relevance ranking.
    Relevance,
}

impl SortKey {
    /// All sort keys, in the order the sort control lists them.
    pub const ALL: [SortKey; 5] = [
        SortKey::DateAddedDesc,
        SortKey::DateAddedAsc,
        SortKey::PriceAsc,
        SortKey::PriceDesc,
        SortKey::Relevance,
    ];

    /// Parse a wire string; unknown values fall back to the default.
    pub fn parse(s: &str) -> Self {
        Self::from_wire(s).unwrap_or_default()
    }

    /// Parse a wire string, `None` if it names no sort key.
    pub fn from_wire(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL.into_iter().find(|key| key.as_str() == s)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DateAddedDesc => "date_added_desc",
            Self::DateAddedAsc => "date_added_asc",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::Relevance => "relevance",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::DateAddedDesc => "Newest",
            Self::DateAddedAsc => "Oldest",
            Self::PriceAsc => "Price: Low to High",
            Self::PriceDesc => "Price: High to Low",
            Self::Relevance => "Relevance",
        }
    }
}

/// One filter/sort configuration of a listing screen.
///
/// Two configurations that compare equal produce the same result set; any
/// difference resets the accumulator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Free-text query; `None` matches everything.
    pub query: Option<String>,
    pub filters: FilterSelection,
    pub sort: SortKey,
}

impl SearchConfig {
    /// Create an unfiltered configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize route parameters for a screen scope.
    pub fn from_route_params(scope: &SearchScope, params: &RouteParams) -> Self {
        let query = ["q", "query"]
            .iter()
            .find_map(|key| params.get(*key).and_then(|v| v.first()));
        let sort = params
            .get("sort")
            .and_then(|v| v.first())
            .map(|s| SortKey::parse(&s))
            .unwrap_or_default();

        let config = Self {
            query,
            filters: FilterSelection::from_route_params(params),
            sort,
        };
        scope.apply(config)
    }

    /// Set the text query; blank text clears it.
    pub fn with_query(mut self, q: impl Into<String>) -> Self {
        let q = q.into();
        let q = q.trim();
        self.query = (!q.is_empty()).then(|| q.to_string());
        self
    }

    /// Set the filter selection.
    pub fn with_filters(mut self, filters: FilterSelection) -> Self {
        self.filters = filters;
        self
    }

    /// Set the sort key.
    pub fn with_sort(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }
}

/// Typed request for one page of product search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub page: u32,
    pub page_size: u32,
    pub sort_key: SortKey,
    pub category_ids: Vec<String>,
    pub brand_names: Vec<String>,
    pub price_ranges: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_sale: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl SearchRequest {
    /// Build the request for `page` of a configuration.
    pub fn for_page(config: &SearchConfig, page: u32, page_size: u32) -> Self {
        let filters = &config.filters;
        Self {
            query: config
                .query
                .clone()
                .unwrap_or_else(|| MATCH_ALL_QUERY.to_string()),
            page: page.max(1),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
            sort_key: config.sort,
            category_ids: filters.values(FilterDimension::Category),
            brand_names: filters.values(FilterDimension::Brand),
            price_ranges: filters.values(FilterDimension::PriceRange),
            on_sale: filters.on_sale().then(|| ON_SALE_FLAG.to_string()),
            status: filters.values(FilterDimension::Status).into_iter().next(),
        }
    }

    /// Calculate the item offset of this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }

    /// Encode as URL query pairs; arrays repeat their `[]` key.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("q".to_string(), self.query.clone()),
            ("page".to_string(), self.page.to_string()),
            ("page_size".to_string(), self.page_size.to_string()),
            ("sort".to_string(), self.sort_key.as_str().to_string()),
        ];

        let arrays = [
            ("category_ids[]", &self.category_ids),
            ("brand_names[]", &self.brand_names),
            ("price_ranges[]", &self.price_ranges),
        ];
        for (key, values) in arrays {
            pairs.extend(values.iter().map(|v| (key.to_string(), v.clone())));
        }

        if let Some(on_sale) = &self.on_sale {
            pairs.push(("on_sale".to_string(), on_sale.clone()));
        }
        if let Some(status) = &self.status {
            pairs.push(("status".to_string(), status.clone()));
        }

        pairs
    }
}
