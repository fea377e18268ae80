//! Listing screen scopes.

use crate::ids::{BrandId, CategoryId};
use crate::search::{FilterDimension, SearchConfig};
use serde::{Deserialize, Serialize};

/// Which listing screen a controller serves.
///
/// Search, category, brand, and deals screens share one controller; the
/// scope pins the screen's own filter on top of whatever the route carries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum SearchScope {
    /// Free search; nothing pinned.
    #[default]
    Search,
    /// Category page; the category is always selected.
    Category(CategoryId),
    /// Brand page; the brand is always selected.
    Brand(BrandId),
    /// Deals page; only on-sale items.
    Deals,
}

impl SearchScope {
    /// Pin the scope's filter onto a configuration.
    pub fn apply(&self, mut config: SearchConfig) -> SearchConfig {
        match self {
            SearchScope::Search => {}
            SearchScope::Category(id) => {
                config.filters.select(FilterDimension::Category, id.as_str());
            }
            SearchScope::Brand(brand) => {
                config.filters.select(FilterDimension::Brand, brand.as_str());
            }
            SearchScope::Deals => config.filters.set_on_sale(true),
        }
        config
    }

    /// Dimension pinned by this scope, if any.
    pub fn pinned_dimension(&self) -> Option<FilterDimension> {
        match self {
            SearchScope::Search => None,
            SearchScope::Category(_) => Some(FilterDimension::Category),
            SearchScope::Brand(_) => Some(FilterDimension::Brand),
            SearchScope::Deals => Some(FilterDimension::OnSale),
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SearchScope::Search => "Search",
            SearchScope::Category(_) => "Category",
            SearchScope::Brand(_) => "Brand",
            SearchScope::Deals => "Deals",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::RouteParams;

    #[test]
    fn test_category_scope_pins_category() {
        let mut params = RouteParams::new();
        params.insert("category".into(), "9".into());

        let config =
            SearchConfig::from_route_params(&SearchScope::Category(CategoryId::new("4")), &params);
        assert_eq!(config.filters.values(FilterDimension::Category), vec!["4", "9"]);
    }

    #[test]
    fn test_deals_scope_forces_on_sale() {
        let mut params = RouteParams::new();
        params.insert("on_sale".into(), "0".into());

        let config = SearchConfig::from_route_params(&SearchScope::Deals, &params);
        assert!(config.filters.on_sale());
    }

    #[test]
    fn test_search_scope_is_passthrough() {
        let config = SearchConfig::from_route_params(&SearchScope::Search, &RouteParams::new());
        assert_eq!(config, SearchConfig::new());
        assert_eq!(SearchScope::Search.pinned_dimension(), None);
    }
}
