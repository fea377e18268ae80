//! Search module.
//!
//! Contains route-parameter normalization, sort keys, the wire request and
//! response shapes, facets, and pagination metadata.

mod filter;
mod query;
mod results;
mod scope;

pub use filter::{FilterDimension, FilterSelection, ParamValue, RouteParams};
pub use query::{SearchConfig, SearchRequest, SortKey, DEFAULT_PAGE_SIZE, MATCH_ALL_QUERY};
pub use results::{Facet, FacetValue, Facets, PaginationMeta, SearchPage};
pub use scope::SearchScope;
