//! Catalog types and the faceted search result controller for the storefront.
//!
//! This crate provides the client-side logic shared by every product listing
//! screen (search, category, brand, deals):
//!
//! - **Catalog**: Product summaries, prices, localized names
//! - **Search**: Route-parameter normalization, sort keys, facets, pagination
//! - **Accumulator**: Deduplicated, generation-gated infinite-scroll results
//! - **Controller**: Async driver wiring a [`SearchClient`] into the accumulator
//!
//! # Example
//!
//! ```rust,ignore
//! use store_commerce::prelude::*;
//!
//! let controller = SearchController::new(client, 12);
//! let mut updates = controller.subscribe();
//!
//! // Route parameters changed: reset and fetch page 1
//! controller.set_route_params(&SearchScope::Deals, &params).await;
//!
//! // Infinite scroll reached the end of the list
//! controller.load_more().await;
//!
//! let snapshot = updates.borrow_and_update().clone();
//! println!("{} products", snapshot.items.len());
//! ```

pub mod error;
pub mod ids;
pub mod money;

pub mod accumulator;
pub mod catalog;
pub mod controller;
pub mod search;

pub use accumulator::{
    Generation, LoadFailure, MergeOutcome, PageTicket, Phase, ResultAccumulator, ResultsSnapshot,
};
pub use controller::{SearchClient, SearchController};
pub use error::SearchError;
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::SearchError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    // Catalog
    pub use crate::catalog::{LocalizedText, PriceInfo, ProductSummary};

    // Search
    pub use crate::search::{
        Facet, FacetValue, Facets, FilterDimension, FilterSelection, PaginationMeta, ParamValue,
        RouteParams, SearchConfig, SearchPage, SearchRequest, SearchScope, SortKey,
    };

    // Accumulation
    pub use crate::accumulator::{
        Generation, LoadFailure, MergeOutcome, PageTicket, Phase, ResultAccumulator,
        ResultsSnapshot,
    };
    pub use crate::controller::{SearchClient, SearchController};
}
