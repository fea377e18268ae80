//! Storefront API bindings.

use std::time::Duration;

use async_trait::async_trait;
use store_commerce::{SearchClient, SearchError};
use store_commerce::search::{SearchPage, SearchRequest};
use tracing::{debug, warn};

use crate::FetchClient;

/// Product search endpoint, relative to the API base URL.
pub const SEARCH_PATH: &str = "/products/search";

/// Client for the storefront REST API.
#[derive(Debug, Clone)]
pub struct StoreApi {
    client: FetchClient,
    bearer_token: Option<String>,
}

impl StoreApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: FetchClient::new()
                .with_base_url(base_url)
                .with_default_header("Accept", "application/json"),
            bearer_token: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = self.client.with_timeout(timeout);
        self
    }

    /// Authenticate requests with a session token.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Ask the server for product names in a language.
    pub fn with_language(mut self, code: &str) -> Self {
        self.client = self.client.with_default_header("Accept-Language", code);
        self
    }

    pub fn client(&self) -> &FetchClient {
        &self.client
    }
}

#[async_trait]
impl SearchClient for StoreApi {
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage, SearchError> {
        let mut builder = self
            .client
            .get(SEARCH_PATH)
            .query(request.to_query_pairs());
        if let Some(token) = &self.bearer_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await.map_err(|e| {
            warn!(page = request.page, error = %e, "product search request failed");
            SearchError::from(e)
        })?;
        let page: SearchPage = response.error_for_status()?.json()?;

        debug!(
            page = request.page,
            items = page.len(),
            total_pages = page.pagination.total_pages,
            "product search page received"
        );
        Ok(page)
    }
}
