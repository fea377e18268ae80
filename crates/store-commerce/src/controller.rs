//! Async driver for a listing screen.
//!
//! [`SearchController`] owns one [`ResultAccumulator`] and publishes a
//! [`ResultsSnapshot`] after every transition. The accumulator lock is only
//! held to issue a ticket or merge a response, never across the network call,
//! so a configuration change is applied immediately even while an older
//! request is still in flight. The older response is discarded when it lands.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info};

use crate::accumulator::{MergeOutcome, PageTicket, ResultAccumulator, ResultsSnapshot};
use crate::error::SearchError;
use crate::search::{RouteParams, SearchConfig, SearchPage, SearchRequest, SearchScope};

/// Source of search pages.
#[async_trait]
pub trait SearchClient: Send + Sync {
    /// Fetch one page.
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage, SearchError>;
}

#[async_trait]
impl<T: SearchClient + ?Sized> SearchClient for Arc<T> {
    async fn search(&self, request: &SearchRequest) -> Result<SearchPage, SearchError> {
        (**self).search(request).await
    }
}

/// Listing screen controller.
pub struct SearchController<C> {
    client: C,
    state: Mutex<ResultAccumulator>,
    updates: watch::Sender<ResultsSnapshot>,
}

impl<C: SearchClient> SearchController<C> {
    /// Create a controller fetching `page_size` items per page.
    pub fn new(client: C, page_size: u32) -> Self {
        let (updates, _) = watch::channel(ResultsSnapshot::default());
        Self {
            client,
            state: Mutex::new(ResultAccumulator::new(page_size)),
            updates,
        }
    }

    /// Apply a configuration and fetch its first page.
    ///
    /// Returns `None` when the configuration equals the current one.
    pub async fn set_config(&self, config: SearchConfig) -> Option<MergeOutcome> {
        let query = config.query.clone();
        let filters = config.filters.active_count();
        let sort = config.sort;
        let (ticket, request) = self.begin(|acc| acc.configure(config)).await?;
        info!(
            query = query.as_deref().unwrap_or("*"),
            filters,
            sort = sort.as_str(),
            "search configuration changed"
        );
        Some(self.fetch(ticket, request).await)
    }

    /// Normalize route parameters for `scope` and apply them.
    pub async fn set_route_params(
        &self,
        scope: &SearchScope,
        params: &RouteParams,
    ) -> Option<MergeOutcome> {
        self.set_config(SearchConfig::from_route_params(scope, params))
            .await
    }

    /// Fetch the next page, if the list allows it right now.
    pub async fn load_more(&self) -> Option<MergeOutcome> {
        let (ticket, request) = self.begin(ResultAccumulator::load_more).await?;
        Some(self.fetch(ticket, request).await)
    }

    /// Reload from page 1 with the current configuration.
    pub async fn refresh(&self) -> Option<MergeOutcome> {
        let (ticket, request) = self.begin(ResultAccumulator::refresh).await?;
        Some(self.fetch(ticket, request).await)
    }

    /// Receive a snapshot after every transition.
    pub fn subscribe(&self) -> watch::Receiver<ResultsSnapshot> {
        self.updates.subscribe()
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> ResultsSnapshot {
        self.updates.borrow().clone()
    }

    /// Tear down: drop all results; in-flight responses become stale.
    pub async fn close(&self) {
        let mut state = self.state.lock().await;
        state.clear();
        self.publish(&state);
        debug!("search controller closed");
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Issue a ticket and its request under one lock, then publish the
    /// loading state.
    async fn begin<F>(&self, issue: F) -> Option<(PageTicket, SearchRequest)>
    where
        F: FnOnce(&mut ResultAccumulator) -> Option<PageTicket>,
    {
        let mut state = self.state.lock().await;
        let ticket = issue(&mut *state)?;
        let request = state.request_for(&ticket)?;
        self.publish(&state);
        Some((ticket, request))
    }

    async fn fetch(&self, ticket: PageTicket, request: SearchRequest) -> MergeOutcome {
        let result = self.client.search(&request).await;

        let mut state = self.state.lock().await;
        let outcome = state.apply(ticket, result);
        if outcome != MergeOutcome::Stale {
            self.publish(&state);
        }
        outcome
    }

    fn publish(&self, state: &ResultAccumulator) {
        self.updates.send_replace(state.snapshot());
    }
}
