//! Infinite-scroll result accumulation.
//!
//! [`ResultAccumulator`] is a runtime-free state machine. Every request it
//! allows is described by a [`PageTicket`]; the caller performs the fetch and
//! hands the ticket back together with the outcome. Tickets carry the
//! configuration generation they were issued under, which is how responses
//! for a superseded filter/sort configuration get dropped instead of merged.
//!
//! ```text
//!  Idle ──configure──▶ LoadingFirstPage ──page 1──▶ Loaded ◀──page n──┐
//!                           ▲                         │               │
//!                           │                     load_more      LoadingMore
//!                      configure/refresh              └───────────────┘
//!                                                     (page n == total) ─▶ Exhausted
//! ```

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use tracing::{debug, warn};

use crate::catalog::ProductSummary;
use crate::error::SearchError;
use crate::ids::ProductId;
use crate::search::{Facets, PaginationMeta, SearchConfig, SearchPage, SearchRequest};

/// Monotonic token identifying one configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct Generation(u64);

impl Generation {
    fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}

/// Permission to fetch one page for one generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageTicket {
    pub generation: Generation,
    pub page: u32,
}

impl PageTicket {
    pub fn is_first_page(&self) -> bool {
        self.page == 1
    }
}

/// Where the accumulator is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Nothing configured, or the first page failed.
    Idle,
    /// Page 1 in flight; the list is empty.
    LoadingFirstPage,
    /// At least one page merged and more pages remain.
    Loaded,
    /// A later page is in flight; earlier items stay visible.
    LoadingMore,
    /// The last page has been merged.
    Exhausted,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::LoadingFirstPage => "loading_first_page",
            Phase::Loaded => "loaded",
            Phase::LoadingMore => "loading_more",
            Phase::Exhausted => "exhausted",
        }
    }
}

/// A failed request, surfaced as a retryable flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadFailure {
    /// Page whose request failed.
    pub page: u32,
    pub message: String,
    pub retryable: bool,
}

/// What [`ResultAccumulator::apply`] did with a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Page 1 replaced the result set.
    Replaced { count: usize },
    /// A later page was appended; `duplicates` items were already present.
    Appended { added: usize, duplicates: usize },
    /// The request failed; see [`ResultAccumulator::failure`].
    Failed { page: u32 },
    /// The ticket belongs to a superseded generation or is not in flight.
    Stale,
}

/// Render-ready copy of the accumulator state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultsSnapshot {
    pub generation: Generation,
    pub phase: Phase,
    pub items: Vec<ProductSummary>,
    pub pagination: Option<PaginationMeta>,
    pub facets: Facets,
    pub failure: Option<LoadFailure>,
    /// Whether the end-of-list indicator should be rendered.
    pub end_of_list: bool,
}

impl Default for ResultsSnapshot {
    fn default() -> Self {
        Self {
            generation: Generation::default(),
            phase: Phase::Idle,
            items: Vec::new(),
            pagination: None,
            facets: Facets::default(),
            failure: None,
            end_of_list: false,
        }
    }
}

/// Deduplicated, ordered product list for one configuration.
#[derive(Debug)]
pub struct ResultAccumulator {
    page_size: u32,
    config: Option<SearchConfig>,
    generation: Generation,
    items: Vec<ProductSummary>,
    seen: HashSet<ProductId>,
    /// Last page merged for this generation (0 before page 1 arrives).
    loaded_page: u32,
    pagination: Option<PaginationMeta>,
    facets: Facets,
    in_flight: Option<PageTicket>,
    failure: Option<LoadFailure>,
}

impl ResultAccumulator {
    /// Create an empty accumulator with a fixed page size.
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size: page_size.max(1),
            config: None,
            generation: Generation::default(),
            items: Vec::new(),
            seen: HashSet::new(),
            loaded_page: 0,
            pagination: None,
            facets: Facets::default(),
            in_flight: None,
            failure: None,
        }
    }

    /// Switch to a configuration.
    ///
    /// A value-equal configuration is a no-op and returns `None`. Anything
    /// else clears the list immediately, starts a new generation, and returns
    /// the ticket for page 1.
    pub fn configure(&mut self, config: SearchConfig) -> Option<PageTicket> {
        if self.config.as_ref() == Some(&config) {
            return None;
        }
        self.config = Some(config);
        Some(self.restart())
    }

    /// Reload page 1 of the current configuration under a new generation.
    ///
    /// Used for pull-to-refresh and for retrying a failed first page.
    pub fn refresh(&mut self) -> Option<PageTicket> {
        self.config.as_ref()?;
        Some(self.restart())
    }

    fn restart(&mut self) -> PageTicket {
        self.generation = self.generation.next();
        self.items.clear();
        self.seen.clear();
        self.loaded_page = 0;
        self.pagination = None;
        self.facets = Facets::default();
        self.failure = None;

        let ticket = PageTicket {
            generation: self.generation,
            page: 1,
        };
        self.in_flight = Some(ticket);
        debug!(generation = %self.generation, "search configuration reset");
        ticket
    }

    /// Ticket for the next page, if loading more is allowed right now.
    ///
    /// Ignored (not queued) while a request is in flight, before page 1 has
    /// arrived, and once the last page has been merged.
    pub fn load_more(&mut self) -> Option<PageTicket> {
        if !self.can_load_more() {
            return None;
        }
        let ticket = PageTicket {
            generation: self.generation,
            page: self.loaded_page + 1,
        };
        self.in_flight = Some(ticket);
        self.failure = None;
        debug!(generation = %self.generation, page = ticket.page, "loading more results");
        Some(ticket)
    }

    /// Request parameters for a ticket issued by this accumulator.
    pub fn request_for(&self, ticket: &PageTicket) -> Option<SearchRequest> {
        if ticket.generation != self.generation {
            return None;
        }
        let config = self.config.as_ref()?;
        Some(SearchRequest::for_page(config, ticket.page, self.page_size))
    }

    /// Merge the outcome of a ticket's request.
    pub fn apply(
        &mut self,
        ticket: PageTicket,
        result: Result<SearchPage, SearchError>,
    ) -> MergeOutcome {
        if ticket.generation != self.generation || self.in_flight != Some(ticket) {
            warn!(
                ticket_generation = %ticket.generation,
                current_generation = %self.generation,
                page = ticket.page,
                "discarding stale search response"
            );
            return MergeOutcome::Stale;
        }
        self.in_flight = None;

        let page = match result {
            Ok(page) => page,
            Err(e) => {
                warn!(generation = %self.generation, page = ticket.page, error = %e, "search request failed");
                self.failure = Some(LoadFailure {
                    page: ticket.page,
                    message: e.to_string(),
                    retryable: e.is_retryable(),
                });
                return MergeOutcome::Failed { page: ticket.page };
            }
        };

        let outcome = if ticket.is_first_page() {
            self.items.clear();
            self.seen.clear();
            let (added, _) = self.append_unseen(page.items);
            MergeOutcome::Replaced { count: added }
        } else {
            let (added, duplicates) = self.append_unseen(page.items);
            if duplicates > 0 {
                debug!(page = ticket.page, duplicates, "dropped products already listed");
            }
            MergeOutcome::Appended { added, duplicates }
        };

        self.loaded_page = ticket.page;
        self.pagination = Some(PaginationMeta {
            current_page: ticket.page,
            ..page.pagination
        });
        self.facets = page.facets;
        self.failure = None;

        debug!(
            generation = %self.generation,
            page = ticket.page,
            total_items = self.items.len(),
            phase = ?self.phase(),
            "merged search page"
        );
        outcome
    }

    fn append_unseen(&mut self, incoming: Vec<ProductSummary>) -> (usize, usize) {
        let mut added = 0;
        let mut duplicates = 0;
        for product in incoming {
            if self.seen.insert(product.id.clone()) {
                self.items.push(product);
                added += 1;
            } else {
                duplicates += 1;
            }
        }
        (added, duplicates)
    }

    /// Drop all state; used when the owning screen goes away.
    pub fn clear(&mut self) {
        self.config = None;
        self.generation = self.generation.next();
        self.items.clear();
        self.seen.clear();
        self.loaded_page = 0;
        self.pagination = None;
        self.facets = Facets::default();
        self.in_flight = None;
        self.failure = None;
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        match self.in_flight {
            Some(ticket) if ticket.is_first_page() => Phase::LoadingFirstPage,
            Some(_) => Phase::LoadingMore,
            None if self.loaded_page == 0 => Phase::Idle,
            None if self.is_end_of_list() => Phase::Exhausted,
            None => Phase::Loaded,
        }
    }

    /// Whether `load_more` would issue a ticket.
    pub fn can_load_more(&self) -> bool {
        self.in_flight.is_none()
            && self.loaded_page > 0
            && self
                .pagination
                .is_some_and(|p| self.loaded_page < p.total_pages)
    }

    /// Whether every page of the configuration has been merged.
    pub fn is_end_of_list(&self) -> bool {
        self.in_flight.is_none()
            && self
                .pagination
                .is_some_and(|p| self.loaded_page >= p.total_pages)
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn items(&self) -> &[ProductSummary] {
        &self.items
    }

    pub fn config(&self) -> Option<&SearchConfig> {
        self.config.as_ref()
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn pagination(&self) -> Option<PaginationMeta> {
        self.pagination
    }

    pub fn facets(&self) -> &Facets {
        &self.facets
    }

    pub fn failure(&self) -> Option<&LoadFailure> {
        self.failure.as_ref()
    }

    /// Copy the state for rendering.
    pub fn snapshot(&self) -> ResultsSnapshot {
        ResultsSnapshot {
            generation: self.generation,
            phase: self.phase(),
            items: self.items.clone(),
            pagination: self.pagination,
            facets: self.facets.clone(),
            failure: self.failure.clone(),
            end_of_list: self.is_end_of_list(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::PriceInfo;
    use crate::money::{Currency, Money};
    use crate::search::{FilterDimension, FilterSelection, SortKey};

    fn product(id: u32) -> ProductSummary {
        ProductSummary::new(
            id.to_string(),
            format!("Product {}", id),
            PriceInfo::regular(Money::new(1000, Currency::USD)),
        )
    }

    fn page(ids: &[u32], current_page: u32, total_pages: u32) -> SearchPage {
        SearchPage::new(
            ids.iter().copied().map(product).collect(),
            PaginationMeta {
                current_page,
                total_pages,
                total: u64::from(total_pages) * 12,
            },
        )
    }

    fn ids(acc: &ResultAccumulator) -> Vec<String> {
        acc.items().iter().map(|p| p.id.to_string()).collect()
    }

    fn category(id: &str) -> SearchConfig {
        SearchConfig::new()
            .with_filters(FilterSelection::new().with(FilterDimension::Category, id))
    }

    #[test]
    fn test_starts_idle() {
        let mut acc = ResultAccumulator::new(12);
        assert_eq!(acc.phase(), Phase::Idle);
        assert!(acc.items().is_empty());
        assert_eq!(acc.load_more(), None);
        assert_eq!(acc.refresh(), None);
    }

    #[test]
    fn test_overlapping_pages_are_deduplicated() {
        let mut acc = ResultAccumulator::new(12);
        let first = acc.configure(SearchConfig::new()).unwrap();
        assert_eq!(acc.phase(), Phase::LoadingFirstPage);
        assert_eq!(
            acc.apply(first, Ok(page(&[1, 2, 3], 1, 3))),
            MergeOutcome::Replaced { count: 3 }
        );
        assert_eq!(acc.phase(), Phase::Loaded);

        let second = acc.load_more().unwrap();
        assert_eq!(second.page, 2);
        assert_eq!(acc.phase(), Phase::LoadingMore);
        assert_eq!(
            acc.apply(second, Ok(page(&[3, 4, 5], 2, 3))),
            MergeOutcome::Appended { added: 2, duplicates: 1 }
        );

        assert_eq!(ids(&acc), vec!["1", "2", "3", "4", "5"]);
    }

    #[test]
    fn test_no_duplicates_across_many_pages() {
        let mut acc = ResultAccumulator::new(12);
        let ticket = acc.configure(SearchConfig::new()).unwrap();
        acc.apply(ticket, Ok(page(&[1, 2, 3, 1], 1, 4)));

        for ids_in_page in [&[2, 4, 6][..], &[6, 7, 1], &[8, 8, 9]] {
            let ticket = acc.load_more().unwrap();
            acc.apply(ticket, Ok(page(ids_in_page, ticket.page, 4)));
        }

        let listed = ids(&acc);
        let unique: HashSet<&String> = listed.iter().collect();
        assert_eq!(listed.len(), unique.len());
        assert_eq!(listed, vec!["1", "2", "3", "4", "6", "7", "8", "9"]);
    }

    #[test]
    fn test_page_order_is_preserved() {
        let mut acc = ResultAccumulator::new(12);
        let ticket = acc.configure(SearchConfig::new()).unwrap();
        acc.apply(ticket, Ok(page(&[9, 3, 7], 1, 2)));
        let ticket = acc.load_more().unwrap();
        acc.apply(ticket, Ok(page(&[5, 1, 8], 2, 2)));

        assert_eq!(ids(&acc), vec!["9", "3", "7", "5", "1", "8"]);
    }

    #[test]
    fn test_configuration_change_clears_before_response() {
        let mut acc = ResultAccumulator::new(12);
        let ticket = acc.configure(category("A")).unwrap();
        acc.apply(ticket, Ok(page(&[1, 2], 1, 2)));
        assert_eq!(acc.items().len(), 2);

        let next = acc.configure(category("B")).unwrap();
        assert!(acc.items().is_empty());
        assert_eq!(acc.pagination(), None);
        assert_eq!(acc.phase(), Phase::LoadingFirstPage);
        assert_eq!(next.page, 1);
    }

    #[test]
    fn test_sort_change_resets() {
        let mut acc = ResultAccumulator::new(12);
        let ticket = acc.configure(SearchConfig::new()).unwrap();
        acc.apply(ticket, Ok(page(&[1], 1, 1)));

        let ticket = acc.configure(SearchConfig::new().with_sort(SortKey::PriceAsc));
        assert!(ticket.is_some());
        assert!(acc.items().is_empty());
    }

    #[test]
    fn test_equal_configuration_is_noop() {
        let mut acc = ResultAccumulator::new(12);
        let config = SearchConfig::new().with_filters(
            FilterSelection::new()
                .with(FilterDimension::Brand, "x")
                .with(FilterDimension::Brand, "y"),
        );
        let ticket = acc.configure(config).unwrap();
        acc.apply(ticket, Ok(page(&[1, 2], 1, 2)));

        let same = SearchConfig::new().with_filters(
            FilterSelection::new()
                .with(FilterDimension::Brand, "y")
                .with(FilterDimension::Brand, "x"),
        );
        assert_eq!(acc.configure(same), None);
        assert_eq!(acc.items().len(), 2);
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut acc = ResultAccumulator::new(12);
        let first = acc.configure(category("A")).unwrap();
        acc.apply(first, Ok(page(&[1, 2], 1, 3)));
        let late = acc.load_more().unwrap();

        let b_first = acc.configure(category("B")).unwrap();
        assert_eq!(acc.apply(late, Ok(page(&[3, 4], 2, 3))), MergeOutcome::Stale);
        assert!(acc.items().is_empty());

        acc.apply(b_first, Ok(page(&[10, 11], 1, 1)));
        assert_eq!(ids(&acc), vec!["10", "11"]);
    }

    #[test]
    fn test_stale_first_page_after_rapid_changes() {
        let mut acc = ResultAccumulator::new(12);
        let a = acc.configure(category("A")).unwrap();
        let b = acc.configure(category("B")).unwrap();

        acc.apply(b, Ok(page(&[20], 1, 1)));
        assert_eq!(acc.apply(a, Ok(page(&[10], 1, 1))), MergeOutcome::Stale);
        assert_eq!(ids(&acc), vec!["20"]);
    }

    #[test]
    fn test_load_more_gating() {
        let mut acc = ResultAccumulator::new(12);
        let ticket = acc.configure(SearchConfig::new()).unwrap();

        // Page 1 still in flight.
        assert_eq!(acc.load_more(), None);
        acc.apply(ticket, Ok(page(&[1], 1, 2)));

        let second = acc.load_more().unwrap();
        // Page 2 in flight: ignored, not queued.
        assert_eq!(acc.load_more(), None);
        acc.apply(second, Ok(page(&[2], 2, 2)));

        assert_eq!(acc.phase(), Phase::Exhausted);
        assert!(acc.is_end_of_list());
        let before = acc.snapshot();
        assert_eq!(acc.load_more(), None);
        assert_eq!(acc.snapshot(), before);
    }

    #[test]
    fn test_single_page_result_is_exhausted() {
        let mut acc = ResultAccumulator::new(12);
        let ticket = acc.configure(SearchConfig::new()).unwrap();
        acc.apply(ticket, Ok(page(&[], 1, 1)));
        assert_eq!(acc.phase(), Phase::Exhausted);
        assert_eq!(acc.load_more(), None);
    }

    #[test]
    fn test_first_page_failure_leaves_empty_and_retryable() {
        let mut acc = ResultAccumulator::new(12);
        let ticket = acc.configure(SearchConfig::new()).unwrap();
        let outcome = acc.apply(ticket, Err(SearchError::Timeout));

        assert_eq!(outcome, MergeOutcome::Failed { page: 1 });
        assert!(acc.items().is_empty());
        assert_eq!(acc.phase(), Phase::Idle);
        let failure = acc.failure().unwrap();
        assert_eq!(failure.page, 1);
        assert!(failure.retryable);
        assert_eq!(acc.load_more(), None);

        let retry = acc.refresh().unwrap();
        assert_eq!(retry.page, 1);
        assert!(retry.generation > ticket.generation);
        assert!(acc.failure().is_none());
        acc.apply(retry, Ok(page(&[1, 2], 1, 1)));
        assert_eq!(ids(&acc), vec!["1", "2"]);
    }

    #[test]
    fn test_later_page_failure_keeps_items() {
        let mut acc = ResultAccumulator::new(12);
        let ticket = acc.configure(SearchConfig::new()).unwrap();
        acc.apply(ticket, Ok(page(&[1, 2], 1, 3)));

        let second = acc.load_more().unwrap();
        let outcome = acc.apply(
            second,
            Err(SearchError::Http {
                status: 502,
                message: "bad gateway".into(),
            }),
        );
        assert_eq!(outcome, MergeOutcome::Failed { page: 2 });
        assert_eq!(ids(&acc), vec!["1", "2"]);
        assert_eq!(acc.phase(), Phase::Loaded);
        assert_eq!(acc.failure().map(|f| f.page), Some(2));

        // The user may retry: the same page is requested again.
        let retry = acc.load_more().unwrap();
        assert_eq!(retry.page, 2);
        acc.apply(retry, Ok(page(&[3], 2, 3)));
        assert_eq!(ids(&acc), vec!["1", "2", "3"]);
        assert!(acc.failure().is_none());
    }

    #[test]
    fn test_request_for_ticket() {
        let mut acc = ResultAccumulator::new(24);
        let ticket = acc
            .configure(SearchConfig::new().with_query("lamp"))
            .unwrap();
        let request = acc.request_for(&ticket).unwrap();
        assert_eq!(request.query, "lamp");
        assert_eq!(request.page, 1);
        assert_eq!(request.page_size, 24);

        let newer = acc.refresh().unwrap();
        assert_eq!(acc.request_for(&ticket), None);
        assert!(acc.request_for(&newer).is_some());
    }

    #[test]
    fn test_clear_discards_everything() {
        let mut acc = ResultAccumulator::new(12);
        let ticket = acc.configure(SearchConfig::new()).unwrap();
        acc.apply(ticket, Ok(page(&[1], 1, 2)));
        let pending = acc.load_more().unwrap();

        acc.clear();
        assert!(acc.items().is_empty());
        assert_eq!(acc.config(), None);
        assert_eq!(acc.phase(), Phase::Idle);
        assert_eq!(acc.apply(pending, Ok(page(&[2], 2, 2))), MergeOutcome::Stale);
    }
}
