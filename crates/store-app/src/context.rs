//! Application context shared by every screen.
//!
//! One [`AppContext`] is built at startup and handed to screens by reference.
//! Anything more than one screen needs (config, session, active language,
//! header badge counts) hangs off it, with a `watch` channel wherever screens
//! need to react to changes.

use std::sync::Arc;

use serde::Serialize;
use store_cache::{FileStore, KvStore, SessionStore};
use store_commerce::search::{RouteParams, SearchConfig, SearchScope, SortKey};
use store_commerce::{MergeOutcome, SearchController};
use store_data::StoreApi;
use store_i18n::{AppReloader, Language, LanguageSwitcher, TranslationTable};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::{AppError, StoreConfig};

/// Key-value store shared by the session, preferences, and language switcher.
pub type SharedStore = Arc<dyn KvStore>;

/// Counts shown on the cart and wishlist icons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Badges {
    pub cart: u32,
    pub wishlist: u32,
}

/// Publishes badge counts to subscribed screens.
#[derive(Debug)]
pub struct BadgeCounts {
    tx: watch::Sender<Badges>,
}

impl Default for BadgeCounts {
    fn default() -> Self {
        let (tx, _) = watch::channel(Badges::default());
        Self { tx }
    }
}

impl BadgeCounts {
    pub fn get(&self) -> Badges {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<Badges> {
        self.tx.subscribe()
    }

    pub fn set_cart(&self, count: u32) {
        self.tx.send_if_modified(|badges| replace(&mut badges.cart, count));
    }

    pub fn set_wishlist(&self, count: u32) {
        self.tx
            .send_if_modified(|badges| replace(&mut badges.wishlist, count));
    }

    /// Zero both counts, e.g. after sign-out.
    pub fn reset(&self) {
        self.tx
            .send_if_modified(|badges| std::mem::take(badges) != Badges::default());
    }
}

/// Set `slot` and report whether it changed.
fn replace(slot: &mut u32, value: u32) -> bool {
    std::mem::replace(slot, value) != value
}

/// Search controller bound to one listing screen.
pub struct ListingScreen {
    scope: SearchScope,
    default_sort: SortKey,
    controller: SearchController<StoreApi>,
}

impl ListingScreen {
    /// Apply the screen's route parameters and load page 1 if they changed.
    ///
    /// Routes whose `sort` parameter is missing, blank or unknown use the
    /// configured default sort.
    pub async fn open(&self, params: &RouteParams) -> Option<MergeOutcome> {
        let mut config = SearchConfig::from_route_params(&self.scope, params);
        config.sort = params
            .get("sort")
            .and_then(|v| v.first())
            .and_then(|s| SortKey::from_wire(&s))
            .unwrap_or(self.default_sort);
        self.controller.set_config(config).await
    }

    pub fn scope(&self) -> &SearchScope {
        &self.scope
    }

    pub fn controller(&self) -> &SearchController<StoreApi> {
        &self.controller
    }
}

/// Process-wide application state.
pub struct AppContext<R> {
    config: StoreConfig,
    store: SharedStore,
    session: SessionStore<SharedStore>,
    language: LanguageSwitcher<SharedStore, R>,
    badges: BadgeCounts,
}

impl<R: AppReloader> AppContext<R> {
    /// Open the state file under `[storage] data_dir` and build the context.
    pub fn open(config: StoreConfig, reloader: R) -> Result<Self, AppError> {
        let store = FileStore::open(config.storage.state_file())?;
        Self::with_store(config, Arc::new(store), reloader)
    }

    /// Build the context over an existing store.
    pub fn with_store(config: StoreConfig, store: SharedStore, reloader: R) -> Result<Self, AppError> {
        let mut translations = TranslationTable::builtin();
        if let Some(path) = &config.i18n.translations {
            translations = translations.merge(TranslationTable::load(path)?);
        }

        let language = LanguageSwitcher::load(
            Arc::clone(&store),
            reloader,
            config.i18n.reload_policy(),
            config.i18n.default_language,
        )
        .with_translations(translations);
        info!(language = %language.current(), "application context ready");

        Ok(Self {
            session: SessionStore::new(Arc::clone(&store)),
            store,
            language,
            badges: BadgeCounts::default(),
            config,
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn session(&self) -> &SessionStore<SharedStore> {
        &self.session
    }

    pub fn language(&self) -> &LanguageSwitcher<SharedStore, R> {
        &self.language
    }

    pub fn current_language(&self) -> Language {
        self.language.current()
    }

    pub fn subscribe_language(&self) -> watch::Receiver<Language> {
        self.language.subscribe()
    }

    pub fn badges(&self) -> &BadgeCounts {
        &self.badges
    }

    /// Sign out and clear the per-user badge counts.
    pub fn sign_out(&self) -> Result<(), AppError> {
        self.session.sign_out()?;
        self.badges.reset();
        Ok(())
    }

    /// API client for the current session and language.
    ///
    /// A signed-in session's token takes precedence over `[api] bearer_token`.
    pub fn api(&self) -> Result<StoreApi, AppError> {
        let mut api = StoreApi::new(self.config.api.base_url.clone())
            .with_timeout(self.config.api.timeout())
            .with_language(self.current_language().code());

        let token = match self.session.current()? {
            Some(session) => Some(session.token),
            None => self.config.api.bearer_token.clone(),
        };
        if let Some(token) = token {
            api = api.with_bearer_token(token);
        }
        Ok(api)
    }

    /// Controller for one listing screen.
    pub fn search_controller(&self, scope: SearchScope) -> Result<ListingScreen, AppError> {
        debug!(scope = scope.display_name(), "creating listing controller");
        Ok(ListingScreen {
            scope,
            default_sort: self.config.search.default_sort,
            controller: SearchController::new(self.api()?, self.config.search.page_size),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;
    use store_cache::{AuthSession, MemoryStore};
    use store_commerce::search::ParamValue;
    use store_commerce::Phase;
    use store_i18n::I18nError;

    #[derive(Default)]
    struct CountingReloader {
        reloads: StdMutex<Vec<Language>>,
    }

    impl AppReloader for CountingReloader {
        fn reload(&self, language: Language) -> Result<(), I18nError> {
            self.reloads.lock().unwrap().push(language);
            Ok(())
        }
    }

    fn context(config: StoreConfig) -> AppContext<CountingReloader> {
        AppContext::with_store(config, Arc::new(MemoryStore::new()), CountingReloader::default())
            .unwrap()
    }

    fn params(pairs: &[(&str, &str)]) -> RouteParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), ParamValue::from(*v)))
            .collect()
    }

    #[test]
    fn test_badges_notify_on_change_only() {
        let badges = BadgeCounts::default();
        let mut rx = badges.subscribe();

        badges.set_cart(3);
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().cart, 3);

        badges.set_cart(3);
        assert!(!rx.has_changed().unwrap());

        badges.set_wishlist(1);
        badges.reset();
        assert_eq!(*rx.borrow_and_update(), Badges::default());
    }

    #[tokio::test]
    async fn test_language_switch_is_published_and_persisted() {
        let mut config = StoreConfig::default();
        config.i18n.reload_delay_ms = 1;
        let store: SharedStore = Arc::new(MemoryStore::new());
        let ctx =
            AppContext::with_store(config.clone(), Arc::clone(&store), CountingReloader::default())
                .unwrap();
        let mut rx = ctx.subscribe_language();

        ctx.language().switch(Language::He).await.unwrap();
        assert_eq!(*rx.borrow_and_update(), Language::He);
        assert_eq!(ctx.language().policy().delay, Duration::from_millis(1));

        let restarted = AppContext::with_store(config, store, CountingReloader::default()).unwrap();
        assert_eq!(restarted.current_language(), Language::He);
    }

    #[test]
    fn test_custom_translations_layer_over_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("strings.json");
        std::fs::write(&path, r#"{"en": {"search.retry": "Retry"}}"#).unwrap();

        let mut config = StoreConfig::default();
        config.i18n.translations = Some(path);
        let ctx = context(config);
        assert_eq!(ctx.language().translate("search.retry"), "Retry");
        assert_eq!(ctx.language().translate("search.empty"), "No products found");
    }

    #[test]
    fn test_missing_translations_file_fails() {
        let mut config = StoreConfig::default();
        config.i18n.translations = Some("/nonexistent/strings.json".into());
        let result =
            AppContext::with_store(config, Arc::new(MemoryStore::new()), CountingReloader::default());
        assert!(matches!(result, Err(AppError::I18n(_))));
    }

    #[test]
    fn test_open_uses_state_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = StoreConfig::default();
        config.storage.data_dir = dir.path().join("data");

        let ctx = AppContext::open(config.clone(), CountingReloader::default()).unwrap();
        let guest = ctx.session().guest_id().unwrap();
        drop(ctx);

        let ctx = AppContext::open(config, CountingReloader::default()).unwrap();
        assert_eq!(ctx.session().guest_id().unwrap(), guest);
        assert!(dir.path().join("data").join("state.json").exists());
    }

    #[tokio::test]
    async fn test_search_controller_uses_session_and_language() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/products/search")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("on_sale".into(), "1".into()),
                Matcher::UrlEncoded("sort".into(), "price_desc".into()),
                Matcher::UrlEncoded("page_size".into(), "5".into()),
            ]))
            .match_header("authorization", "Bearer user-token")
            .match_header("accept-language", "ar")
            .with_status(200)
            .with_body(
                r#"{"items": [{"id": 1, "name": "Kettle", "price": 20.0}],
                    "pagination": {"currentPage": 1, "totalPages": 1, "total": 1}}"#,
            )
            .create_async()
            .await;

        let mut config = StoreConfig::default();
        config.api.base_url = server.url();
        config.api.bearer_token = Some("static-token".into());
        config.search.page_size = 5;
        config.search.default_sort = SortKey::PriceDesc;
        config.i18n.default_language = Language::Ar;
        let ctx = context(config);
        ctx.session()
            .sign_in(AuthSession::new("user-token", "u-1"))
            .unwrap();

        let screen = ctx.search_controller(SearchScope::Deals).unwrap();
        let outcome = screen.open(&params(&[])).await;
        assert_eq!(outcome, Some(MergeOutcome::Replaced { count: 1 }));

        let snapshot = screen.controller().snapshot();
        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.phase, Phase::Exhausted);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_route_sort_overrides_default() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/products/search")
            .match_query(Matcher::UrlEncoded("sort".into(), "relevance".into()))
            .match_header("authorization", "Bearer static-token")
            .with_status(200)
            .with_body(r#"{"items": [], "pagination": {"currentPage": 1, "totalPages": 1, "total": 0}}"#)
            .create_async()
            .await;

        let mut config = StoreConfig::default();
        config.api.base_url = server.url();
        config.api.bearer_token = Some("static-token".into());
        config.search.default_sort = SortKey::PriceAsc;
        let ctx = context(config);

        let screen = ctx.search_controller(SearchScope::Search).unwrap();
        screen.open(&params(&[("sort", "relevance")])).await;
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_invalid_route_sort_uses_default() {
        for sort in ["bogus", "  "] {
            let mut server = mockito::Server::new_async().await;
            let mock = server
                .mock("GET", "/products/search")
                .match_query(Matcher::UrlEncoded("sort".into(), "price_asc".into()))
                .with_status(200)
                .with_body(r#"{"items": [], "pagination": {"currentPage": 1, "totalPages": 1, "total": 0}}"#)
                .create_async()
                .await;

            let mut config = StoreConfig::default();
            config.api.base_url = server.url();
            config.search.default_sort = SortKey::PriceAsc;
            let ctx = context(config);

            let screen = ctx.search_controller(SearchScope::Search).unwrap();
            screen.open(&params(&[("sort", sort)])).await;
            mock.assert_async().await;
        }
    }

    #[test]
    fn test_sign_out_resets_badges() {
        let ctx = context(StoreConfig::default());
        ctx.session().sign_in(AuthSession::new("t", "u")).unwrap();
        ctx.badges().set_cart(2);

        ctx.sign_out().unwrap();
        assert!(!ctx.session().is_signed_in().unwrap());
        assert_eq!(ctx.badges().get(), Badges::default());
    }
}
