//! Authenticated session and guest identity, persisted in a key-value store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{Cache, CacheError, KvStore};

/// Maximum retry attempts for optimistic concurrency control.
const MAX_UPDATE_RETRIES: u32 = 3;

const AUTH_KEY: &str = "session:auth";
const GUEST_KEY: &str = "session:guest";

/// Identifier for an anonymous shopper, used to key guest carts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuestId(String);

impl GuestId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new random, URL-safe guest id.
    pub fn generate() -> Self {
        use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
        use rand::Rng;

        let bytes: [u8; 18] = rand::thread_rng().gen();
        Self(format!("guest_{}", URL_SAFE_NO_PAD.encode(bytes)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for GuestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A signed-in shopper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    /// Bearer token sent with API requests.
    pub token: String,
    pub user_id: String,
    pub signed_in_at: DateTime<Utc>,
}

impl AuthSession {
    pub fn new(token: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            user_id: user_id.into(),
            signed_in_at: Utc::now(),
        }
    }
}

/// Stored form of the session, versioned for optimistic updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session: AuthSession,
    pub version: u64,
    pub updated_at: DateTime<Utc>,
}

/// Session manager over any [`KvStore`].
///
/// # Example
///
/// ```rust,ignore
/// let sessions = SessionStore::new(FileStore::open(data_dir.join("state.json"))?);
/// sessions.sign_in(AuthSession::new(token, user_id))?;
/// let api = StoreApi::new(base_url).with_bearer_token(sessions.current()?.unwrap().token);
/// ```
#[derive(Debug, Clone)]
pub struct SessionStore<S> {
    cache: Cache<S>,
}

impl<S: KvStore> SessionStore<S> {
    pub fn new(store: S) -> Self {
        Self {
            cache: Cache::new(store),
        }
    }

    /// The signed-in session, if any.
    pub fn current(&self) -> Result<Option<AuthSession>, CacheError> {
        Ok(self.record()?.map(|r| r.session))
    }

    /// Full record including version.
    pub fn record(&self) -> Result<Option<SessionRecord>, CacheError> {
        self.cache.get::<SessionRecord>(AUTH_KEY)
    }

    pub fn is_signed_in(&self) -> Result<bool, CacheError> {
        self.cache.exists(AUTH_KEY)
    }

    /// Store a new session, replacing any previous one.
    pub fn sign_in(&self, session: AuthSession) -> Result<(), CacheError> {
        let version = self.record()?.map(|r| r.version + 1).unwrap_or(1);
        info!(user_id = %session.user_id, "signed in");
        self.cache.set(
            AUTH_KEY,
            &SessionRecord {
                session,
                version,
                updated_at: Utc::now(),
            },
        )
    }

    pub fn sign_out(&self) -> Result<(), CacheError> {
        if self.cache.exists(AUTH_KEY)? {
            info!("signed out");
        }
        self.cache.delete(AUTH_KEY)
    }

    /// Modify the current session, e.g. after a token refresh.
    ///
    /// The write only lands if the stored record is still the one that was
    /// read; otherwise the update is retried, and gives up with
    /// [`CacheError::ConcurrentModification`] after a few attempts.
    pub fn update<F>(&self, f: F) -> Result<AuthSession, CacheError>
    where
        F: Fn(&mut AuthSession),
    {
        for attempt in 0..MAX_UPDATE_RETRIES {
            let raw = self
                .cache
                .get_raw(AUTH_KEY)?
                .ok_or_else(|| CacheError::NotFound(AUTH_KEY.to_string()))?;
            let record: SessionRecord = serde_json::from_slice(&raw)?;

            let mut session = record.session;
            f(&mut session);

            let next = SessionRecord {
                session: session.clone(),
                version: record.version + 1,
                updated_at: Utc::now(),
            };
            if self.cache.compare_and_set(AUTH_KEY, Some(&raw), &next)? {
                return Ok(session);
            }
            debug!(attempt, "session changed during update, retrying");
        }

        Err(CacheError::ConcurrentModification(
            "max retries exceeded".to_string(),
        ))
    }

    /// The persisted guest id, generated on first use.
    pub fn guest_id(&self) -> Result<GuestId, CacheError> {
        if let Some(id) = self.cache.get::<GuestId>(GUEST_KEY)? {
            return Ok(id);
        }
        let id = GuestId::generate();
        self.cache.set(GUEST_KEY, &id)?;
        Ok(id)
    }

    pub fn store(&self) -> &S {
        self.cache.store()
    }
}
