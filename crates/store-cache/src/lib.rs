//! Persisted key-value state for the storefront.
//!
//! Provides byte-level stores ([`MemoryStore`], [`FileStore`]), a typed JSON
//! [`Cache`] over them, and [`SessionStore`] for the signed-in session and the
//! guest id.
//!
//! # Example
//!
//! ```rust,ignore
//! use store_cache::{cache_key, Cache, FileStore};
//!
//! let cache = Cache::new(FileStore::open("~/.storefront/state.json")?);
//!
//! // Store a value
//! cache.set(&cache_key!("wishlist", user_id), &wishlist)?;
//!
//! // Retrieve a value
//! let wishlist: Option<Wishlist> = cache.get(&cache_key!("wishlist", user_id))?;
//! ```

mod error;
mod kv;
mod session;

pub use error::CacheError;
pub use kv::{Cache, FileStore, KvStore, MemoryStore};
pub use session::{AuthSession, GuestId, SessionRecord, SessionStore};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        AuthSession, Cache, CacheError, FileStore, GuestId, KvStore, MemoryStore, SessionStore,
    };
}
