//! Key-value stores and the typed cache wrapper.

use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::CacheError;

/// Byte-oriented persisted state.
///
/// A successful `set_raw` means the value is stored; callers that must not
/// act before the write lands (such as a restart after a language change)
/// rely on this.
pub trait KvStore: Send + Sync {
    fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    fn set_raw(&self, key: &str, value: &[u8]) -> Result<(), CacheError>;

    fn delete(&self, key: &str) -> Result<(), CacheError>;

    /// Store `value` only if the current value equals `expected`
    /// (`None` meaning absent), as one atomic step.
    ///
    /// Returns `false` and leaves the store untouched on a mismatch.
    fn compare_and_set(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        value: &[u8],
    ) -> Result<bool, CacheError>;

    fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.get_raw(key)?.is_some())
    }

    /// All keys, sorted.
    fn keys(&self) -> Result<Vec<String>, CacheError>;
}

impl<T: KvStore + ?Sized> KvStore for Arc<T> {
    fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        (**self).get_raw(key)
    }

    fn set_raw(&self, key: &str, value: &[u8]) -> Result<(), CacheError> {
        (**self).set_raw(key, value)
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        (**self).delete(key)
    }

    fn compare_and_set(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        value: &[u8],
    ) -> Result<bool, CacheError> {
        (**self).compare_and_set(key, expected, value)
    }

    fn exists(&self, key: &str) -> Result<bool, CacheError> {
        (**self).exists(key)
    }

    fn keys(&self) -> Result<Vec<String>, CacheError> {
        (**self).keys()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, CacheError> {
    mutex
        .lock()
        .map_err(|_| CacheError::StoreError("store lock poisoned".to_string()))
}

/// In-process store; contents are lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        Ok(lock(&self.entries)?.get(key).cloned())
    }

    fn set_raw(&self, key: &str, value: &[u8]) -> Result<(), CacheError> {
        lock(&self.entries)?.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        lock(&self.entries)?.remove(key);
        Ok(())
    }

    fn compare_and_set(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        value: &[u8],
    ) -> Result<bool, CacheError> {
        let mut entries = lock(&self.entries)?;
        if entries.get(key).map(Vec::as_slice) != expected {
            return Ok(false);
        }
        entries.insert(key.to_string(), value.to_vec());
        Ok(true)
    }

    fn keys(&self) -> Result<Vec<String>, CacheError> {
        let mut keys: Vec<String> = lock(&self.entries)?.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

/// Store persisted as one JSON document, values base64-encoded.
///
/// Every mutation rewrites the document through a temporary file and a
/// rename, and the in-memory copy only changes once the rename succeeded.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store at `path`, creating parent directories as needed.
    ///
    /// A missing file is an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CacheError> {
        let path = path.as_ref().to_path_buf();
        let open_error = |message: String| CacheError::OpenError {
            path: path.display().to_string(),
            message,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| open_error(e.to_string()))?;
        }

        let entries = match fs::read(&path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| open_error(e.to_string()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(open_error(e.to_string())),
        };

        debug!(path = %path.display(), entries = entries.len(), "opened file store");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), CacheError> {
        let tmp = self.path.with_extension("tmp");
        let bytes = serde_json::to_vec_pretty(entries)?;
        let written = File::create(&tmp).and_then(|mut file| {
            file.write_all(&bytes)?;
            file.sync_all()
        });
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        if let Err(e) = fs::rename(&tmp, &self.path) {
            warn!(path = %self.path.display(), error = %e, "failed to replace store file");
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    /// Apply `apply` to a copy of the entries and persist it if it reports a
    /// change. The lock is held throughout, so check-then-write closures are
    /// atomic with respect to other mutations.
    fn mutate<F>(&self, apply: F) -> Result<(), CacheError>
    where
        F: FnOnce(&mut BTreeMap<String, String>) -> bool,
    {
        let mut entries = lock(&self.entries)?;
        let mut next = entries.clone();
        if !apply(&mut next) {
            return Ok(());
        }
        self.persist(&next)?;
        *entries = next;
        Ok(())
    }
}

impl KvStore for FileStore {
    fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let entries = lock(&self.entries)?;
        entries
            .get(key)
            .map(|encoded| {
                STANDARD
                    .decode(encoded)
                    .map_err(|e| CacheError::StoreError(format!("corrupt value for {}: {}", key, e)))
            })
            .transpose()
    }

    fn set_raw(&self, key: &str, value: &[u8]) -> Result<(), CacheError> {
        let encoded = STANDARD.encode(value);
        self.mutate(|entries| entries.insert(key.to_string(), encoded.clone()) != Some(encoded))
    }

    fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.mutate(|entries| entries.remove(key).is_some())
    }

    fn compare_and_set(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        value: &[u8],
    ) -> Result<bool, CacheError> {
        let expected = expected.map(|bytes| STANDARD.encode(bytes));
        let encoded = STANDARD.encode(value);
        let mut matched = false;
        self.mutate(|entries| {
            if entries.get(key) != expected.as_ref() {
                return false;
            }
            matched = true;
            entries.insert(key.to_string(), encoded) != expected
        })?;
        Ok(matched)
    }

    fn exists(&self, key: &str) -> Result<bool, CacheError> {
        Ok(lock(&self.entries)?.contains_key(key))
    }

    fn keys(&self) -> Result<Vec<String>, CacheError> {
        Ok(lock(&self.entries)?.keys().cloned().collect())
    }
}

/// Typed JSON view over a [`KvStore`].
///
/// # Example
///
/// ```rust,ignore
/// let cache = Cache::new(MemoryStore::new());
/// cache.set("cart:guest_abc", &cart)?;
/// let cart: Option<Cart> = cache.get("cart:guest_abc")?;
/// ```
#[derive(Debug, Clone)]
pub struct Cache<S> {
    store: S,
}

impl<S: KvStore> Cache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Get a value; `None` if the key doesn't exist.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, CacheError> {
        match self.store.get_raw(key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(value)?;
        self.store.set_raw(key, &bytes)
    }

    /// Raw bytes as stored; pair with [`Cache::compare_and_set`].
    pub fn get_raw(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        self.store.get_raw(key)
    }

    /// Store `value` only if the raw stored bytes still equal `expected`.
    pub fn compare_and_set<T: Serialize>(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        value: &T,
    ) -> Result<bool, CacheError> {
        let bytes = serde_json::to_vec(value)?;
        self.store.compare_and_set(key, expected, &bytes)
    }

    pub fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.store.delete(key)
    }

    pub fn exists(&self, key: &str) -> Result<bool, CacheError> {
        self.store.exists(key)
    }

    pub fn keys(&self) -> Result<Vec<String>, CacheError> {
        self.store.keys()
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

/// Build a namespaced cache key.
///
/// # Example
///
/// ```rust
/// use store_cache::cache_key;
///
/// let user = "u42";
/// assert_eq!(cache_key!("wishlist", user), "wishlist:u42");
/// assert_eq!(cache_key!("cart", user, 3), "cart:u42:3");
/// ```
#[macro_export]
macro_rules! cache_key {
    ($prefix:expr, $($part:expr),+ $(,)?) => {{
        let mut key = String::from($prefix);
        $(
            key.push(':');
            key.push_str(&$part.to_string());
        )+
        key
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Badge {
        count: u32,
    }

    #[test]
    fn test_memory_store_basics() {
        let store = MemoryStore::new();
        assert_eq!(store.get_raw("a").unwrap(), None);
        store.set_raw("b", b"2").unwrap();
        store.set_raw("a", b"1").unwrap();
        assert!(store.exists("a").unwrap());
        assert_eq!(store.keys().unwrap(), vec!["a", "b"]);

        store.delete("a").unwrap();
        assert!(!store.exists("a").unwrap());
    }

    #[test]
    fn test_memory_store_compare_and_set() {
        let store = MemoryStore::new();
        assert!(store.compare_and_set("k", None, b"1").unwrap());
        assert!(!store.compare_and_set("k", None, b"2").unwrap());
        assert!(!store.compare_and_set("k", Some(b"0"), b"2").unwrap());
        assert_eq!(store.get_raw("k").unwrap(), Some(b"1".to_vec()));

        assert!(store.compare_and_set("k", Some(b"1"), b"2").unwrap());
        assert_eq!(store.get_raw("k").unwrap(), Some(b"2".to_vec()));
    }

    #[test]
    fn test_cache_typed_roundtrip() {
        let cache = Cache::new(MemoryStore::new());
        let key = cache_key!("badge", "cart");
        cache.set(&key, &Badge { count: 3 }).unwrap();

        assert_eq!(cache.get::<Badge>(&key).unwrap(), Some(Badge { count: 3 }));
        assert_eq!(cache.get::<Badge>("badge:missing").unwrap(), None);
    }

    #[test]
    fn test_cache_type_mismatch_is_error() {
        let cache = Cache::new(MemoryStore::new());
        cache.set("k", &"text").unwrap();
        assert!(matches!(
            cache.get::<Badge>("k"),
            Err(CacheError::SerializeError(_))
        ));
    }

    #[test]
    fn test_file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("store.json");

        {
            let store = FileStore::open(&path).unwrap();
            store.set_raw("language", br#""ar""#).unwrap();
            store.set_raw("binary", &[0, 159, 146, 150]).unwrap();
        }

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get_raw("language").unwrap(), Some(br#""ar""#.to_vec()));
        assert_eq!(reopened.get_raw("binary").unwrap(), Some(vec![0, 159, 146, 150]));
        assert_eq!(reopened.keys().unwrap(), vec!["binary", "language"]);
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_file_store_delete_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let store = FileStore::open(&path).unwrap();
        store.set_raw("k", b"v").unwrap();
        store.delete("k").unwrap();
        drop(store);

        assert!(!FileStore::open(&path).unwrap().exists("k").unwrap());
    }

    #[test]
    fn test_file_store_compare_and_set_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let store = FileStore::open(&path).unwrap();
        store.set_raw("k", b"v1").unwrap();
        assert!(!store.compare_and_set("k", Some(b"stale"), b"v2").unwrap());
        assert!(store.compare_and_set("k", Some(b"v1"), b"v2").unwrap());
        assert!(store.compare_and_set("other", None, b"x").unwrap());
        drop(store);

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get_raw("k").unwrap(), Some(b"v2".to_vec()));
        assert_eq!(reopened.get_raw("other").unwrap(), Some(b"x".to_vec()));
        assert!(!path.with_extension("tmp").exists());
    }

    #[test]
    fn test_file_store_rejects_corrupt_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "{not json").unwrap();

        assert!(matches!(
            FileStore::open(&path),
            Err(CacheError::OpenError { .. })
        ));
    }

    #[test]
    fn test_failed_write_leaves_store_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        let store = FileStore::open(&path).unwrap();
        store.set_raw("k", b"old").unwrap();

        // A directory where the temp file should go makes the write fail.
        fs::create_dir(path.with_extension("tmp")).unwrap();
        assert!(store.set_raw("k", b"new").is_err());
        assert_eq!(store.get_raw("k").unwrap(), Some(b"old".to_vec()));
    }

    #[test]
    fn test_cache_key_macro() {
        assert_eq!(cache_key!("session", "auth"), "session:auth");
        assert_eq!(cache_key!("cart", "u1", 2,), "cart:u1:2");
    }
}
