//! Keyed registry of collections shared across callers.

use std::any::Any;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{Error, Result};

/// A collection shared through the registry. Loads on a shared instance are
/// serialized by the mutex.
pub type Shared<C> = Arc<Mutex<C>>;

type Entry = Arc<dyn Any + Send + Sync>;

/// Collections by caller-chosen key, created at most once per key.
#[derive(Default)]
pub struct CollectionRegistry {
    entries: DashMap<String, Entry>,
}

impl CollectionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// The collection stored under `key`, created with `create` if absent.
    ///
    /// Lookup and insertion are one atomic step, so concurrent callers with
    /// the same key get the same instance. A key already holding a different
    /// collection type is an invalid argument.
    pub fn get_or_insert_with<C, F>(&self, key: &str, create: F) -> Result<Shared<C>>
    where
        C: Send + 'static,
        F: FnOnce() -> C,
    {
        let entry = self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| {
                debug!(key, "Creating shared collection");
                Arc::new(Mutex::new(create())) as Entry
            })
            .value()
            .clone();

        entry.downcast::<Mutex<C>>().map_err(|_| {
            Error::invalid_argument(format!(
                "collection key '{}' is already registered with a different type",
                key
            ))
        })
    }

    /// The collection stored under `key`, if present with type `C`.
    pub fn get<C: Send + 'static>(&self, key: &str) -> Option<Shared<C>> {
        let entry = self.entries.get(key).map(|r| Arc::clone(&r))?;
        entry.downcast::<Mutex<C>>().ok()
    }

    /// Drop the registry's handle for `key`. Existing handles stay usable.
    pub fn remove(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Returns true if `key` is registered.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// All registered keys.
    pub fn keys(&self) -> Vec<String> {
        self.entries.iter().map(|r| r.key().clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }
}

impl std::fmt::Debug for CollectionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionRegistry")
            .field("keys", &self.keys())
            .finish()
    }
}
