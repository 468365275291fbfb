//! Visitor-local product interactions: likes, saves, and the visitor's own
//! star ratings. Persisted per device through a key-value seam, never to
//! the shared backend.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use rosella_core::ProductId;

use crate::logger::SecureLogger;
use crate::sync::Mirror;

const LIKED_KEY: &str = "likedProducts";
const SAVED_KEY: &str = "savedProducts";
const RATINGS_KEY: &str = "productRatings";

/// Device-local persistence seam (browser local storage, a prefs file).
pub trait KeyValueStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

/// In-process key-value storage for tests and the CLI.
#[derive(Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries.lock().insert(key.to_owned(), value.to_owned());
    }
}

struct InteractionsInner {
    storage: Arc<dyn KeyValueStorage>,
    liked: Mirror<Vec<ProductId>>,
    saved: Mirror<Vec<ProductId>>,
    ratings: Mirror<HashMap<ProductId, f64>>,
    log: SecureLogger,
}

impl InteractionsInner {
    fn load_list(&self, key: &str) -> Vec<ProductId> {
        self.storage
            .get(key)
            .and_then(|raw| match serde_json::from_str(&raw) {
                Ok(list) => Some(list),
                Err(err) => {
                    self.log.warn(&format!("Discarding corrupt {key}: {err}"));
                    None
                }
            })
            .unwrap_or_default()
    }

    fn persist<T: serde::Serialize>(&self, key: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(raw) => self.storage.set(key, &raw),
            Err(err) => self.log.error(&format!("Failed to persist {key}: {err}")),
        }
    }
}

/// Per-device interaction state.
#[derive(Clone)]
pub struct InteractionsStore {
    inner: Arc<InteractionsInner>,
}

impl InteractionsStore {
    /// Load any persisted interactions from storage.
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        let log = SecureLogger::new();
        let inner = InteractionsInner {
            storage,
            liked: Mirror::new(Vec::new()),
            saved: Mirror::new(Vec::new()),
            ratings: Mirror::new(HashMap::new()),
            log,
        };
        inner.liked.set(inner.load_list(LIKED_KEY));
        inner.saved.set(inner.load_list(SAVED_KEY));
        let ratings = inner
            .storage
            .get(RATINGS_KEY)
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default();
        inner.ratings.set(ratings);

        Self {
            inner: Arc::new(inner),
        }
    }

    /// Toggle a like; returns the new state.
    pub fn toggle_like(&self, id: &ProductId) -> bool {
        let liked = self.inner.liked.update(|list| toggle(list, id));
        self.inner.persist(LIKED_KEY, &self.inner.liked.get());
        liked
    }

    #[must_use]
    pub fn is_liked(&self, id: &ProductId) -> bool {
        self.inner.liked.read(|list| list.contains(id))
    }

    /// Toggle a save-for-later; returns the new state.
    pub fn toggle_save(&self, id: &ProductId) -> bool {
        let saved = self.inner.saved.update(|list| toggle(list, id));
        self.inner.persist(SAVED_KEY, &self.inner.saved.get());
        saved
    }

    #[must_use]
    pub fn is_saved(&self, id: &ProductId) -> bool {
        self.inner.saved.read(|list| list.contains(id))
    }

    /// Remember the visitor's own star rating for a product.
    pub fn set_rating(&self, id: &ProductId, rating: f64) {
        self.inner
            .ratings
            .update(|ratings| ratings.insert(id.clone(), rating));
        self.inner.persist(RATINGS_KEY, &self.inner.ratings.get());
    }

    #[must_use]
    pub fn rating(&self, id: &ProductId) -> Option<f64> {
        self.inner.ratings.read(|ratings| ratings.get(id).copied())
    }
}

fn toggle(list: &mut Vec<ProductId>, id: &ProductId) -> bool {
    if let Some(pos) = list.iter().position(|p| p == id) {
        list.remove(pos);
        false
    } else {
        list.push(id.clone());
        true
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_like_roundtrip() {
        let store = InteractionsStore::new(Arc::new(MemoryStorage::new()));
        let id = ProductId::new("p-1");

        assert!(store.toggle_like(&id));
        assert!(store.is_liked(&id));
        assert!(!store.toggle_like(&id));
        assert!(!store.is_liked(&id));
    }

    #[test]
    fn test_state_survives_reload() {
        let storage = Arc::new(MemoryStorage::new());
        let id = ProductId::new("p-1");
        {
            let store = InteractionsStore::new(Arc::clone(&storage) as Arc<dyn KeyValueStorage>);
            store.toggle_like(&id);
            store.toggle_save(&id);
            store.set_rating(&id, 4.0);
        }

        let reloaded = InteractionsStore::new(storage);
        assert!(reloaded.is_liked(&id));
        assert!(reloaded.is_saved(&id));
        assert_eq!(reloaded.rating(&id), Some(4.0));
    }

    #[test]
    fn test_corrupt_storage_starts_clean() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(LIKED_KEY, "not json");
        let store = InteractionsStore::new(storage);
        assert!(!store.is_liked(&ProductId::new("p-1")));
    }
}
