//! In-process reference backend for the document store seam.
//!
//! Keeps documents in a `BTreeMap` keyed by path and delivers watch
//! snapshots synchronously on the writer's call path, mimicking the real
//! backend's behavior of firing local listeners as part of a local write.
//! Optionally persists the whole document tree to a JSON file after each
//! mutation, which is what the CLI seeds into.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;

use crate::sync::Watch;

use super::{
    Direction, DocCallback, DocPath, DocSnapshot, DocumentStore, ErrorCallback, Query,
    QueryCallback, QuerySnapshot, StoreError, shallow_merge,
};

struct DocWatcher {
    id: u64,
    path: String,
    on_next: DocCallback,
    // Kept for contract parity; the in-process backend never faults a watch.
    #[allow(dead_code)]
    on_error: ErrorCallback,
    active: AtomicBool,
}

struct QueryWatcher {
    id: u64,
    query: Query,
    on_next: QueryCallback,
    #[allow(dead_code)]
    on_error: ErrorCallback,
    active: AtomicBool,
}

#[derive(Default)]
struct WatcherRegistry {
    docs: Vec<Arc<DocWatcher>>,
    queries: Vec<Arc<QueryWatcher>>,
}

struct MemoryStoreInner {
    docs: RwLock<BTreeMap<String, Value>>,
    watchers: Mutex<WatcherRegistry>,
    next_watch_id: AtomicU64,
    persist_path: Option<PathBuf>,
}

/// In-process document store.
///
/// Cheaply cloneable; all clones share the same document tree and watcher
/// registry.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<MemoryStoreInner>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty, non-persistent store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MemoryStoreInner {
                docs: RwLock::new(BTreeMap::new()),
                watchers: Mutex::new(WatcherRegistry::default()),
                next_watch_id: AtomicU64::new(1),
                persist_path: None,
            }),
        }
    }

    /// Open a file-backed store, loading existing documents if the file
    /// exists. Every mutation is flushed back to the file.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Write`] when the file exists but cannot be
    /// read or parsed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let docs = if path.exists() {
            let raw = std::fs::read_to_string(&path)
                .map_err(|e| StoreError::Write(format!("read {}: {e}", path.display())))?;
            serde_json::from_str::<BTreeMap<String, Value>>(&raw)
                .map_err(|e| StoreError::Write(format!("parse {}: {e}", path.display())))?
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            inner: Arc::new(MemoryStoreInner {
                docs: RwLock::new(docs),
                watchers: Mutex::new(WatcherRegistry::default()),
                next_watch_id: AtomicU64::new(1),
                persist_path: Some(path),
            }),
        })
    }

    /// Number of live watches. Diagnostic surface used by tests to verify
    /// subscribe idempotence.
    pub fn active_watch_count(&self) -> usize {
        let registry = self.inner.watchers.lock();
        registry.docs.len() + registry.queries.len()
    }

    fn flush(&self) -> Result<(), StoreError> {
        let Some(path) = &self.inner.persist_path else {
            return Ok(());
        };
        let serialized = serde_json::to_string_pretty(&*self.inner.docs.read())?;
        std::fs::write(path, serialized)
            .map_err(|e| StoreError::Write(format!("write {}: {e}", path.display())))
    }

    fn doc_snapshot(&self, path: &str, id: &str) -> DocSnapshot {
        DocSnapshot {
            id: id.to_owned(),
            data: self.inner.docs.read().get(path).cloned(),
        }
    }

    fn query_snapshot(&self, query: &Query) -> QuerySnapshot {
        let prefix = format!("{}/", query.collection);
        let mut docs: Vec<(String, Value)> = self
            .inner
            .docs
            .read()
            .iter()
            .filter_map(|(path, data)| {
                let id = path.strip_prefix(&prefix)?;
                // Only direct members; subcollection docs have deeper paths.
                if id.contains('/') {
                    return None;
                }
                Some((id.to_owned(), data.clone()))
            })
            .collect();

        if let Some(order_by) = &query.order_by {
            docs.sort_by(|(_, a), (_, b)| {
                let ord = compare_field(a.get(&order_by.field), b.get(&order_by.field));
                match order_by.direction {
                    Direction::Ascending => ord,
                    Direction::Descending => ord.reverse(),
                }
            });
        }

        QuerySnapshot { docs }
    }

    /// Deliver the post-mutation state to every watcher affected by a
    /// change at `path`. Callbacks run outside the registry lock so a
    /// listener may issue further store calls.
    fn notify(&self, path: &DocPath) {
        let path_str = path.to_string();
        let (doc_watchers, query_watchers) = {
            let registry = self.inner.watchers.lock();
            let docs: Vec<_> = registry
                .docs
                .iter()
                .filter(|w| w.path == path_str)
                .map(Arc::clone)
                .collect();
            let queries: Vec<_> = path.top_level_collection().map_or_else(Vec::new, |col| {
                registry
                    .queries
                    .iter()
                    .filter(|w| w.query.collection == col)
                    .map(Arc::clone)
                    .collect()
            });
            (docs, queries)
        };

        for watcher in doc_watchers {
            if watcher.active.load(Ordering::SeqCst) {
                (watcher.on_next)(self.doc_snapshot(&path_str, path.id()));
            }
        }
        for watcher in query_watchers {
            if watcher.active.load(Ordering::SeqCst) {
                (watcher.on_next)(self.query_snapshot(&watcher.query));
            }
        }
    }

    fn make_watch_doc(&self, watcher: &Arc<DocWatcher>) -> Watch {
        let inner = Arc::clone(&self.inner);
        let id = watcher.id;
        Watch::new(move || {
            let mut registry = inner.watchers.lock();
            if let Some(pos) = registry.docs.iter().position(|w| w.id == id) {
                let removed = registry.docs.swap_remove(pos);
                removed.active.store(false, Ordering::SeqCst);
            }
        })
    }

    fn make_watch_query(&self, watcher: &Arc<QueryWatcher>) -> Watch {
        let inner = Arc::clone(&self.inner);
        let id = watcher.id;
        Watch::new(move || {
            let mut registry = inner.watchers.lock();
            if let Some(pos) = registry.queries.iter().position(|w| w.id == id) {
                let removed = registry.queries.swap_remove(pos);
                removed.active.store(false, Ordering::SeqCst);
            }
        })
    }
}

/// Missing fields sort last; numbers and strings compare naturally.
fn compare_field(a: Option<&Value>, b: Option<&Value>) -> core::cmp::Ordering {
    use core::cmp::Ordering as O;
    match (a, b) {
        (None, None) => O::Equal,
        (None, Some(_)) => O::Greater,
        (Some(_), None) => O::Less,
        (Some(a), Some(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(O::Equal),
            _ => match (a.as_str(), b.as_str()) {
                (Some(a), Some(b)) => a.cmp(b),
                _ => O::Equal,
            },
        },
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_once(&self, path: &DocPath) -> Result<DocSnapshot, StoreError> {
        Ok(self.doc_snapshot(&path.to_string(), path.id()))
    }

    fn watch_doc(&self, path: &DocPath, on_next: DocCallback, on_error: ErrorCallback) -> Watch {
        let watcher = Arc::new(DocWatcher {
            id: self.inner.next_watch_id.fetch_add(1, Ordering::SeqCst),
            path: path.to_string(),
            on_next,
            on_error,
            active: AtomicBool::new(true),
        });
        self.inner.watchers.lock().docs.push(Arc::clone(&watcher));
        let watch = self.make_watch_doc(&watcher);
        // Initial delivery: current state, immediately.
        (watcher.on_next)(self.doc_snapshot(&watcher.path, path.id()));
        watch
    }

    fn watch_query(
        &self,
        query: &Query,
        on_next: QueryCallback,
        on_error: ErrorCallback,
    ) -> Watch {
        let watcher = Arc::new(QueryWatcher {
            id: self.inner.next_watch_id.fetch_add(1, Ordering::SeqCst),
            query: query.clone(),
            on_next,
            on_error,
            active: AtomicBool::new(true),
        });
        self.inner
            .watchers
            .lock()
            .queries
            .push(Arc::clone(&watcher));
        let watch = self.make_watch_query(&watcher);
        (watcher.on_next)(self.query_snapshot(query));
        watch
    }

    async fn write(&self, path: &DocPath, data: Value, merge: bool) -> Result<(), StoreError> {
        let key = path.to_string();
        {
            let mut docs = self.inner.docs.write();
            match docs.get_mut(&key) {
                Some(existing) if merge => shallow_merge(existing, data),
                _ => {
                    docs.insert(key, data);
                }
            }
        }
        self.flush()?;
        self.notify(path);
        Ok(())
    }

    async fn add(&self, collection: &str, data: Value) -> Result<String, StoreError> {
        let id = uuid::Uuid::new_v4().to_string();
        let path = DocPath::doc(collection, &id);
        self.inner.docs.write().insert(path.to_string(), data);
        self.flush()?;
        self.notify(&path);
        Ok(id)
    }

    async fn delete(&self, path: &DocPath) -> Result<(), StoreError> {
        let key = path.to_string();
        let removed = self.inner.docs.write().remove(&key);
        if removed.is_none() {
            return Err(StoreError::NotFound(key));
        }
        self.flush()?;
        self.notify(path);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    fn noop_error() -> ErrorCallback {
        Box::new(|_| {})
    }

    #[tokio::test]
    async fn test_get_once_absent_is_not_an_error() {
        let store = MemoryStore::new();
        let snap = store
            .get_once(&DocPath::doc("products", "nope"))
            .await
            .unwrap();
        assert!(!snap.exists());
    }

    #[tokio::test]
    async fn test_watch_doc_fires_immediately_then_on_change() {
        let store = MemoryStore::new();
        let path = DocPath::doc("settings", "public_profile");
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        let _watch = store.watch_doc(
            &path,
            Box::new(move |snap| sink.lock().push(snap.data)),
            noop_error(),
        );
        assert_eq!(seen.lock().len(), 1, "initial snapshot");

        store.write(&path, json!({"bio": "hi"}), false).await.unwrap();
        let delivered = seen.lock().clone();
        assert_eq!(delivered.len(), 2);
        assert_eq!(delivered.get(1).unwrap(), &Some(json!({"bio": "hi"})));
    }

    #[tokio::test]
    async fn test_cancel_prevents_further_callbacks() {
        let store = MemoryStore::new();
        let path = DocPath::doc("products", "p-1");
        let count = Arc::new(AtomicUsize::new(0));

        let sink = Arc::clone(&count);
        let watch = store.watch_doc(
            &path,
            Box::new(move |_| {
                sink.fetch_add(1, Ordering::SeqCst);
            }),
            noop_error(),
        );
        watch.cancel();
        store.write(&path, json!({"name": "x"}), false).await.unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(store.active_watch_count(), 0);
    }

    #[tokio::test]
    async fn test_merge_write_is_shallow() {
        let store = MemoryStore::new();
        let path = DocPath::doc("settings", "public_profile");
        store
            .write(&path, json!({"bio": "hi", "name": "Rosy"}), false)
            .await
            .unwrap();
        store
            .write(&path, json!({"bio": "updated"}), true)
            .await
            .unwrap();

        let snap = store.get_once(&path).await.unwrap();
        assert_eq!(snap.data, Some(json!({"bio": "updated", "name": "Rosy"})));
    }

    #[tokio::test]
    async fn test_query_watch_sees_adds_in_order() {
        let store = MemoryStore::new();
        let query = Query::collection("articles").order_by_asc("order");
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        let _watch = store.watch_query(
            &query,
            Box::new(move |snap| {
                sink.lock()
                    .push(snap.docs.iter().map(|(id, _)| id.clone()).collect::<Vec<_>>());
            }),
            noop_error(),
        );

        let second = store.add("articles", json!({"order": 2})).await.unwrap();
        let first = store.add("articles", json!({"order": 1})).await.unwrap();

        let last = seen.lock().last().cloned().unwrap();
        assert_eq!(last, vec![first, second]);
    }

    #[tokio::test]
    async fn test_query_excludes_subcollection_docs() {
        let store = MemoryStore::new();
        store
            .write(
                &DocPath::doc("ambassadors", "a-1"),
                json!({"name": "Rosy"}),
                false,
            )
            .await
            .unwrap();
        store
            .write(
                &DocPath::doc("ambassadors", "a-1").sub("config", "layout"),
                json!({"widgets": []}),
                false,
            )
            .await
            .unwrap();

        let snapshot = store.query_snapshot(&Query::collection("ambassadors"));
        assert_eq!(snapshot.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_absent_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .delete(&DocPath::doc("articles", "missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_file_persistence_roundtrip() {
        let dir = std::env::temp_dir().join(format!("rosella-test-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("data.json");

        let store = MemoryStore::open(&file).unwrap();
        store
            .write(&DocPath::doc("products", "p-1"), json!({"name": "Serum"}), false)
            .await
            .unwrap();
        drop(store);

        let reopened = MemoryStore::open(&file).unwrap();
        let snap = reopened
            .get_once(&DocPath::doc("products", "p-1"))
            .await
            .unwrap();
        assert_eq!(snap.data, Some(json!({"name": "Serum"})));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
