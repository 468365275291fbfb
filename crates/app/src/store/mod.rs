//! Document store collaborator seam.
//!
//! The real backend is an external real-time document database; this module
//! defines the abstract contract the engine programs against, plus the wire
//! shapes (paths, queries, snapshots). [`memory::MemoryStore`] is the
//! in-process reference backend used by the CLI and the test suite.
//!
//! Snapshot delivery contract: a watch fires once immediately with the
//! current state, then once per subsequent change. Delivery happens on the
//! writer's call path, so a write and a listener-driven overwrite from
//! another client can interleave; there is no compare-and-swap or version
//! token (last write wins).

mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use crate::sync::Watch;

/// Errors from the document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Document absent on a read that requires it.
    #[error("document not found: {0}")]
    NotFound(String),

    /// Remote write rejected.
    #[error("write rejected: {0}")]
    Write(String),

    /// Listener-reported fault; non-fatal, the mirror keeps its last value.
    #[error("subscription fault: {0}")]
    Subscription(String),

    /// Payload did not match the expected document shape.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Path to one document: alternating collection and document-id segments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocPath {
    segments: Vec<String>,
}

impl DocPath {
    /// Path to a document in a top-level collection.
    #[must_use]
    pub fn doc(collection: &str, id: &str) -> Self {
        Self {
            segments: vec![collection.to_owned(), id.to_owned()],
        }
    }

    /// Descend into a subcollection document.
    #[must_use]
    pub fn sub(mut self, collection: &str, id: &str) -> Self {
        self.segments.push(collection.to_owned());
        self.segments.push(id.to_owned());
        self
    }

    /// The document id (last segment).
    #[must_use]
    pub fn id(&self) -> &str {
        self.segments.last().map_or("", String::as_str)
    }

    /// The containing collection when this is a top-level collection
    /// document (`collection/id`); `None` for subcollection paths.
    #[must_use]
    pub fn top_level_collection(&self) -> Option<&str> {
        if self.segments.len() == 2 {
            self.segments.first().map(String::as_str)
        } else {
            None
        }
    }
}

impl core::fmt::Display for DocPath {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

/// Sort direction for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Ordering clause applied to a collection query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

/// A query over one top-level collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Query {
    pub collection: String,
    pub order_by: Option<OrderBy>,
}

impl Query {
    /// All documents of a collection, unordered.
    #[must_use]
    pub fn collection(name: &str) -> Self {
        Self {
            collection: name.to_owned(),
            order_by: None,
        }
    }

    /// Order results ascending by a document field.
    #[must_use]
    pub fn order_by_asc(mut self, field: &str) -> Self {
        self.order_by = Some(OrderBy {
            field: field.to_owned(),
            direction: Direction::Ascending,
        });
        self
    }
}

/// One push from a document watch: the full current state of the document.
#[derive(Debug, Clone)]
pub struct DocSnapshot {
    pub id: String,
    /// `None` when the document does not exist.
    pub data: Option<Value>,
}

impl DocSnapshot {
    #[must_use]
    pub const fn exists(&self) -> bool {
        self.data.is_some()
    }
}

/// One push from a query watch: the full current result set.
#[derive(Debug, Clone, Default)]
pub struct QuerySnapshot {
    /// `(document id, document data)` pairs in query order.
    pub docs: Vec<(String, Value)>,
}

impl QuerySnapshot {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.docs.len()
    }
}

/// Snapshot callback for a document watch.
pub type DocCallback = Box<dyn Fn(DocSnapshot) + Send + Sync>;
/// Snapshot callback for a query watch.
pub type QueryCallback = Box<dyn Fn(QuerySnapshot) + Send + Sync>;
/// Error callback for either watch kind.
pub type ErrorCallback = Box<dyn Fn(StoreError) + Send + Sync>;

/// The document database contract.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// One-shot document read. Absent documents yield a snapshot with
    /// `data: None`, not an error.
    async fn get_once(&self, path: &DocPath) -> Result<DocSnapshot, StoreError>;

    /// Open a live watch on one document.
    fn watch_doc(&self, path: &DocPath, on_next: DocCallback, on_error: ErrorCallback) -> Watch;

    /// Open a live watch on a collection query.
    fn watch_query(&self, query: &Query, on_next: QueryCallback, on_error: ErrorCallback)
    -> Watch;

    /// Write a document. With `merge`, top-level fields are shallow-merged
    /// over the existing document; otherwise the document is replaced.
    async fn write(&self, path: &DocPath, data: Value, merge: bool) -> Result<(), StoreError>;

    /// Add a document to a collection under a generated id.
    async fn add(&self, collection: &str, data: Value) -> Result<String, StoreError>;

    /// Delete a document.
    async fn delete(&self, path: &DocPath) -> Result<(), StoreError>;
}

/// Shallow-merge `patch`'s top-level fields over `base`.
///
/// Non-object operands degrade to a full replace, matching the backend's
/// merge-write behavior.
pub fn shallow_merge(base: &mut Value, patch: Value) {
    match (base.as_object_mut(), patch) {
        (Some(base_map), Value::Object(patch_map)) => {
            for (key, value) in patch_map {
                base_map.insert(key, value);
            }
        }
        (_, patch) => *base = patch,
    }
}
