//! Product catalog store: live collection mirror plus catalog mutations.

use std::sync::{Arc, Weak};

use serde::Serialize;
use serde_json::json;

use rosella_core::{Price, Product, ProductId, next_rating};

use crate::logger::SecureLogger;
use crate::store::{DocPath, DocumentStore, Query, QuerySnapshot, StoreError};
use crate::sync::{Mirror, WatchSlot};

const COLLECTION: &str = "products";

/// Sparse update to one product document. `None` fields are left untouched
/// by the merge write.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Price>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
}

struct ProductsInner {
    backend: Arc<dyn DocumentStore>,
    products: Mirror<Vec<Product>>,
    watch: WatchSlot,
    log: SecureLogger,
}

impl ProductsInner {
    fn apply_snapshot(&self, snapshot: &QuerySnapshot) {
        let mut products: Vec<Product> = snapshot
            .docs
            .iter()
            .filter_map(|(id, data)| match serde_json::from_value::<Product>(data.clone()) {
                Ok(mut product) => {
                    product.id = ProductId::new(id.as_str());
                    Some(product)
                }
                Err(err) => {
                    self.log
                        .warn(&format!("Skipping malformed product {id}: {err}"));
                    None
                }
            })
            .collect();
        // Stable: unordered products keep their arrival order behind
        // explicitly ordered ones.
        products.sort_by_key(Product::sort_key);

        let count = products.len();
        self.products.set(products);
        self.products.set_loading(false);
        self.log.debug_with("Products updated", &count);
    }
}

/// Mirrors the `products` collection and issues catalog mutations.
#[derive(Clone)]
pub struct ProductsStore {
    inner: Arc<ProductsInner>,
}

impl ProductsStore {
    #[must_use]
    pub fn new(backend: Arc<dyn DocumentStore>) -> Self {
        Self {
            inner: Arc::new(ProductsInner {
                backend,
                products: Mirror::new(Vec::new()),
                watch: WatchSlot::new(),
                log: SecureLogger::new(),
            }),
        }
    }

    /// Open the live collection mirror. Idempotent: a second call while the
    /// watch is open does nothing, so duplicate listeners cannot pile up.
    pub fn subscribe(&self) {
        let inner = &self.inner;
        inner.watch.open_with(|| {
            inner.log.info("Subscribing to products updates");
            inner.products.set_loading(true);
            let weak: Weak<ProductsInner> = Arc::downgrade(inner);
            let on_error_weak = weak.clone();
            inner.backend.watch_query(
                &Query::collection(COLLECTION),
                Box::new(move |snapshot| {
                    if let Some(inner) = weak.upgrade() {
                        inner.apply_snapshot(&snapshot);
                    }
                }),
                Box::new(move |err| {
                    // Keep the stale mirror; just stop pretending to load.
                    if let Some(inner) = on_error_weak.upgrade() {
                        inner.log.error(&format!("Products subscription error: {err}"));
                        inner.products.set_loading(false);
                    }
                }),
            )
        });
    }

    /// Close the live mirror. Idempotent.
    pub fn unsubscribe(&self) {
        self.inner.watch.close();
    }

    /// Current catalog, sorted for display.
    #[must_use]
    pub fn products(&self) -> Vec<Product> {
        self.inner.products.get()
    }

    #[must_use]
    pub fn loading(&self) -> bool {
        self.inner.products.loading()
    }

    /// Add a product; the backend assigns the document id.
    ///
    /// # Errors
    ///
    /// Returns the store error after logging it.
    pub async fn add(&self, product: &Product) -> Result<ProductId, StoreError> {
        let data = serde_json::to_value(product)?;
        match self.inner.backend.add(COLLECTION, data).await {
            Ok(id) => {
                self.inner.log.info_with("Product added", &product.name);
                Ok(ProductId::new(id))
            }
            Err(err) => {
                self.inner.log.error(&format!("Failed to add product: {err}"));
                Err(err)
            }
        }
    }

    /// Merge a sparse patch into one product document.
    ///
    /// # Errors
    ///
    /// Returns the store error after logging it.
    pub async fn update(&self, id: &ProductId, patch: &ProductPatch) -> Result<(), StoreError> {
        let data = serde_json::to_value(patch)?;
        let path = DocPath::doc(COLLECTION, id.as_str());
        match self.inner.backend.write(&path, data, true).await {
            Ok(()) => {
                self.inner.log.info_with("Product updated", id);
                Ok(())
            }
            Err(err) => {
                self.inner.log.error(&format!("Failed to update product: {err}"));
                Err(err)
            }
        }
    }

    /// Delete one product document.
    ///
    /// # Errors
    ///
    /// Returns the store error after logging it; deleting an absent product
    /// is [`StoreError::NotFound`].
    pub async fn delete(&self, id: &ProductId) -> Result<(), StoreError> {
        let path = DocPath::doc(COLLECTION, id.as_str());
        match self.inner.backend.delete(&path).await {
            Ok(()) => {
                self.inner.log.info_with("Product deleted", id);
                Ok(())
            }
            Err(err) => {
                self.inner.log.error(&format!("Failed to delete product: {err}"));
                Err(err)
            }
        }
    }

    /// Persist a new display position for one product.
    ///
    /// # Errors
    ///
    /// Returns the store error after logging it.
    pub async fn update_order(&self, id: &ProductId, order: u32) -> Result<(), StoreError> {
        let path = DocPath::doc(COLLECTION, id.as_str());
        match self
            .inner
            .backend
            .write(&path, json!({ "order": order }), true)
            .await
        {
            Ok(()) => Ok(()),
            Err(err) => {
                self.inner
                    .log
                    .error(&format!("Failed to reorder product: {err}"));
                Err(err)
            }
        }
    }

    /// Fold a visitor rating into the product's running average.
    ///
    /// Reads the current count and average from the local mirror; if two
    /// clients rate concurrently, the later write wins.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] when the product is not in the mirror, or
    /// the write error after logging it.
    pub async fn rate(&self, id: &ProductId, rating: f64) -> Result<(), StoreError> {
        let current = self.inner.products.read(|products| {
            products
                .iter()
                .find(|p| &p.id == id)
                .map(|p| (p.rating_count.unwrap_or(0), p.rating_average.unwrap_or(0.0)))
        });
        let Some((count, average)) = current else {
            return Err(StoreError::NotFound(format!("{COLLECTION}/{id}")));
        };

        let (new_count, new_average) = next_rating(count, average, rating);
        let path = DocPath::doc(COLLECTION, id.as_str());
        let data = json!({
            "ratingAverage": new_average,
            "ratingCount": new_count,
        });
        match self.inner.backend.write(&path, data, true).await {
            Ok(()) => {
                self.inner.log.info_with("Product rated", &new_average);
                Ok(())
            }
            Err(err) => {
                self.inner.log.error(&format!("Failed to rate product: {err}"));
                Err(err)
            }
        }
    }
}
