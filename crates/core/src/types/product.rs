//! Product catalog types and rating arithmetic.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// Sort order assigned to products without an explicit `order` field.
///
/// Treated as lowest priority, so unordered products sort after every
/// explicitly ordered one while keeping their insertion order (stable sort).
pub const DEFAULT_SORT_ORDER: u32 = 999;

/// One product in the catalog.
///
/// The `id` is the remote document id and is not stored inside the document
/// itself; stores inject it after deserializing a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(default, skip_serializing)]
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub category: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub stock: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating_average: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating_count: Option<u32>,
}

impl Product {
    /// Sort key for catalog ordering; missing order sorts last.
    #[must_use]
    pub fn sort_key(&self) -> u32 {
        self.order.unwrap_or(DEFAULT_SORT_ORDER)
    }
}

/// Fold one new rating into a running (count, average) pair.
///
/// `new_avg = (old_avg * old_count + rating) / (old_count + 1)`, with the
/// average rounded to 2 decimal places.
#[must_use]
pub fn next_rating(count: u32, average: f64, rating: f64) -> (u32, f64) {
    let new_count = count + 1;
    let new_avg = (average * f64::from(count) + rating) / f64::from(new_count);
    (new_count, (new_avg * 100.0).round() / 100.0)
}
