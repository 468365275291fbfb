//! Promotional articles shown on the landing page.

use serde::{Deserialize, Serialize};

use super::id::ArticleId;

/// One promotional article, sorted ascending by `order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(default, skip_serializing)]
    pub id: ArticleId,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub link_url: String,
    pub action_text: String,
    pub active: bool,
    pub order: u32,
}
