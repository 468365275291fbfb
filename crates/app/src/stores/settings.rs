//! Site settings store: the public profile singleton, its embedded QR
//! codes, and the promotional articles collection.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;

use rosella_core::{Article, ArticleId, MailRelayConfig, PublicProfile, QrCode, QrCodeId};

use crate::images::{self, ImageError};
use crate::logger::SecureLogger;
use crate::store::{
    DocPath, DocSnapshot, DocumentStore, Query, QuerySnapshot, StoreError, shallow_merge,
};
use crate::sync::{Mirror, WatchSlot};

const PROFILE_PATH: (&str, &str) = ("settings", "public_profile");
const ARTICLES_COLLECTION: &str = "articles";

/// Settings operation errors.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Image(#[from] ImageError),
}

/// Sparse update to the public profile. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whatsapp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tiktok: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_js_config: Option<MailRelayConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qr_codes: Option<Vec<QrCode>>,
}

/// Sparse update to one article document.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticlePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
}

struct SettingsInner {
    backend: Arc<dyn DocumentStore>,
    profile: Mirror<PublicProfile>,
    articles: Mirror<Vec<Article>>,
    profile_watch: WatchSlot,
    articles_watch: WatchSlot,
    seed_requested: AtomicBool,
    log: SecureLogger,
}

impl SettingsInner {
    /// Shallow-merge the stored document over the current local profile, so
    /// sparse documents written by older versions keep their defaults.
    fn apply_profile_snapshot(&self, snapshot: &DocSnapshot) {
        if let Some(data) = &snapshot.data {
            let merged = self.profile.read(|current| {
                serde_json::to_value(current).map(|mut base| {
                    shallow_merge(&mut base, data.clone());
                    base
                })
            });
            match merged.and_then(serde_json::from_value::<PublicProfile>) {
                Ok(profile) => {
                    self.profile.set(profile);
                    self.log.debug("Settings updated from realtime listener");
                }
                Err(err) => {
                    self.log.error(&format!("Malformed profile document: {err}"));
                }
            }
        }
        self.profile.set_loading(false);
    }

    fn profile_path() -> DocPath {
        DocPath::doc(PROFILE_PATH.0, PROFILE_PATH.1)
    }
}

fn apply_articles_snapshot(inner: &Arc<SettingsInner>, snapshot: &QuerySnapshot) {
    let articles: Vec<Article> = snapshot
        .docs
        .iter()
        .filter_map(|(id, data)| match serde_json::from_value::<Article>(data.clone()) {
            Ok(mut article) => {
                article.id = ArticleId::new(id.as_str());
                Some(article)
            }
            Err(err) => {
                inner
                    .log
                    .warn(&format!("Skipping malformed article {id}: {err}"));
                None
            }
        })
        .collect();

    let is_empty = articles.is_empty();
    let count = articles.len();
    inner.articles.set(articles);
    inner.articles.set_loading(false);
    inner.log.debug_with("Articles updated", &count);

    // First-run seeding. The once-flag keeps repeat empty snapshots from
    // queueing a second seed; the seed itself re-checks the mirror.
    if is_empty && !inner.seed_requested.swap(true, Ordering::SeqCst) {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let inner = Arc::clone(inner);
                handle.spawn(async move {
                    if let Err(err) = seed_default_articles_inner(&inner).await {
                        inner.log.error(&format!("Article seeding failed: {err}"));
                    }
                });
            }
            Err(_) => {
                inner.log.warn("No async runtime; skipping article seeding");
            }
        }
    }
}

/// The article seeded into an empty collection on first run: the skin
/// consultation promo with its placeholder banner and consultation link.
#[must_use]
pub fn default_article() -> Article {
    Article {
        id: ArticleId::default(),
        title: "Skin Consultation".to_owned(),
        description: "Scopri la tua routine personalizzata con il Dr. Simon Ourian".to_owned(),
        image_url: "https://placehold.co/1200x600/e0e0e0/333333?text=Skin+Consultation".to_owned(),
        link_url: "https://simonourianmd.com/beautyrosebyrosy/SkinConsultation/Home".to_owned(),
        action_text: "Fai il Test della Pelle".to_owned(),
        active: true,
        order: 1,
    }
}

async fn seed_default_articles_inner(inner: &Arc<SettingsInner>) -> Result<(), StoreError> {
    if !inner.articles.read(Vec::is_empty) {
        return Ok(());
    }
    let article = default_article();
    inner
        .backend
        .add(ARTICLES_COLLECTION, serde_json::to_value(&article)?)
        .await?;
    inner.log.info("Seeded default article");
    Ok(())
}

/// Mirrors the public profile singleton and the articles collection.
#[derive(Clone)]
pub struct SettingsStore {
    inner: Arc<SettingsInner>,
}

impl SettingsStore {
    /// `defaults` fills in fields the stored profile document omits; the
    /// mail-relay identifiers from configuration arrive through it.
    #[must_use]
    pub fn new(backend: Arc<dyn DocumentStore>, defaults: PublicProfile) -> Self {
        Self {
            inner: Arc::new(SettingsInner {
                backend,
                profile: Mirror::new(defaults),
                articles: Mirror::new(Vec::new()),
                profile_watch: WatchSlot::new(),
                articles_watch: WatchSlot::new(),
                seed_requested: AtomicBool::new(false),
                log: SecureLogger::new(),
            }),
        }
    }

    /// Open the live profile mirror. Idempotent.
    pub fn subscribe_profile(&self) {
        let inner = &self.inner;
        inner.profile_watch.open_with(|| {
            inner.profile.set_loading(true);
            let weak: Weak<SettingsInner> = Arc::downgrade(inner);
            let on_error_weak = weak.clone();
            inner.backend.watch_doc(
                &SettingsInner::profile_path(),
                Box::new(move |snapshot| {
                    if let Some(inner) = weak.upgrade() {
                        inner.apply_profile_snapshot(&snapshot);
                    }
                }),
                Box::new(move |err| {
                    if let Some(inner) = on_error_weak.upgrade() {
                        inner.log.error(&format!("Settings subscription error: {err}"));
                        inner.profile.set_loading(false);
                    }
                }),
            )
        });
    }

    /// Open the live articles mirror, ordered ascending. Idempotent.
    pub fn subscribe_articles(&self) {
        let inner = &self.inner;
        inner.articles_watch.open_with(|| {
            inner.articles.set_loading(true);
            let weak: Weak<SettingsInner> = Arc::downgrade(inner);
            let on_error_weak = weak.clone();
            inner.backend.watch_query(
                &Query::collection(ARTICLES_COLLECTION).order_by_asc("order"),
                Box::new(move |snapshot| {
                    if let Some(inner) = weak.upgrade() {
                        apply_articles_snapshot(&inner, &snapshot);
                    }
                }),
                Box::new(move |err| {
                    if let Some(inner) = on_error_weak.upgrade() {
                        inner.log.error(&format!("Articles subscription error: {err}"));
                        inner.articles.set_loading(false);
                    }
                }),
            )
        });
    }

    /// Close both live mirrors. Idempotent.
    pub fn unsubscribe_all(&self) {
        self.inner.profile_watch.close();
        self.inner.articles_watch.close();
    }

    #[must_use]
    pub fn profile(&self) -> PublicProfile {
        self.inner.profile.get()
    }

    #[must_use]
    pub fn articles(&self) -> Vec<Article> {
        self.inner.articles.get()
    }

    #[must_use]
    pub fn loading(&self) -> bool {
        self.inner.profile.loading() || self.inner.articles.loading()
    }

    /// Apply a sparse profile update: local mirror first (optimistic), then
    /// a merge write. The next snapshot reconciles either way.
    ///
    /// # Errors
    ///
    /// Returns the store error after logging it; the optimistic local value
    /// stays until a snapshot overwrites it.
    pub async fn update_profile(&self, patch: &ProfilePatch) -> Result<(), SettingsError> {
        let data = serde_json::to_value(patch).map_err(StoreError::from)?;

        let merged = self.inner.profile.read(|current| {
            serde_json::to_value(current).map(|mut base| {
                shallow_merge(&mut base, data.clone());
                base
            })
        });
        if let Ok(profile) = merged
            .and_then(serde_json::from_value::<PublicProfile>)
        {
            self.inner.profile.set(profile);
        }

        match self
            .inner
            .backend
            .write(&SettingsInner::profile_path(), data, true)
            .await
        {
            Ok(()) => {
                self.inner.log.info("Settings saved");
                Ok(())
            }
            Err(err) => {
                self.inner.log.error(&format!("Failed to save settings: {err}"));
                Err(err.into())
            }
        }
    }

    /// Process an uploaded QR image and append it to the profile.
    ///
    /// # Errors
    ///
    /// Image decode/encode failures or the profile write error.
    pub async fn add_qr(&self, name: &str, image_bytes: &[u8]) -> Result<QrCode, SettingsError> {
        let url = images::process_qr_image(image_bytes)?;
        let qr = QrCode {
            id: QrCodeId::generate(),
            name: name.to_owned(),
            url,
            created_at: Utc::now(),
        };

        let mut qr_codes = self.inner.profile.read(|p| p.qr_codes.clone());
        qr_codes.push(qr.clone());
        self.update_profile(&ProfilePatch {
            qr_codes: Some(qr_codes),
            ..ProfilePatch::default()
        })
        .await?;
        Ok(qr)
    }

    /// Rename one stored QR code. Unknown ids are a no-op.
    ///
    /// # Errors
    ///
    /// Returns the profile write error.
    pub async fn rename_qr(&self, id: &QrCodeId, name: &str) -> Result<(), SettingsError> {
        let mut qr_codes = self.inner.profile.read(|p| p.qr_codes.clone());
        for qr in &mut qr_codes {
            if &qr.id == id {
                qr.name = name.to_owned();
            }
        }
        self.update_profile(&ProfilePatch {
            qr_codes: Some(qr_codes),
            ..ProfilePatch::default()
        })
        .await
    }

    /// Remove one stored QR code. Unknown ids are a no-op.
    ///
    /// # Errors
    ///
    /// Returns the profile write error.
    pub async fn remove_qr(&self, id: &QrCodeId) -> Result<(), SettingsError> {
        let mut qr_codes = self.inner.profile.read(|p| p.qr_codes.clone());
        qr_codes.retain(|qr| &qr.id != id);
        self.update_profile(&ProfilePatch {
            qr_codes: Some(qr_codes),
            ..ProfilePatch::default()
        })
        .await
    }

    /// Add an article; the backend assigns the document id.
    ///
    /// # Errors
    ///
    /// Returns the store error after logging it.
    pub async fn add_article(&self, article: &Article) -> Result<ArticleId, SettingsError> {
        let data = serde_json::to_value(article).map_err(StoreError::from)?;
        match self.inner.backend.add(ARTICLES_COLLECTION, data).await {
            Ok(id) => {
                self.inner.log.info_with("Article added", &article.title);
                Ok(ArticleId::new(id))
            }
            Err(err) => {
                self.inner.log.error(&format!("Failed to add article: {err}"));
                Err(err.into())
            }
        }
    }

    /// Merge a sparse patch into one article document.
    ///
    /// # Errors
    ///
    /// Returns the store error after logging it.
    pub async fn update_article(
        &self,
        id: &ArticleId,
        patch: &ArticlePatch,
    ) -> Result<(), SettingsError> {
        let data = serde_json::to_value(patch).map_err(StoreError::from)?;
        let path = DocPath::doc(ARTICLES_COLLECTION, id.as_str());
        match self.inner.backend.write(&path, data, true).await {
            Ok(()) => {
                self.inner.log.info_with("Article updated", id);
                Ok(())
            }
            Err(err) => {
                self.inner.log.error(&format!("Failed to update article: {err}"));
                Err(err.into())
            }
        }
    }

    /// Delete one article document.
    ///
    /// # Errors
    ///
    /// Returns the store error after logging it.
    pub async fn delete_article(&self, id: &ArticleId) -> Result<(), SettingsError> {
        let path = DocPath::doc(ARTICLES_COLLECTION, id.as_str());
        match self.inner.backend.delete(&path).await {
            Ok(()) => {
                self.inner.log.info_with("Article deleted", id);
                Ok(())
            }
            Err(err) => {
                self.inner.log.error(&format!("Failed to delete article: {err}"));
                Err(err.into())
            }
        }
    }

    /// Seed the default article when the collection is empty. Safe to call
    /// repeatedly; a non-empty mirror makes it a no-op.
    ///
    /// # Errors
    ///
    /// Returns the store error from the seed write.
    pub async fn seed_default_articles(&self) -> Result<(), SettingsError> {
        seed_default_articles_inner(&self.inner).await?;
        Ok(())
    }
}
