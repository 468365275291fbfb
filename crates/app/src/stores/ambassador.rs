//! Ambassador store: the currently viewed ambassador profile plus the live
//! mirror of their page layout.
//!
//! The layout watch is keyed by ambassador id, so loading a different
//! ambassador replaces the open watch instead of stacking a second one.

use std::sync::{Arc, Weak};

use serde_json::json;

use rosella_core::{AmbassadorId, AmbassadorProfile, WidgetConfig, WidgetId};

use crate::logger::SecureLogger;
use crate::store::{DocPath, DocSnapshot, DocumentStore, StoreError};
use crate::sync::{Mirror, WatchSlot};

const COLLECTION: &str = "ambassadors";

fn layout_path(id: &AmbassadorId) -> DocPath {
    DocPath::doc(COLLECTION, id.as_str()).sub("config", "layout")
}

struct AmbassadorInner {
    backend: Arc<dyn DocumentStore>,
    current: Mirror<Option<AmbassadorProfile>>,
    widgets: Mirror<Vec<WidgetConfig>>,
    layout_watch: WatchSlot,
    log: SecureLogger,
}

impl AmbassadorInner {
    fn apply_layout_snapshot(&self, snapshot: &DocSnapshot) {
        let widgets = match &snapshot.data {
            Some(data) => {
                match serde_json::from_value::<Vec<WidgetConfig>>(
                    data.get("widgets").cloned().unwrap_or(json!([])),
                ) {
                    Ok(widgets) => widgets,
                    Err(err) => {
                        // Keep the last good layout rather than blanking
                        // the page on a malformed document.
                        self.log.warn(&format!("Malformed layout document: {err}"));
                        return;
                    }
                }
            }
            None => Vec::new(),
        };
        let count = widgets.len();
        self.widgets.set(widgets);
        self.log.debug_with("Layout updated", &count);
    }
}

/// Mirrors one ambassador's profile and page layout.
#[derive(Clone)]
pub struct AmbassadorStore {
    inner: Arc<AmbassadorInner>,
}

impl AmbassadorStore {
    #[must_use]
    pub fn new(backend: Arc<dyn DocumentStore>) -> Self {
        Self {
            inner: Arc::new(AmbassadorInner {
                backend,
                current: Mirror::new(None),
                widgets: Mirror::new(Vec::new()),
                layout_watch: WatchSlot::new(),
                log: SecureLogger::new(),
            }),
        }
    }

    /// Load an ambassador by id and open the live layout watch for them.
    ///
    /// An unknown id clears the store and is not an error; the caller shows
    /// a not-found page.
    ///
    /// # Errors
    ///
    /// Returns the read error after logging it.
    pub async fn load(&self, id: &AmbassadorId) -> Result<(), StoreError> {
        let _guard = self.inner.current.loading_guard();
        let path = DocPath::doc(COLLECTION, id.as_str());
        let snapshot = match self.inner.backend.get_once(&path).await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                self.inner
                    .log
                    .error(&format!("Failed to load ambassador: {err}"));
                return Err(err);
            }
        };

        let Some(data) = snapshot.data else {
            self.inner.log.warn_with("Ambassador not found", id);
            self.inner.current.set(None);
            self.inner.widgets.set(Vec::new());
            self.inner.layout_watch.close();
            return Ok(());
        };

        let mut profile: AmbassadorProfile = serde_json::from_value(data)?;
        profile.id = id.clone();
        self.inner.log.info_with("Ambassador loaded", &profile.name);
        self.inner.current.set(Some(profile));
        self.subscribe_layout(id);
        Ok(())
    }

    /// Open (or re-key) the live layout watch. Loading a different
    /// ambassador cancels the previous watch.
    fn subscribe_layout(&self, id: &AmbassadorId) {
        let inner = &self.inner;
        inner.layout_watch.replace_with(|| {
            let weak: Weak<AmbassadorInner> = Arc::downgrade(inner);
            let on_error_weak = weak.clone();
            inner.backend.watch_doc(
                &layout_path(id),
                Box::new(move |snapshot| {
                    if let Some(inner) = weak.upgrade() {
                        inner.apply_layout_snapshot(&snapshot);
                    }
                }),
                Box::new(move |err| {
                    if let Some(inner) = on_error_weak.upgrade() {
                        inner.log.error(&format!("Layout subscription error: {err}"));
                    }
                }),
            )
        });
    }

    /// Clear the store and close the layout watch.
    pub fn unload(&self) {
        self.inner.layout_watch.close();
        self.inner.current.set(None);
        self.inner.widgets.set(Vec::new());
    }

    /// Persist a theme color for the current ambassador, optimistically
    /// updating the local profile. No-op when nothing is loaded.
    ///
    /// # Errors
    ///
    /// Returns the write error after logging it.
    pub async fn update_theme(&self, color: &str) -> Result<(), StoreError> {
        let Some(id) = self
            .inner
            .current
            .read(|c| c.as_ref().map(|p| p.id.clone()))
        else {
            return Ok(());
        };

        let path = DocPath::doc(COLLECTION, id.as_str());
        match self
            .inner
            .backend
            .write(&path, json!({ "themeColor": color }), true)
            .await
        {
            Ok(()) => {
                self.inner.current.update(|current| {
                    if let Some(profile) = current {
                        profile.theme_color = Some(color.to_owned());
                    }
                });
                self.inner.log.info("Theme updated");
                Ok(())
            }
            Err(err) => {
                self.inner.log.error(&format!("Failed to update theme: {err}"));
                Err(err)
            }
        }
    }

    #[must_use]
    pub fn current(&self) -> Option<AmbassadorProfile> {
        self.inner.current.get()
    }

    #[must_use]
    pub fn loading(&self) -> bool {
        self.inner.current.loading()
    }

    /// The mirrored layout.
    #[must_use]
    pub fn widgets(&self) -> Vec<WidgetConfig> {
        self.inner.widgets.get()
    }

    /// Append a widget to the local layout (optimistic; persisted by the
    /// builder's explicit save).
    pub fn push_widget(&self, widget: WidgetConfig) {
        self.inner.widgets.update(|widgets| widgets.push(widget));
    }

    /// Remove a widget from the local layout. Returns whether it was there.
    pub fn remove_widget(&self, id: &WidgetId) -> bool {
        self.inner.widgets.update(|widgets| {
            let before = widgets.len();
            widgets.retain(|w| &w.id != id);
            widgets.len() != before
        })
    }

    /// The layout document path for the current ambassador, if any.
    #[must_use]
    pub fn current_layout_path(&self) -> Option<DocPath> {
        self.inner
            .current
            .read(|c| c.as_ref().map(|p| layout_path(&p.id)))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use rosella_core::{GridPlacement, WidgetProps};

    async fn seeded() -> (AmbassadorStore, MemoryStore) {
        let backend = MemoryStore::new();
        backend
            .write(
                &DocPath::doc("ambassadors", "rosy"),
                json!({"name": "Rosy", "photoUrl": "", "whatsapp": "+39000000000"}),
                false,
            )
            .await
            .unwrap();
        let store = AmbassadorStore::new(Arc::new(backend.clone()));
        (store, backend)
    }

    fn hero(id: &str) -> WidgetConfig {
        WidgetConfig {
            id: WidgetId::new(id),
            props: WidgetProps::Hero {
                title: "Welcome".to_owned(),
                subtitle: "Discover Beauty".to_owned(),
            },
            grid: GridPlacement::default(),
        }
    }

    #[tokio::test]
    async fn test_load_known_ambassador() {
        let (store, _backend) = seeded().await;
        store.load(&AmbassadorId::new("rosy")).await.unwrap();

        let profile = store.current().unwrap();
        assert_eq!(profile.name, "Rosy");
        assert_eq!(profile.id, AmbassadorId::new("rosy"));
        assert!(!store.loading());
    }

    #[tokio::test]
    async fn test_load_unknown_clears_store() {
        let (store, _backend) = seeded().await;
        store.load(&AmbassadorId::new("rosy")).await.unwrap();
        store.load(&AmbassadorId::new("ghost")).await.unwrap();
        assert!(store.current().is_none());
        assert!(store.widgets().is_empty());
    }

    #[tokio::test]
    async fn test_remote_layout_write_reaches_mirror() {
        let (store, backend) = seeded().await;
        store.load(&AmbassadorId::new("rosy")).await.unwrap();
        assert!(store.widgets().is_empty());

        backend
            .write(
                &layout_path(&AmbassadorId::new("rosy")),
                json!({"widgets": [serde_json::to_value(hero("w-1")).unwrap()]}),
                false,
            )
            .await
            .unwrap();
        assert_eq!(store.widgets().len(), 1);
    }

    #[tokio::test]
    async fn test_reload_replaces_layout_watch() {
        let (store, backend) = seeded().await;
        backend
            .write(
                &DocPath::doc("ambassadors", "lina"),
                json!({"name": "Lina", "photoUrl": "", "whatsapp": ""}),
                false,
            )
            .await
            .unwrap();

        store.load(&AmbassadorId::new("rosy")).await.unwrap();
        store.load(&AmbassadorId::new("lina")).await.unwrap();
        // Exactly one layout watch survives the re-key.
        assert_eq!(backend.active_watch_count(), 1);
    }

    #[tokio::test]
    async fn test_update_theme_without_current_is_noop() {
        let (store, backend) = seeded().await;
        store.update_theme("#112233").await.unwrap();
        let snap = backend
            .get_once(&DocPath::doc("ambassadors", "rosy"))
            .await
            .unwrap();
        assert!(snap.data.unwrap().get("themeColor").is_none());
    }

    #[tokio::test]
    async fn test_update_theme_persists_and_mirrors() {
        let (store, backend) = seeded().await;
        store.load(&AmbassadorId::new("rosy")).await.unwrap();
        store.update_theme("#112233").await.unwrap();

        assert_eq!(
            store.current().unwrap().theme_color.as_deref(),
            Some("#112233")
        );
        let snap = backend
            .get_once(&DocPath::doc("ambassadors", "rosy"))
            .await
            .unwrap();
        assert_eq!(snap.data.unwrap().get("themeColor"), Some(&json!("#112233")));
    }

    #[tokio::test]
    async fn test_local_widget_mutations() {
        let (store, _backend) = seeded().await;
        store.load(&AmbassadorId::new("rosy")).await.unwrap();

        store.push_widget(hero("w-1"));
        store.push_widget(hero("w-2"));
        assert_eq!(store.widgets().len(), 2);

        assert!(store.remove_widget(&WidgetId::new("w-1")));
        assert!(!store.remove_widget(&WidgetId::new("w-1")));
        assert_eq!(store.widgets().len(), 1);
    }
}
