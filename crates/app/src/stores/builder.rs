//! Page builder: widget palette, selection, edit mode, and explicit layout
//! saves.
//!
//! The builder never owns the layout; it issues mutations through
//! [`AmbassadorStore`] so there is a single owner for the widget list, and
//! persists the whole layout in one overwrite on save.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::json;

use rosella_core::{GridPlacement, WidgetConfig, WidgetId, WidgetProps, WidgetType};

use crate::logger::SecureLogger;
use crate::store::DocumentStore;
use crate::stores::AmbassadorStore;
use crate::sync::Mirror;

/// One palette entry: a placeable widget type with its display metadata.
#[derive(Debug, Clone, Copy)]
pub struct WidgetDef {
    pub widget_type: WidgetType,
    pub label: &'static str,
    pub icon: &'static str,
}

/// The fixed widget palette, in display order.
#[must_use]
pub const fn widget_catalog() -> &'static [WidgetDef] {
    &[
        WidgetDef {
            widget_type: WidgetType::Hero,
            label: "Hero Banner",
            icon: "image",
        },
        WidgetDef {
            widget_type: WidgetType::ProductGrid,
            label: "Product Grid",
            icon: "grid_view",
        },
        WidgetDef {
            widget_type: WidgetType::Testimonials,
            label: "Testimonials",
            icon: "format_quote",
        },
        WidgetDef {
            widget_type: WidgetType::Contact,
            label: "Contact Form",
            icon: "mail",
        },
        WidgetDef {
            widget_type: WidgetType::Video,
            label: "Video Embed",
            icon: "play_circle",
        },
        WidgetDef {
            widget_type: WidgetType::Text,
            label: "Rich Text",
            icon: "text_fields",
        },
    ]
}

/// Starter properties for a freshly placed widget.
#[must_use]
pub fn default_props(widget_type: WidgetType) -> WidgetProps {
    match widget_type {
        WidgetType::Hero => WidgetProps::Hero {
            title: "Welcome".to_owned(),
            subtitle: "Discover Beauty".to_owned(),
        },
        WidgetType::ProductGrid => WidgetProps::ProductGrid {
            title: "Our Products".to_owned(),
            limit: 4,
        },
        WidgetType::Testimonials => WidgetProps::Testimonials {},
        WidgetType::Contact => WidgetProps::Contact {},
        WidgetType::Video => WidgetProps::Video { url: String::new() },
        WidgetType::Text => WidgetProps::Text {
            content: "Add your text here".to_owned(),
        },
    }
}

struct BuilderInner {
    ambassador: AmbassadorStore,
    backend: Arc<dyn DocumentStore>,
    selected: Mirror<Option<WidgetId>>,
    editing: AtomicBool,
    saving: AtomicBool,
    log: SecureLogger,
}

/// Edit-mode state for the ambassador page builder.
#[derive(Clone)]
pub struct BuilderStore {
    inner: Arc<BuilderInner>,
}

impl BuilderStore {
    #[must_use]
    pub fn new(ambassador: AmbassadorStore, backend: Arc<dyn DocumentStore>) -> Self {
        Self {
            inner: Arc::new(BuilderInner {
                ambassador,
                backend,
                selected: Mirror::new(None),
                editing: AtomicBool::new(false),
                saving: AtomicBool::new(false),
                log: SecureLogger::new(),
            }),
        }
    }

    /// Place a new widget of the given type with its starter properties and
    /// default grid placement, and select it.
    pub fn add_widget(&self, widget_type: WidgetType) -> WidgetId {
        let widget = WidgetConfig {
            id: WidgetId::generate(),
            props: default_props(widget_type),
            grid: GridPlacement::default(),
        };
        let id = widget.id.clone();
        self.inner.ambassador.push_widget(widget);
        self.inner.selected.set(Some(id.clone()));
        self.inner.log.info_with("Widget added", &widget_type.to_string());
        id
    }

    /// Remove a widget from the layout; an unknown id is a no-op. A removed
    /// widget loses its selection.
    pub fn remove_widget(&self, id: &WidgetId) {
        if !self.inner.ambassador.remove_widget(id) {
            return;
        }
        self.inner.selected.update(|selected| {
            if selected.as_ref() == Some(id) {
                *selected = None;
            }
        });
        self.inner.log.info("Widget removed");
    }

    pub fn select_widget(&self, id: Option<WidgetId>) {
        self.inner.selected.set(id);
    }

    #[must_use]
    pub fn selected_widget(&self) -> Option<WidgetId> {
        self.inner.selected.get()
    }

    pub fn set_editing(&self, editing: bool) {
        self.inner.editing.store(editing, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.inner.editing.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn is_saving(&self) -> bool {
        self.inner.saving.load(Ordering::SeqCst)
    }

    /// Persist the whole current layout as one overwrite. No-op when no
    /// ambassador is loaded; failures are logged, never surfaced, so a save
    /// cannot crash edit mode.
    pub async fn save_layout(&self) {
        let Some(path) = self.inner.ambassador.current_layout_path() else {
            return;
        };
        let widgets = self.inner.ambassador.widgets();

        self.inner.saving.store(true, Ordering::SeqCst);
        let data = match serde_json::to_value(&widgets) {
            Ok(widgets) => json!({ "widgets": widgets }),
            Err(err) => {
                self.inner.log.error(&format!("Failed to encode layout: {err}"));
                self.inner.saving.store(false, Ordering::SeqCst);
                return;
            }
        };

        match self.inner.backend.write(&path, data, false).await {
            Ok(()) => self.inner.log.info("Layout saved successfully"),
            Err(err) => self.inner.log.error(&format!("Failed to save layout: {err}")),
        }
        self.inner.saving.store(false, Ordering::SeqCst);
    }
}
