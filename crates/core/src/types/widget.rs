//! Widget configuration for the ambassador page builder.
//!
//! Widget properties are a tagged union keyed by widget type, so each type
//! carries its own schema instead of an open-ended key-value bag. The serde
//! shape matches the stored documents: a `type` discriminator next to a
//! `props` object.

use serde::{Deserialize, Serialize};

use super::id::WidgetId;

/// The fixed set of widget types the builder can place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WidgetType {
    Hero,
    ProductGrid,
    Testimonials,
    Contact,
    Video,
    Text,
}

impl core::fmt::Display for WidgetType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Hero => "hero",
            Self::ProductGrid => "product-grid",
            Self::Testimonials => "testimonials",
            Self::Contact => "contact",
            Self::Video => "video",
            Self::Text => "text",
        };
        write!(f, "{name}")
    }
}

/// Per-type widget properties.
///
/// Serializes as `{"type": "...", "props": {...}}` alongside the other
/// [`WidgetConfig`] fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "props", rename_all = "kebab-case")]
pub enum WidgetProps {
    Hero { title: String, subtitle: String },
    ProductGrid { title: String, limit: u32 },
    Testimonials {},
    Contact {},
    Video { url: String },
    Text { content: String },
}

impl WidgetProps {
    /// The widget type this property set belongs to.
    #[must_use]
    pub const fn widget_type(&self) -> WidgetType {
        match self {
            Self::Hero { .. } => WidgetType::Hero,
            Self::ProductGrid { .. } => WidgetType::ProductGrid,
            Self::Testimonials {} => WidgetType::Testimonials,
            Self::Contact {} => WidgetType::Contact,
            Self::Video { .. } => WidgetType::Video,
            Self::Text { .. } => WidgetType::Text,
        }
    }
}

/// Grid placement of a widget on the ambassador page.
///
/// All fields are non-negative grid units: starting column and row, plus the
/// column and row span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridPlacement {
    pub col: u32,
    pub row: u32,
    pub width: u32,
    pub height: u32,
}

impl Default for GridPlacement {
    /// Default placement: full width, appended to the bottom of the page.
    fn default() -> Self {
        Self {
            col: 1,
            row: 99,
            width: 12,
            height: 4,
        }
    }
}

/// One widget instance inside an ambassador's layout.
///
/// The id must be unique within the layout; the builder generates UUIDs so
/// two widgets added in the same session never collide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetConfig {
    pub id: WidgetId,
    #[serde(flatten)]
    pub props: WidgetProps,
    pub grid: GridPlacement,
}

impl WidgetConfig {
    /// The widget's type, derived from its property set.
    #[must_use]
    pub const fn widget_type(&self) -> WidgetType {
        self.props.widget_type()
    }
}
