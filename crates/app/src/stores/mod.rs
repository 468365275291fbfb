//! Entity stores: each one mirrors a slice of remote state, applies
//! optimistic mutations, and reconciles on every snapshot push.
//!
//! All stores follow the same shape: an `Arc`-shared inner with
//! [`crate::sync::Mirror`]s for the mirrored state and
//! [`crate::sync::WatchSlot`]s for subscription lifecycle. Watch callbacks
//! capture a `Weak` reference to the inner, so an open subscription never
//! keeps a dropped store alive.

mod ambassador;
mod builder;
mod interactions;
mod products;
mod session;
mod settings;

pub use ambassador::AmbassadorStore;
pub use builder::{BuilderStore, WidgetDef, default_props, widget_catalog};
pub use interactions::{InteractionsStore, KeyValueStorage, MemoryStorage};
pub use products::{ProductPatch, ProductsStore};
pub use session::SessionStore;
pub use settings::{ArticlePatch, ProfilePatch, SettingsError, SettingsStore, default_article};
