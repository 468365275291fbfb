//! Core domain types.
//!
//! All document shapes serialize with the field names the remote store uses
//! (`camelCase`), so a mirrored document round-trips byte-compatibly.

mod ambassador;
mod article;
mod id;
mod price;
mod product;
mod profile;
mod widget;

pub use ambassador::{AmbassadorProfile, Socials};
pub use article::Article;
pub use id::{AmbassadorId, ArticleId, ProductId, QrCodeId, UserId, WidgetId};
pub use price::Price;
pub use product::{DEFAULT_SORT_ORDER, Product, next_rating};
pub use profile::{MailRelayConfig, PublicProfile, QrCode};
pub use widget::{GridPlacement, WidgetConfig, WidgetProps, WidgetType};
