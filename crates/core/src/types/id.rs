//! Newtype IDs for type-safe entity references.
//!
//! Use the `define_id!` macro to create type-safe ID wrappers that prevent
//! accidentally mixing IDs from different entity types. IDs are backed by
//! strings because the remote document store assigns opaque document ids.

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `Default`, `PartialEq`, `Eq`, `Hash`
/// - Conversion methods: `new()`, `generate()`, `as_str()`
/// - `From<String>`, `From<&str>`, and `Into<String>` implementations
///
/// # Example
///
/// ```rust
/// # use rosella_core::define_id;
/// define_id!(OrderId);
/// define_id!(CustomerId);
///
/// let order_id = OrderId::new("abc123");
/// let customer_id = CustomerId::new("abc123");
///
/// // These are different types, so this won't compile:
/// // let _: OrderId = customer_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            Default,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new ID from a string value.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a fresh random ID (UUID v4).
            #[must_use]
            pub fn generate() -> Self {
                Self(::uuid::Uuid::new_v4().to_string())
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Whether the ID carries a value (deserialized documents start
            /// with an empty id until the document id is injected).
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Define standard entity IDs
define_id!(UserId);
define_id!(AmbassadorId);
define_id!(ProductId);
define_id!(ArticleId);
define_id!(WidgetId);
define_id!(QrCodeId);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_id_roundtrip() {
        let id = ProductId::new("p-42");
        assert_eq!(id.as_str(), "p-42");
        assert_eq!(id.to_string(), "p-42");
        assert_eq!(String::from(id), "p-42");
    }

    #[test]
    fn test_id_serde_transparent() {
        let id = ArticleId::new("a-1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"a-1\"");
        let back: ArticleId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_generate_is_unique() {
        let a = WidgetId::generate();
        let b = WidgetId::generate();
        assert_ne!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn test_default_is_empty() {
        assert!(UserId::default().is_empty());
    }
}
