//! Integration test harness for Rosella.
//!
//! Wires a full [`AppState`] against the in-process backends, so tests
//! exercise the same store wiring the application uses: live watches,
//! optimistic mutations, and snapshot reconciliation, without any external
//! services.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p rosella-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::Cursor;

use secrecy::SecretString;

use rosella_app::AppState;
use rosella_app::auth::MemoryAuth;
use rosella_app::config::{AppConfig, BackendConfig};
use rosella_app::store::MemoryStore;
use rosella_core::{
    GridPlacement, MailRelayConfig, Price, Product, ProductId, WidgetConfig, WidgetId, WidgetProps,
};

pub const ADMIN_EMAIL: &str = "admin@example.org";
pub const ADMIN_PASSWORD: &str = "correct-horse-battery";

/// A fully wired application with direct handles on its collaborators, so
/// tests can inject remote writes and external auth transitions.
pub struct TestContext {
    pub backend: MemoryStore,
    pub auth: MemoryAuth,
    pub state: AppState,
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TestContext {
    /// Fresh application with one registered admin login.
    #[must_use]
    pub fn new() -> Self {
        let backend = MemoryStore::new();
        let auth = MemoryAuth::new();
        auth.register(ADMIN_EMAIL, ADMIN_PASSWORD);

        let state = AppState::new(
            test_config(),
            std::sync::Arc::new(backend.clone()),
            std::sync::Arc::new(auth.clone()),
        );
        state.init();

        Self {
            backend,
            auth,
            state,
        }
    }

    /// A second application handle sharing the same backend and auth, to
    /// stand in for another connected client.
    #[must_use]
    pub fn second_client(&self) -> AppState {
        let state = AppState::new(
            test_config(),
            std::sync::Arc::new(self.backend.clone()),
            std::sync::Arc::new(self.auth.clone()),
        );
        state.init();
        state
    }
}

fn test_config() -> AppConfig {
    AppConfig {
        backend: BackendConfig {
            api_key: SecretString::from("test-api-key"),
            auth_domain: "test.example.org".to_owned(),
            project_id: "rosella-test".to_owned(),
            storage_bucket: "rosella-test.bucket".to_owned(),
            sender_id: "0".to_owned(),
            app_id: "test".to_owned(),
        },
        mail_relay: MailRelayConfig::default(),
        data_file: None,
    }
}

/// A catalog product fixture; `order: None` exercises the default ordering.
#[must_use]
pub fn sample_product(name: &str, order: Option<u32>) -> Product {
    Product {
        id: ProductId::default(),
        name: name.to_owned(),
        price: Price::from_cents(1999),
        category: "skincare".to_owned(),
        images: vec![],
        stock: 10,
        description: None,
        original_price: None,
        external_url: None,
        order,
        rating_average: None,
        rating_count: None,
    }
}

/// A hero widget fixture with the given id.
#[must_use]
pub fn hero_widget(id: &str) -> WidgetConfig {
    WidgetConfig {
        id: WidgetId::new(id),
        props: WidgetProps::Hero {
            title: "Welcome".to_owned(),
            subtitle: "Discover Beauty".to_owned(),
        },
        grid: GridPlacement::default(),
    }
}

/// An in-memory PNG fixture for upload tests.
///
/// # Panics
///
/// Panics when the in-memory encode fails, which only happens on an
/// incompatible `image` crate build.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn png_fixture(width: u32, height: u32) -> Vec<u8> {
    use image::{DynamicImage, Rgba, RgbaImage};
    let img = RgbaImage::from_pixel(width, height, Rgba([30, 30, 30, 255]));
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    out.into_inner()
}
