//! Shared application state: one handle owning every store plus the
//! collaborator seams they run against.

use std::sync::Arc;

use rosella_core::PublicProfile;

use crate::auth::AuthProvider;
use crate::config::AppConfig;
use crate::store::DocumentStore;
use crate::stores::{AmbassadorStore, BuilderStore, ProductsStore, SessionStore, SettingsStore};

struct AppStateInner {
    config: AppConfig,
    backend: Arc<dyn DocumentStore>,
    auth: Arc<dyn AuthProvider>,
    session: SessionStore,
    products: ProductsStore,
    settings: SettingsStore,
    ambassador: AmbassadorStore,
    builder: BuilderStore,
}

/// Shared application state, cheap to clone.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

impl AppState {
    /// Wire every store against the given collaborators. The mail-relay
    /// identifiers from configuration become part of the profile defaults.
    #[must_use]
    pub fn new(
        config: AppConfig,
        backend: Arc<dyn DocumentStore>,
        auth: Arc<dyn AuthProvider>,
    ) -> Self {
        let defaults = PublicProfile {
            email_js_config: Some(config.mail_relay.clone()),
            ..PublicProfile::default()
        };

        let session = SessionStore::new(Arc::clone(&auth));
        let products = ProductsStore::new(Arc::clone(&backend));
        let settings = SettingsStore::new(Arc::clone(&backend), defaults);
        let ambassador = AmbassadorStore::new(Arc::clone(&backend));
        let builder = BuilderStore::new(ambassador.clone(), Arc::clone(&backend));

        Self {
            inner: Arc::new(AppStateInner {
                config,
                backend,
                auth,
                session,
                products,
                settings,
                ambassador,
                builder,
            }),
        }
    }

    /// Start the session mirror. Idempotent.
    pub fn init(&self) {
        self.inner.session.init();
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn backend(&self) -> &Arc<dyn DocumentStore> {
        &self.inner.backend
    }

    #[must_use]
    pub fn auth(&self) -> &Arc<dyn AuthProvider> {
        &self.inner.auth
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    #[must_use]
    pub fn products(&self) -> &ProductsStore {
        &self.inner.products
    }

    #[must_use]
    pub fn settings(&self) -> &SettingsStore {
        &self.inner.settings
    }

    #[must_use]
    pub fn ambassador(&self) -> &AmbassadorStore {
        &self.inner.ambassador
    }

    #[must_use]
    pub fn builder(&self) -> &BuilderStore {
        &self.inner.builder
    }
}
