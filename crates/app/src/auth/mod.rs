//! Auth provider collaborator seam.
//!
//! The real provider is an external authentication service; the engine only
//! depends on this contract. State listeners fire once immediately with the
//! current identity, then again on every sign-in/sign-out transition.
//! [`MemoryAuth`] is the in-process reference backend.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use thiserror::Error;

use rosella_core::UserId;

use crate::sync::Watch;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email/password pair rejected.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Provider-side fault.
    #[error("auth backend fault: {0}")]
    Backend(String),
}

/// The authenticated identity, as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub uid: UserId,
    pub email: String,
}

/// Callback for auth state transitions. `None` means signed out.
pub type AuthStateCallback = Box<dyn Fn(Option<Identity>) + Send + Sync>;

/// The authentication provider contract.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Sign in with email and password.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    /// Sign out the current identity.
    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Observe auth state. Fires once immediately with the current state.
    fn on_state_change(&self, callback: AuthStateCallback) -> Watch;
}

struct Listener {
    id: u64,
    callback: AuthStateCallback,
    active: AtomicBool,
}

struct MemoryAuthInner {
    users: RwLock<HashMap<String, (String, UserId)>>,
    current: RwLock<Option<Identity>>,
    listeners: Mutex<Vec<Arc<Listener>>>,
    next_listener_id: AtomicU64,
}

/// In-process auth backend with a fixed set of registered logins.
#[derive(Clone)]
pub struct MemoryAuth {
    inner: Arc<MemoryAuthInner>,
}

impl Default for MemoryAuth {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAuth {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MemoryAuthInner {
                users: RwLock::new(HashMap::new()),
                current: RwLock::new(None),
                listeners: Mutex::new(Vec::new()),
                next_listener_id: AtomicU64::new(1),
            }),
        }
    }

    /// Register a login the backend will accept.
    pub fn register(&self, email: &str, password: &str) -> UserId {
        let uid = UserId::generate();
        self.inner
            .users
            .write()
            .insert(email.to_owned(), (password.to_owned(), uid.clone()));
        uid
    }

    fn set_current(&self, identity: Option<Identity>) {
        *self.inner.current.write() = identity.clone();
        let listeners: Vec<_> = self.inner.listeners.lock().iter().map(Arc::clone).collect();
        for listener in listeners {
            if listener.active.load(Ordering::SeqCst) {
                (listener.callback)(identity.clone());
            }
        }
    }
}

#[async_trait]
impl AuthProvider for MemoryAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let identity = {
            let users = self.inner.users.read();
            match users.get(email) {
                Some((stored, uid)) if stored == password => Identity {
                    uid: uid.clone(),
                    email: email.to_owned(),
                },
                _ => return Err(AuthError::InvalidCredentials),
            }
        };
        self.set_current(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.set_current(None);
        Ok(())
    }

    fn on_state_change(&self, callback: AuthStateCallback) -> Watch {
        let listener = Arc::new(Listener {
            id: self.inner.next_listener_id.fetch_add(1, Ordering::SeqCst),
            callback,
            active: AtomicBool::new(true),
        });
        self.inner.listeners.lock().push(Arc::clone(&listener));

        let inner = Arc::clone(&self.inner);
        let id = listener.id;
        let watch = Watch::new(move || {
            let mut listeners = inner.listeners.lock();
            if let Some(pos) = listeners.iter().position(|l| l.id == id) {
                let removed = listeners.swap_remove(pos);
                removed.active.store(false, Ordering::SeqCst);
            }
        });

        // Immediate delivery of the current state.
        (listener.callback)(self.inner.current.read().clone());
        watch
    }
}
