//! Admin session state, mirrored from the auth provider.

use std::sync::{Arc, Weak};

use crate::auth::{AuthError, AuthProvider, Identity};
use crate::logger::SecureLogger;
use crate::sync::{Mirror, WatchSlot};

struct SessionInner {
    auth: Arc<dyn AuthProvider>,
    user: Mirror<Option<Identity>>,
    state_watch: WatchSlot,
    log: SecureLogger,
}

/// Mirrors the current signed-in identity and exposes login/logout.
///
/// Any signed-in identity counts as an administrator; there is no separate
/// role store.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionInner>,
}

impl SessionStore {
    #[must_use]
    pub fn new(auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                auth,
                user: Mirror::new(None),
                state_watch: WatchSlot::new(),
                log: SecureLogger::new(),
            }),
        }
    }

    /// Start mirroring auth state. Idempotent; the provider fires the
    /// listener once immediately with the current identity.
    pub fn init(&self) {
        let inner = &self.inner;
        inner.state_watch.open_with(|| {
            let weak: Weak<SessionInner> = Arc::downgrade(inner);
            inner.auth.on_state_change(Box::new(move |identity| {
                if let Some(inner) = weak.upgrade() {
                    inner.user.set(identity);
                    inner.user.set_loading(false);
                }
            }))
        });
    }

    /// Stop mirroring auth state. Idempotent.
    pub fn shutdown(&self) {
        self.inner.state_watch.close();
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns the provider's error after logging it; bad credentials come
    /// back as [`AuthError::InvalidCredentials`].
    pub async fn login(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let _guard = self.inner.user.loading_guard();
        match self.inner.auth.sign_in(email, password).await {
            Ok(identity) => {
                self.inner.user.set(Some(identity.clone()));
                self.inner.log.info("Admin signed in");
                Ok(identity)
            }
            Err(err) => {
                self.inner.log.error(&format!("Login failed: {err}"));
                Err(err)
            }
        }
    }

    /// Sign out. Provider failures are logged and swallowed; the local
    /// session is cleared either way.
    pub async fn logout(&self) {
        if let Err(err) = self.inner.auth.sign_out().await {
            self.inner.log.error(&format!("Logout failed: {err}"));
        }
        self.inner.user.set(None);
    }

    #[must_use]
    pub fn user(&self) -> Option<Identity> {
        self.inner.user.get()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.user.read(Option::is_some)
    }

    /// Whether the current session may use the back office. Currently the
    /// same as being signed in.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.is_authenticated()
    }

    #[must_use]
    pub fn loading(&self) -> bool {
        self.inner.user.loading()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::auth::MemoryAuth;

    fn session_with_user() -> (SessionStore, MemoryAuth) {
        let auth = MemoryAuth::new();
        auth.register("admin@example.org", "correct-horse-battery");
        let session = SessionStore::new(Arc::new(auth.clone()));
        session.init();
        (session, auth)
    }

    #[tokio::test]
    async fn test_login_logout_roundtrip() {
        let (session, _auth) = session_with_user();
        assert!(!session.is_authenticated());

        let identity = session
            .login("admin@example.org", "correct-horse-battery")
            .await
            .unwrap();
        assert_eq!(identity.email, "admin@example.org");
        assert!(session.is_admin());

        session.logout().await;
        assert!(!session.is_authenticated());
        assert!(session.user().is_none());
    }

    #[tokio::test]
    async fn test_failed_login_leaves_session_signed_out() {
        let (session, _auth) = session_with_user();
        let err = session.login("admin@example.org", "wrong").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        assert!(!session.is_authenticated());
        assert!(!session.loading());
    }

    #[tokio::test]
    async fn test_external_sign_out_clears_mirror() {
        let (session, auth) = session_with_user();
        session
            .login("admin@example.org", "correct-horse-battery")
            .await
            .unwrap();

        // Sign-out from another tab arrives through the state listener.
        auth.sign_out().await.unwrap();
        assert!(!session.is_authenticated());
    }

    #[tokio::test]
    async fn test_init_is_idempotent() {
        let (session, _auth) = session_with_user();
        session.init();
        session.init();
        session
            .login("admin@example.org", "correct-horse-battery")
            .await
            .unwrap();
        assert!(session.is_authenticated());
    }
}
