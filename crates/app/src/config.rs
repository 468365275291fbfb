//! Application configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ROSELLA_API_KEY` - Backend service API key
//! - `ROSELLA_AUTH_DOMAIN` - Backend auth domain
//! - `ROSELLA_PROJECT_ID` - Backend project identifier
//! - `ROSELLA_STORAGE_BUCKET` - Backend storage bucket
//! - `ROSELLA_SENDER_ID` - Backend messaging sender id
//! - `ROSELLA_APP_ID` - Backend application id
//!
//! ## Optional
//! - `EMAILJS_SERVICE_ID` - Mail relay service id (default: empty)
//! - `EMAILJS_TEMPLATE_ID` - Mail relay template id (default: empty)
//! - `EMAILJS_PUBLIC_KEY` - Mail relay public key (default: empty)
//! - `ROSELLA_DATA_FILE` - Path for the file-backed reference store
//!
//! All backend values are opaque service identifiers supplied at deploy
//! time; they are carried, not parsed or validated.

use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;

use rosella_core::MailRelayConfig;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
}

/// Backend (document database + auth service) identifiers.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct BackendConfig {
    pub api_key: SecretString,
    pub auth_domain: String,
    pub project_id: String,
    pub storage_bucket: String,
    pub sender_id: String,
    pub app_id: String,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("api_key", &"[REDACTED]")
            .field("auth_domain", &self.auth_domain)
            .field("project_id", &self.project_id)
            .field("storage_bucket", &self.storage_bucket)
            .field("sender_id", &self.sender_id)
            .field("app_id", &self.app_id)
            .finish()
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub backend: BackendConfig,
    /// Mail relay identifiers seeded into the default public profile.
    pub mail_relay: MailRelayConfig,
    /// Data file for the file-backed reference store, when set.
    pub data_file: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let backend = BackendConfig {
            api_key: SecretString::from(get_required_env("ROSELLA_API_KEY")?),
            auth_domain: get_required_env("ROSELLA_AUTH_DOMAIN")?,
            project_id: get_required_env("ROSELLA_PROJECT_ID")?,
            storage_bucket: get_required_env("ROSELLA_STORAGE_BUCKET")?,
            sender_id: get_required_env("ROSELLA_SENDER_ID")?,
            app_id: get_required_env("ROSELLA_APP_ID")?,
        };

        let mail_relay = MailRelayConfig {
            service_id: get_env_or_default("EMAILJS_SERVICE_ID", ""),
            template_id: get_env_or_default("EMAILJS_TEMPLATE_ID", ""),
            public_key: get_env_or_default("EMAILJS_PUBLIC_KEY", ""),
        };

        let data_file = get_optional_env("ROSELLA_DATA_FILE").map(PathBuf::from);

        Ok(Self {
            backend,
            mail_relay,
            data_file,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_config_debug_redacts_api_key() {
        let config = BackendConfig {
            api_key: SecretString::from("super_secret_api_key"),
            auth_domain: "rosella.example.org".to_string(),
            project_id: "rosella-prod".to_string(),
            storage_bucket: "rosella-prod.bucket".to_string(),
            sender_id: "1234567".to_string(),
            app_id: "1:1234567:web:abcdef".to_string(),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("[REDACTED]"));
        assert!(debug_output.contains("rosella-prod"));
        assert!(!debug_output.contains("super_secret_api_key"));
    }

    #[test]
    fn test_missing_env_var_error_display() {
        let err = ConfigError::MissingEnvVar("ROSELLA_API_KEY".to_string());
        assert_eq!(
            err.to_string(),
            "Missing environment variable: ROSELLA_API_KEY"
        );
    }
}
