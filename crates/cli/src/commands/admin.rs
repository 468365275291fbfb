//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! rosella-cli admin create -e admin@example.com -n "Admin Name"
//! ```
//!
//! The auth service itself owns credentials; this command only records the
//! admin's directory entry in the `admin_users` collection.

use serde_json::json;
use tracing::info;

use rosella_app::store::{DocPath, DocumentStore};

use super::CliError;

/// Create a new admin user directory entry.
///
/// # Errors
///
/// Returns an error when the email is malformed or the data file cannot be
/// written.
pub async fn create_user(email: &str, name: &str, file: Option<&str>) -> Result<(), CliError> {
    // Basic email validation
    if !email.contains('@') || !email.contains('.') {
        return Err(CliError::InvalidEmail(email.to_owned()));
    }

    let store = super::open_data_file(file)?;

    let id = uuid::Uuid::new_v4().to_string();
    store
        .write(
            &DocPath::doc("admin_users", &id),
            json!({ "email": email, "name": name }),
            false,
        )
        .await?;

    info!("Admin user created: {email} ({id})");
    Ok(())
}
