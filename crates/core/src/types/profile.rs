//! The public profile singleton: bio, theme, social handles, QR codes, and
//! the mail-relay configuration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::QrCodeId;

/// One stored QR code, embedded in the public profile document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrCode {
    pub id: QrCodeId,
    pub name: String,
    /// Image as an embedded data URL, not a blob-store reference.
    pub url: String,
    pub created_at: DateTime<Utc>,
}

/// Third-party mail relay identifiers (opaque, supplied by configuration).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailRelayConfig {
    pub service_id: String,
    pub template_id: String,
    pub public_key: String,
}

/// The site-wide public profile singleton document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    pub name: String,
    pub bio: String,
    pub avatar_url: String,
    pub primary_color: String,
    pub secondary_color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whatsapp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tiktok: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_js_config: Option<MailRelayConfig>,
    #[serde(default)]
    pub qr_codes: Vec<QrCode>,
}

impl Default for PublicProfile {
    fn default() -> Self {
        Self {
            name: "Maria Chifeac".to_owned(),
            bio: "Welcome to my beauty shop!".to_owned(),
            avatar_url: String::new(),
            primary_color: "#341414".to_owned(),
            secondary_color: "#855457".to_owned(),
            whatsapp: Some(String::new()),
            instagram: Some(String::new()),
            tiktok: None,
            email: Some(String::new()),
            email_js_config: Some(MailRelayConfig::default()),
            qr_codes: Vec::new(),
        }
    }
}
