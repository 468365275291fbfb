//! Ambassador profiles: one per ambassador page.

use serde::{Deserialize, Serialize};

use super::id::AmbassadorId;

/// Social media handles for an ambassador.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Socials {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tiktok: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
}

/// One ambassador's profile document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmbassadorProfile {
    #[serde(default, skip_serializing)]
    pub id: AmbassadorId,
    pub name: String,
    pub photo_url: String,
    pub whatsapp: String,
    #[serde(default)]
    pub socials: Socials,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_color: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sparse_document() {
        let profile: AmbassadorProfile = serde_json::from_value(json!({
            "name": "Rosy",
            "photoUrl": "",
            "whatsapp": "+39000000000",
        }))
        .unwrap();
        assert!(profile.id.is_empty());
        assert!(profile.theme_color.is_none());
        assert!(profile.socials.instagram.is_none());
    }
}
