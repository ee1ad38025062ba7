//! Stored user profile, as written by the authentication flow.
//!
//! The gate only reads the subscription-related fields; everything else in
//! the stored document is ignored.

use serde::Deserialize;

use crate::domain::foundation::UserId;

/// The `currentUser` document.
///
/// Field names follow the camelCase session format, with snake_case
/// aliases for profiles that come straight from the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default, alias = "subscription_plan")]
    pub subscription_plan: Option<String>,

    #[serde(default, alias = "subscription_expiry")]
    pub subscription_expiry: Option<String>,

    #[serde(default, alias = "subscription_status")]
    pub subscription_status: Option<String>,
}

impl UserProfile {
    /// Parses a stored profile document.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// The profile's user id, if present and non-empty.
    pub fn user_id(&self) -> Option<UserId> {
        self.id.as_deref().and_then(|id| UserId::new(id).ok())
    }
}
