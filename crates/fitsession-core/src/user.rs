//! User and session records returned by the identity provider.
//!
//! A `User` is owned by the provider and mirrored into the local store as
//! JSON. Tokens are never logged or displayed in full.

use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub(crate) fn now_millis_u64() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|d| u64::try_from(d.as_millis()).ok())
        .unwrap_or(u64::MAX)
}

/// Account timestamps reported by the provider (epoch milliseconds).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<u64>,
}

impl UserMetadata {
    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.created_at.and_then(millis_to_utc)
    }

    pub fn last_login(&self) -> Option<DateTime<Utc>> {
        self.last_login_at.and_then(millis_to_utc)
    }
}

fn millis_to_utc(millis: u64) -> Option<DateTime<Utc>> {
    i64::try_from(millis).ok().and_then(DateTime::from_timestamp_millis)
}

/// Identity record for an authenticated account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Provider-assigned account identifier
    pub uid: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    /// Long-lived token used to mint new ID tokens
    pub refresh_token: String,
    #[serde(default)]
    pub metadata: UserMetadata,
}

impl User {
    /// Best name to show for this account.
    pub fn display_label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.email)
    }
}

/// Credential bundle produced by a successful authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Short-lived bearer token
    pub id_token: String,
    pub refresh_token: String,
    /// Expiry timestamp in milliseconds since epoch
    pub expires_at: u64,
    /// Sign-in method (always "password" for email sign-in)
    pub provider_id: String,
    pub operation_type: String,
    pub user: User,
}

impl Session {
    /// Builds a password session that expires `expires_in_secs` from now.
    pub fn password(id_token: String, expires_in_secs: u64, user: User) -> Self {
        let expires_at = now_millis_u64().saturating_add(expires_in_secs.saturating_mul(1000));
        Self {
            id_token,
            refresh_token: user.refresh_token.clone(),
            expires_at,
            provider_id: "password".to_string(),
            operation_type: "signIn".to_string(),
            user,
        }
    }

    /// Returns true if the ID token is expired.
    pub fn is_expired(&self) -> bool {
        now_millis_u64() >= self.expires_at
    }
}

/// Returns a masked version of a token for display (first 8 chars + ...).
pub fn mask_token(token: &str) -> String {
    if token.len() <= 16 {
        return "***".to_string();
    }
    let prefix: String = token.chars().take(8).collect();
    format!("{prefix}...")
}
