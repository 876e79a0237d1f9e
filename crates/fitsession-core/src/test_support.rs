//! Shared fixtures for unit tests.

use crate::user::{User, UserMetadata};

pub(crate) fn sample_user(refresh: &str) -> User {
    User {
        uid: "uid-123".to_string(),
        email: "ana@example.com".to_string(),
        display_name: None,
        email_verified: false,
        refresh_token: refresh.to_string(),
        metadata: UserMetadata::default(),
    }
}
