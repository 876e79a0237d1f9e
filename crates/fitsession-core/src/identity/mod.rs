//! Identity provider seam.
//!
//! The session manager only talks to an `IdentityProvider`; the Firebase
//! REST client is the production implementation and tests substitute their
//! own doubles.

mod errors;
pub mod firebase;
mod shared;

use std::fmt;

use async_trait::async_trait;
pub use errors::{IdentityError, IdentityErrorKind};
pub use firebase::{FirebaseAuthClient, FirebaseConfig};

use crate::user::Session;

/// Federated identity sources offered by the app.
///
/// The provider contract has no federated operations yet; sign-in through
/// these always reports as unsupported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FederatedProvider {
    Google,
}

impl fmt::Display for FederatedProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FederatedProvider::Google => write!(f, "google"),
        }
    }
}

/// Operations the identity backend must support.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verifies email/password and returns the new session (which carries the user).
    async fn authenticate(&self, email: &str, password: &str) -> Result<Session, IdentityError>;

    /// Creates an account. Does not sign the new user in.
    async fn register(&self, email: &str, password: &str) -> Result<(), IdentityError>;

    /// Sends a password reset email.
    async fn send_password_reset(&self, email: &str) -> Result<(), IdentityError>;

    async fn sign_out(&self) -> Result<(), IdentityError>;
}

#[async_trait]
impl<T: IdentityProvider + ?Sized> IdentityProvider for std::sync::Arc<T> {
    async fn authenticate(&self, email: &str, password: &str) -> Result<Session, IdentityError> {
        (**self).authenticate(email, password).await
    }

    async fn register(&self, email: &str, password: &str) -> Result<(), IdentityError> {
        (**self).register(email, password).await
    }

    async fn send_password_reset(&self, email: &str) -> Result<(), IdentityError> {
        (**self).send_password_reset(email).await
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        (**self).sign_out().await
    }
}
