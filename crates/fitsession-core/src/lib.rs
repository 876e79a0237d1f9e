//! Session management for the Fit app (identity provider, local store, config).

pub mod config;
pub mod identity;
pub mod logging;
pub mod notify;
pub mod session;
pub mod store;
pub mod user;
pub mod validation;

#[cfg(test)]
mod test_support;

pub use identity::{FederatedProvider, IdentityError, IdentityErrorKind, IdentityProvider};
pub use notify::{Notice, NoticeLevel, Notifier};
pub use session::{AuthOutcome, SessionCheck, SessionManager, SessionState};
pub use store::{FileSessionStore, MemorySessionStore, SessionStore};
pub use user::{Session, User, UserMetadata};
