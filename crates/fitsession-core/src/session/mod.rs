//! Session manager.
//!
//! Orchestrates identity provider calls, mirrors the signed-in user into the
//! local store and publishes [`SessionState`] to observers.
//!
//! Provider failures never come back as `Err`: each operation logs them,
//! raises a notice for the cases a person can act on, records the
//! classification in `last_failure` and returns an [`AuthOutcome`]. The
//! loading flag is held by a drop guard for the whole call.

mod state;

use tokio::sync::watch;

pub use state::SessionState;
use state::{LoadingGuard, SharedState};

use crate::identity::{FederatedProvider, IdentityError, IdentityErrorKind, IdentityProvider};
use crate::notify::{Notice, Notifier};
use crate::store::SessionStore;

const MSG_WRONG_PASSWORD: &str = "Incorrect password.";
const MSG_USER_NOT_FOUND: &str = "User not found.";
const MSG_SIGN_OUT_FAILED: &str = "Could not sign out.";
const MSG_USER_CREATED: &str = "User created successfully!";
const MSG_USER_CREATE_FAILED: &str = "Could not create the user.";
const MSG_RECOVERY_SENT: &str = "Recovery email sent!";

/// What an operation did, for callers that want more than the state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOutcome {
    Succeeded,
    Failed(IdentityErrorKind),
    /// The operation exists in the contract but performs no authentication.
    Unsupported,
}

impl AuthOutcome {
    pub fn is_success(self) -> bool {
        matches!(self, AuthOutcome::Succeeded)
    }
}

/// Result of a consistency sweep between the store and the live session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCheck {
    /// Stored and live refresh tokens agree.
    Consistent,
    /// Tokens disagreed; the stored user was removed.
    Cleared,
    /// Nothing to compare (no stored user, no live session, or unreadable store).
    Skipped,
}

/// Owns the provider, store and notifier for one app instance.
pub struct SessionManager<P, S, N> {
    provider: P,
    store: S,
    notifier: N,
    state: SharedState,
}

impl<P, S, N> SessionManager<P, S, N>
where
    P: IdentityProvider,
    S: SessionStore,
    N: Notifier,
{
    /// Creates the manager and loads any remembered user from the store.
    pub fn new(provider: P, store: S, notifier: N) -> Self {
        let manager = Self {
            provider,
            store,
            notifier,
            state: state::shared(SessionState::default()),
        };
        manager.load_user();
        manager
    }

    /// Current state snapshot.
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every state change, including `loading` flips.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Signs in with email and password, remembering the user on success.
    pub async fn sign_in(&mut self, email: &str, password: &str) -> AuthOutcome {
        let _loading = LoadingGuard::begin(&self.state);

        match self.provider.authenticate(email, password).await {
            Ok(session) => {
                // Failing to remember the user must not undo the sign-in.
                if let Err(err) = self.store.persist(&session.user) {
                    tracing::error!(error = %format!("{err:#}"), "failed to persist user");
                }
                tracing::info!(uid = %session.user.uid, "signed in");
                self.state.send_modify(|s| {
                    s.user = Some(session.user.clone());
                    s.session = Some(session);
                });
                AuthOutcome::Succeeded
            }
            Err(err) => {
                match err.kind {
                    IdentityErrorKind::WrongCredentials => {
                        self.notifier.notify(Notice::error(MSG_WRONG_PASSWORD));
                    }
                    IdentityErrorKind::UserNotFound => {
                        self.notifier.notify(Notice::error(MSG_USER_NOT_FOUND));
                    }
                    _ => {}
                }
                self.fail("sign_in", &err)
            }
        }
    }

    /// Signs out, clearing the in-memory session and the stored user.
    ///
    /// If the provider refuses, nothing is cleared.
    pub async fn sign_out(&mut self) -> AuthOutcome {
        let _loading = LoadingGuard::begin(&self.state);

        if let Err(err) = self.provider.sign_out().await {
            self.notifier.notify(Notice::error(MSG_SIGN_OUT_FAILED));
            return self.fail("sign_out", &err);
        }

        self.state.send_modify(|s| {
            s.user = None;
            s.session = None;
        });

        if let Err(err) = self.store.delete() {
            tracing::error!(error = %format!("{err:#}"), "failed to delete persisted user");
            self.notifier.notify(Notice::error(MSG_SIGN_OUT_FAILED));
            self.state.send_modify(|s| s.last_failure = Some(IdentityErrorKind::Unclassified));
            return AuthOutcome::Failed(IdentityErrorKind::Unclassified);
        }

        tracing::info!("signed out");
        AuthOutcome::Succeeded
    }

    /// Creates an account. The new user is not signed in.
    pub async fn sign_up_with_email(&mut self, email: &str, password: &str) -> AuthOutcome {
        let _loading = LoadingGuard::begin(&self.state);

        match self.provider.register(email, password).await {
            Ok(()) => {
                self.notifier.notify(Notice::success(MSG_USER_CREATED));
                AuthOutcome::Succeeded
            }
            Err(err) => {
                self.notifier.notify(Notice::error(MSG_USER_CREATE_FAILED));
                self.fail("sign_up_with_email", &err)
            }
        }
    }

    /// Requests a password reset email.
    pub async fn recovery_password(&mut self, email: &str) -> AuthOutcome {
        let _loading = LoadingGuard::begin(&self.state);

        match self.provider.send_password_reset(email).await {
            Ok(()) => {
                self.notifier.notify(Notice::success(MSG_RECOVERY_SENT));
                AuthOutcome::Succeeded
            }
            Err(err) => {
                if err.kind == IdentityErrorKind::UserNotFound {
                    self.notifier.notify(Notice::error(MSG_USER_NOT_FOUND));
                }
                self.fail("recovery_password", &err)
            }
        }
    }

    /// Drops the stored user when its refresh token no longer matches the
    /// live session. Does not re-authenticate and raises no notice.
    pub fn check_user_session(&self) -> SessionCheck {
        let stored = match self.store.load() {
            Ok(stored) => stored,
            Err(err) => {
                tracing::error!(error = %format!("{err:#}"), "check_user_session: unreadable store");
                return SessionCheck::Skipped;
            }
        };

        let live_token = self
            .state
            .borrow()
            .session
            .as_ref()
            .map(|s| s.user.refresh_token.clone());

        let (Some(stored), Some(live_token)) = (stored, live_token) else {
            return SessionCheck::Skipped;
        };

        if stored.refresh_token == live_token {
            return SessionCheck::Consistent;
        }

        match self.store.delete() {
            Ok(_) => {
                tracing::warn!(uid = %stored.uid, "stored user token mismatch, removed local copy");
                SessionCheck::Cleared
            }
            Err(err) => {
                tracing::error!(error = %format!("{err:#}"), "check_user_session: failed to delete stored user");
                SessionCheck::Skipped
            }
        }
    }

    /// Federated sign-in entry point. Performs no authentication.
    pub async fn sign_in_federated(&mut self, provider: FederatedProvider) -> AuthOutcome {
        let _loading = LoadingGuard::begin(&self.state);
        tracing::info!(%provider, "federated sign-in is not available");
        AuthOutcome::Unsupported
    }

    /// Federated sign-up entry point. Performs no registration.
    pub async fn sign_up_federated(&mut self, provider: FederatedProvider) -> AuthOutcome {
        let _loading = LoadingGuard::begin(&self.state);
        tracing::info!(%provider, "federated sign-up is not available");
        AuthOutcome::Unsupported
    }

    fn load_user(&self) {
        match self.store.load() {
            Ok(Some(user)) => {
                tracing::debug!(uid = %user.uid, "restored user from store");
                self.state.send_modify(|s| s.user = Some(user));
            }
            Ok(None) => {}
            Err(err) => {
                tracing::error!(error = %format!("{err:#}"), "load_user: ignoring unreadable store");
            }
        }
    }

    fn fail(&self, operation: &'static str, err: &IdentityError) -> AuthOutcome {
        tracing::error!(
            operation,
            kind = %err.kind,
            details = err.details.as_deref().unwrap_or(""),
            "{err}"
        );
        self.state.send_modify(|s| s.last_failure = Some(err.kind));
        AuthOutcome::Failed(err.kind)
    }
}
