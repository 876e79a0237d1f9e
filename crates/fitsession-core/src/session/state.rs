use std::sync::Arc;

use tokio::sync::watch;

use crate::identity::IdentityErrorKind;
use crate::user::{Session, User};

/// Snapshot of the current authentication state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    /// Signed-in user, or the user remembered from a previous run
    pub user: Option<User>,
    /// Present only after a sign-in in this process
    pub session: Option<Session>,
    /// True while an operation is waiting on the provider
    pub loading: bool,
    /// Classification of the most recent failed operation
    pub last_failure: Option<IdentityErrorKind>,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }
}

pub(crate) type SharedState = Arc<watch::Sender<SessionState>>;

pub(crate) fn shared(initial: SessionState) -> SharedState {
    let (tx, _rx) = watch::channel(initial);
    Arc::new(tx)
}

/// Holds the loading flag up until dropped, so early returns and cancelled
/// futures still clear it.
pub(crate) struct LoadingGuard {
    state: SharedState,
}

impl LoadingGuard {
    pub(crate) fn begin(state: &SharedState) -> Self {
        state.send_modify(|s| {
            s.loading = true;
            s.last_failure = None;
        });
        Self {
            state: Arc::clone(state),
        }
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.state.send_modify(|s| s.loading = false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_sets_and_clears_loading() {
        let state = shared(SessionState::default());
        let rx = state.subscribe();

        let guard = LoadingGuard::begin(&state);
        assert!(rx.borrow().loading);

        drop(guard);
        assert!(!rx.borrow().loading);
    }

    #[test]
    fn test_guard_resets_previous_failure() {
        let state = shared(SessionState {
            last_failure: Some(IdentityErrorKind::Network),
            ..Default::default()
        });

        let _guard = LoadingGuard::begin(&state);
        assert_eq!(state.borrow().last_failure, None);
    }
}
