//! Auth command handlers.

use anyhow::Result;
use fitsession_core::config::Config;
use fitsession_core::store::SessionStore;
use fitsession_core::validation::{normalize_email, validate_login, validate_registration};
use fitsession_core::{AuthOutcome, FederatedProvider, SessionCheck};

use super::session::{self, build_manager, read_secret, spawn_progress};

pub async fn login(config: &Config, email: &str) -> Result<()> {
    let password = read_secret("Password: ")?;
    let credentials = validate_login(email, &password)?;

    let mut manager = build_manager(config)?;
    if let Some(existing) = manager.state().user {
        println!("Replacing stored session for {}", existing.display_label());
    }

    let progress = spawn_progress(&manager, "Signing in");
    let outcome = manager
        .sign_in(&credentials.email, &credentials.password)
        .await;
    progress.abort();
    ensure_succeeded(outcome, "Sign-in")?;

    if let Some(warning) = session_check_warning(manager.check_user_session()) {
        tracing::warn!("{warning}");
        eprintln!("Warning: {warning}");
    }

    let state = manager.state();
    if let Some(user) = state.user.as_ref() {
        println!("✓ Logged in as {}", user.display_label());
    }
    println!("Session saved to: {}", manager.store().path().display());
    Ok(())
}

/// Federated flows do no provider work, so no credentials are resolved.
pub fn login_google() -> Result<()> {
    federated_unavailable(FederatedProvider::Google, "sign-in")
}

pub async fn logout(config: &Config) -> Result<()> {
    // Sign-out is local, so there is nothing to do without a stored user.
    // An unreadable record still counts as present so it can be removed.
    match session::store_for(config).load() {
        Ok(Some(_)) => {}
        Ok(None) => {
            println!("Not logged in.");
            return Ok(());
        }
        Err(err) => {
            tracing::warn!(error = %format!("{err:#}"), "stored session is unreadable, removing it");
        }
    }

    let mut manager = build_manager(config)?;
    let outcome = manager.sign_out().await;
    ensure_succeeded(outcome, "Sign-out")?;
    println!("✓ Logged out. Stored session removed.");
    Ok(())
}

pub async fn register(config: &Config, email: &str) -> Result<()> {
    let password = read_secret("Password: ")?;
    let confirmation = read_secret("Confirm password: ")?;
    let credentials = validate_registration(email, &password, &confirmation)?;

    let mut manager = build_manager(config)?;
    let progress = spawn_progress(&manager, "Creating account");
    let outcome = manager
        .sign_up_with_email(&credentials.email, &credentials.password)
        .await;
    progress.abort();
    ensure_succeeded(outcome, "Registration")?;

    println!("Run `fitsession login --email {}` to sign in.", credentials.email);
    Ok(())
}

pub fn register_google() -> Result<()> {
    federated_unavailable(FederatedProvider::Google, "sign-up")
}

pub async fn recover(config: &Config, email: &str) -> Result<()> {
    let email = normalize_email(email)?;

    let mut manager = build_manager(config)?;
    let progress = spawn_progress(&manager, "Requesting recovery email");
    let outcome = manager.recovery_password(&email).await;
    progress.abort();
    ensure_succeeded(outcome, "Password recovery")
}

fn federated_unavailable(provider: FederatedProvider, action: &str) -> Result<()> {
    tracing::info!(%provider, action, "federated flow requested");
    let name = match provider {
        FederatedProvider::Google => "Google",
    };
    anyhow::bail!("{name} {action} is not available yet")
}

fn session_check_warning(check: SessionCheck) -> Option<&'static str> {
    match check {
        SessionCheck::Cleared => {
            Some("an older stored session did not match this sign-in and was removed")
        }
        SessionCheck::Consistent | SessionCheck::Skipped => None,
    }
}

fn ensure_succeeded(outcome: AuthOutcome, operation: &str) -> Result<()> {
    match outcome {
        AuthOutcome::Succeeded => Ok(()),
        AuthOutcome::Failed(kind) => anyhow::bail!("{operation} failed ({kind})"),
        AuthOutcome::Unsupported => anyhow::bail!("{operation} is not available yet"),
    }
}

#[cfg(test)]
mod tests {
    use fitsession_core::IdentityErrorKind;

    use super::*;

    #[test]
    fn test_ensure_succeeded_messages() {
        assert!(ensure_succeeded(AuthOutcome::Succeeded, "Sign-in").is_ok());

        let err = ensure_succeeded(
            AuthOutcome::Failed(IdentityErrorKind::WrongCredentials),
            "Sign-in",
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Sign-in failed (wrong_credentials)");

        let err = ensure_succeeded(AuthOutcome::Unsupported, "Registration").unwrap_err();
        assert!(err.to_string().contains("not available"));
    }

    #[test]
    fn test_federated_flows_report_unavailable() {
        let err = login_google().unwrap_err();
        assert_eq!(err.to_string(), "Google sign-in is not available yet");
        let err = register_google().unwrap_err();
        assert_eq!(err.to_string(), "Google sign-up is not available yet");
    }

    #[test]
    fn test_cleared_session_after_login_is_only_a_warning() {
        assert!(session_check_warning(SessionCheck::Cleared).is_some());
        assert_eq!(session_check_warning(SessionCheck::Consistent), None);
        assert_eq!(session_check_warning(SessionCheck::Skipped), None);
    }
}
