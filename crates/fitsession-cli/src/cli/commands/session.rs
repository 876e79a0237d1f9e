//! Session wiring shared by the auth commands, plus `status`.

use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use fitsession_core::config::Config;
use fitsession_core::identity::{FirebaseAuthClient, FirebaseConfig};
use fitsession_core::store::{FileSessionStore, SessionStore};
use fitsession_core::user::{User, mask_token};
use fitsession_core::{Notice, NoticeLevel, Notifier, SessionManager};
use tokio::task::JoinHandle;

pub type CliSessionManager = SessionManager<FirebaseAuthClient, FileSessionStore, ConsoleNotifier>;

/// Prints success notices to stdout and errors to stderr.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => println!("✓ {notice}"),
            NoticeLevel::Error => eprintln!("✗ {notice}"),
        }
    }
}

pub fn store_for(config: &Config) -> FileSessionStore {
    FileSessionStore::new(config.session_store_path())
}

pub fn build_manager(config: &Config) -> Result<CliSessionManager> {
    let firebase = FirebaseConfig::from_config(&config.identity)?;
    let client = FirebaseAuthClient::new(firebase).context("create identity client")?;
    Ok(SessionManager::new(client, store_for(config), ConsoleNotifier))
}

/// Prints `label...` once the manager reports it is busy (interactive only).
pub fn spawn_progress(manager: &CliSessionManager, label: &'static str) -> JoinHandle<()> {
    let mut rx = manager.subscribe();
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            if rx.borrow_and_update().loading {
                if io::stderr().is_terminal() {
                    eprintln!("{label}...");
                }
                break;
            }
        }
    })
}

/// Reads one line from stdin without its line ending.
pub fn read_secret(prompt: &str) -> Result<String> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        eprint!("{prompt}");
        io::stderr().flush()?;
    }
    let mut line = String::new();
    stdin.lock().read_line(&mut line).context("read from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

pub fn status(config: &Config) -> Result<()> {
    let store = store_for(config);
    let user = match store.load() {
        Ok(Some(user)) => user,
        Ok(None) => {
            println!("Not logged in.");
            return Ok(());
        }
        Err(err) => {
            println!("Stored session is unreadable: {err:#}");
            println!("Run `fitsession logout` to clear it.");
            return Ok(());
        }
    };

    print_user(&user);
    println!("Session file: {}", store.path().display());
    Ok(())
}

pub fn print_user(user: &User) {
    println!("Signed in as {}", user.display_label());
    println!("  uid:            {}", user.uid);
    println!("  email:          {}", user.email);
    println!(
        "  email verified: {}",
        if user.email_verified { "yes" } else { "no" }
    );
    println!("  created:        {}", format_timestamp(user.metadata.created()));
    println!("  last login:     {}", format_timestamp(user.metadata.last_login()));
    println!("  refresh token:  {}", mask_token(&user.refresh_token));
}

fn format_timestamp(ts: Option<DateTime<Utc>>) -> String {
    ts.map_or_else(
        || "unknown".to_string(),
        |ts| ts.format("%Y-%m-%d %H:%M UTC").to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp() {
        let ts = DateTime::from_timestamp_millis(1_700_000_000_000);
        assert_eq!(format_timestamp(ts), "2023-11-14 22:13 UTC");
        assert_eq!(format_timestamp(None), "unknown");
    }
}
