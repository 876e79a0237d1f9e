//! Local session store.
//!
//! Remembers the last authenticated user across restarts. The file store
//! keeps a flat JSON object in `<base>/session.json` with restricted
//! permissions (0600); the user record lives under the fixed key `"user"`.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::user::User;

/// Key under which the user record is stored.
pub const USER_KEY: &str = "user";

/// Durable persistence for the signed-in user.
pub trait SessionStore: Send + Sync {
    /// Writes the user, replacing any previous record.
    ///
    /// # Errors
    /// Returns an error if the record cannot be written.
    fn persist(&self, user: &User) -> Result<()>;

    /// Reads the stored user, if any.
    ///
    /// # Errors
    /// Returns an error if the backing data cannot be read or parsed.
    fn load(&self) -> Result<Option<User>>;

    /// Removes the stored user. Returns true if a record was present.
    ///
    /// # Errors
    /// Returns an error if the backing data cannot be rewritten.
    fn delete(&self) -> Result<bool>;
}

/// On-disk key/value document.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(flatten)]
    entries: BTreeMap<String, Value>,
}

/// JSON file-backed store.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<StoreDocument> {
        if !self.path.exists() {
            return Ok(StoreDocument::default());
        }

        let contents = fs::read_to_string(&self.path).with_context(|| {
            format!("Failed to read session store from {}", self.path.display())
        })?;
        if contents.trim().is_empty() {
            return Ok(StoreDocument::default());
        }

        serde_json::from_str(&contents).with_context(|| {
            format!("Failed to parse session store from {}", self.path.display())
        })
    }

    fn write_document(&self, doc: &StoreDocument) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let contents =
            serde_json::to_string_pretty(doc).context("Failed to serialize session store")?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&self.path)
                .with_context(|| format!("Failed to open {} for writing", self.path.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        #[cfg(not(unix))]
        {
            fs::write(&self.path, contents)
                .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        }

        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn persist(&self, user: &User) -> Result<()> {
        // A corrupt document is replaced rather than blocking sign-in.
        let mut doc = self.read_document().unwrap_or_else(|err| {
            tracing::warn!(path = %self.path.display(), error = %err, "discarding unreadable session store");
            StoreDocument::default()
        });
        let value = serde_json::to_value(user).context("Failed to serialize user")?;
        doc.entries.insert(USER_KEY.to_string(), value);
        self.write_document(&doc)?;
        tracing::debug!(path = %self.path.display(), uid = %user.uid, "persisted user");
        Ok(())
    }

    fn load(&self) -> Result<Option<User>> {
        let doc = self.read_document()?;
        let Some(value) = doc.entries.get(USER_KEY) else {
            return Ok(None);
        };
        let user = serde_json::from_value(value.clone()).with_context(|| {
            format!("Malformed user record in {}", self.path.display())
        })?;
        Ok(Some(user))
    }

    fn delete(&self) -> Result<bool> {
        if !self.path.exists() {
            return Ok(false);
        }
        let mut doc = self.read_document().unwrap_or_default();
        let had_user = doc.entries.remove(USER_KEY).is_some();
        self.write_document(&doc)?;
        tracing::debug!(path = %self.path.display(), had_user, "deleted persisted user");
        Ok(had_user)
    }
}

/// In-process store for embedding and tests.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    user: Mutex<Option<User>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(user: User) -> Self {
        Self {
            user: Mutex::new(Some(user)),
        }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<User>> {
        // A poisoned lock only means a panic elsewhere; the value is still usable.
        self.user
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl SessionStore for MemorySessionStore {
    fn persist(&self, user: &User) -> Result<()> {
        *self.slot() = Some(user.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<User>> {
        Ok(self.slot().clone())
    }

    fn delete(&self) -> Result<bool> {
        Ok(self.slot().take().is_some())
    }
}

impl<T: SessionStore + ?Sized> SessionStore for std::sync::Arc<T> {
    fn persist(&self, user: &User) -> Result<()> {
        (**self).persist(user)
    }

    fn load(&self) -> Result<Option<User>> {
        (**self).load()
    }

    fn delete(&self) -> Result<bool> {
        (**self).delete()
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::test_support::sample_user;

    #[test]
    fn test_persist_then_load_roundtrip() {
        let dir = tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));
        let user = sample_user("refresh-a");

        store.persist(&user).unwrap();

        assert_eq!(store.load().unwrap(), Some(user));
    }

    #[test]
    fn test_load_missing_file_is_absent() {
        let dir = tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("nope.json"));
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_persist_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("session.json");
        let store = FileSessionStore::new(&path);

        store.persist(&sample_user("r")).unwrap();

        assert!(path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_persist_restricts_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        FileSessionStore::new(&path)
            .persist(&sample_user("r"))
            .unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_delete_removes_user_and_keeps_other_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, r#"{"theme": "dark"}"#).unwrap();
        let store = FileSessionStore::new(&path);
        store.persist(&sample_user("r")).unwrap();

        assert!(store.delete().unwrap());

        assert_eq!(store.load().unwrap(), None);
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("theme"));
        assert!(!contents.contains("refreshToken"));
    }

    #[test]
    fn test_delete_when_absent_reports_false() {
        let dir = tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session.json"));
        assert!(!store.delete().unwrap());
    }

    #[test]
    fn test_malformed_user_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, r#"{"user": {"uid": 42}}"#).unwrap();

        let err = FileSessionStore::new(&path).load().unwrap_err();
        assert!(format!("{err:#}").contains("Malformed user record"));
    }

    #[test]
    fn test_persist_replaces_corrupt_document() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not json").unwrap();
        let store = FileSessionStore::new(&path);

        store.persist(&sample_user("fresh")).unwrap();

        assert_eq!(store.load().unwrap().unwrap().refresh_token, "fresh");
    }

    #[test]
    fn test_memory_store() {
        let store = MemorySessionStore::new();
        assert_eq!(store.load().unwrap(), None);
        store.persist(&sample_user("m")).unwrap();
        assert!(store.load().unwrap().is_some());
        assert!(store.delete().unwrap());
        assert!(!store.delete().unwrap());
    }
}
