//! Durable storage for the single session record.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use labelhub_core::identity::{AuthSession, Identity};
use labelhub_core::types::Timestamp;
use serde::{Deserialize, Serialize};

/// Fixed key under which the session record is stored.
pub const STORAGE_KEY: &str = "labelhub.auth.session";

/// The persisted form of a signed-in session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSession {
    pub identity: Identity,
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub expires_at: Timestamp,
}

impl PersistedSession {
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.expires_at <= now
    }
}

impl From<&AuthSession> for PersistedSession {
    fn from(session: &AuthSession) -> Self {
        Self {
            identity: session.identity.clone(),
            access_token: session.access_token.clone(),
            refresh_token: session.refresh_token.clone(),
            expires_at: session.identity.expires_at,
        }
    }
}

impl From<PersistedSession> for AuthSession {
    fn from(record: PersistedSession) -> Self {
        let mut identity = record.identity;
        identity.expires_at = record.expires_at;
        Self {
            identity,
            access_token: record.access_token,
            refresh_token: record.refresh_token,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Session storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session record is malformed: {0}")]
    Format(#[from] serde_json::Error),
}

/// Where the session store keeps its record between process runs.
///
/// Implementations hold at most one record. They are called with the store's
/// gate held, so they must not call back into the store.
pub trait SessionPersistence: Send + Sync {
    fn load(&self) -> Result<Option<PersistedSession>, PersistenceError>;
    fn save(&self, record: &PersistedSession) -> Result<(), PersistenceError>;
    /// Remove the record. Removing an absent record succeeds.
    fn remove(&self) -> Result<(), PersistenceError>;
}

// ---------------------------------------------------------------------------
// File-backed
// ---------------------------------------------------------------------------

/// Stores the record as `<dir>/labelhub.auth.session.json`.
#[derive(Debug, Clone)]
pub struct FileSessionPersistence {
    path: PathBuf,
}

impl FileSessionPersistence {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{STORAGE_KEY}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionPersistence for FileSessionPersistence {
    fn load(&self) -> Result<Option<PersistedSession>, PersistenceError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, record: &PersistedSession) -> Result<(), PersistenceError> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        // Write-then-rename so a crash never leaves a half-written record.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(record)?)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn remove(&self) -> Result<(), PersistenceError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Process-local persistence, for tests and embedders without a disk.
#[derive(Debug, Default)]
pub struct MemorySessionPersistence {
    record: Mutex<Option<PersistedSession>>,
}

impl MemorySessionPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `record` already stored.
    pub fn with_record(record: PersistedSession) -> Self {
        Self {
            record: Mutex::new(Some(record)),
        }
    }

    pub fn snapshot(&self) -> Option<PersistedSession> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<PersistedSession>> {
        self.record
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl SessionPersistence for MemorySessionPersistence {
    fn load(&self) -> Result<Option<PersistedSession>, PersistenceError> {
        Ok(self.lock().clone())
    }

    fn save(&self, record: &PersistedSession) -> Result<(), PersistenceError> {
        *self.lock() = Some(record.clone());
        Ok(())
    }

    fn remove(&self) -> Result<(), PersistenceError> {
        *self.lock() = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{Duration, Utc};

    use super::*;

    fn record() -> PersistedSession {
        let now = Utc::now();
        PersistedSession {
            identity: Identity {
                id: "u1".into(),
                email: "u1@example.com".into(),
                display_name: Some("U One".into()),
                issued_at: now,
                expires_at: now + Duration::hours(1),
            },
            access_token: "access".into(),
            refresh_token: Some("refresh".into()),
            expires_at: now + Duration::hours(1),
        }
    }

    #[test]
    fn test_file_record_lives_under_the_storage_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionPersistence::new(dir.path());
        assert_eq!(
            store.path().file_name().unwrap(),
            "labelhub.auth.session.json"
        );

        assert!(store.load().unwrap().is_none());
        let rec = record();
        store.save(&rec).unwrap();
        assert_eq!(store.load().unwrap(), Some(rec));

        store.remove().unwrap();
        assert!(store.load().unwrap().is_none());
        // Removing twice is fine.
        store.remove().unwrap();
    }

    #[test]
    fn test_file_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionPersistence::new(dir.path().join("nested/deeper"));
        store.save(&record()).unwrap();
        assert_eq!(store.load().unwrap().unwrap().access_token, "access");
    }

    #[test]
    fn test_corrupt_file_is_a_format_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionPersistence::new(dir.path());
        std::fs::write(store.path(), b"{ not json").unwrap();
        assert_matches!(store.load(), Err(PersistenceError::Format(_)));
    }

    #[test]
    fn test_refresh_token_is_omitted_when_absent() {
        let mut rec = record();
        rec.refresh_token = None;
        let json = serde_json::to_value(&rec).unwrap();
        assert!(json.get("refresh_token").is_none());
        assert!(json.get("expires_at").is_some());
    }
}
