use std::{
    fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;
use uuid::Uuid;

/// Local persistence failure. Always recoverable: callers treat the stored
/// value as absent and move on.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed json: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Remote-connection credentials. Immutable once accepted; replacing them
/// tears down and rebuilds the connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub endpoint: String,
    pub key: String,
}

/// Authenticated identity, mirrored to session storage for restart
/// continuity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub username: String,
}

/// Durable scope: endpoint + key across restarts.
#[derive(Debug)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Result<Option<Credentials>, StorageError> {
        read_json(&self.path)
    }

    /// Like [`load`](Self::load), but an unreadable or corrupt file counts
    /// as absent (logged, never fatal).
    pub fn load_or_absent(&self) -> Option<Credentials> {
        recover_absent("credentials", self.load())
    }

    pub fn save(&self, credentials: &Credentials) -> Result<(), StorageError> {
        write_json(&self.path, credentials)
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        remove(&self.path)
    }
}

/// Session scope: one JSON record `{id, username}`.
#[derive(Debug)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Result<Option<Session>, StorageError> {
        read_json(&self.path)
    }

    pub fn load_or_absent(&self) -> Option<Session> {
        recover_absent("session", self.load())
    }

    pub fn save(&self, session: &Session) -> Result<(), StorageError> {
        write_json(&self.path, session)
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        remove(&self.path)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StorageError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    Ok(Some(serde_json::from_str(&content)?))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let payload = serde_json::to_string_pretty(value)?;
    fs::write(path, payload)?;
    Ok(())
}

fn remove(path: &Path) -> Result<(), StorageError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

fn recover_absent<T>(what: &str, result: Result<Option<T>, StorageError>) -> Option<T> {
    match result {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!("treating stored {what} as absent: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> Credentials {
        Credentials {
            endpoint: "https://example.supabase.co".to_string(),
            key: "anon-key".to_string(),
        }
    }

    #[test]
    fn missing_file_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("credentials.json"));
        assert_eq!(store.load().unwrap(), None);
        assert_eq!(store.load_or_absent(), None);
    }

    #[test]
    fn round_trips_credentials() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("nested/credentials.json"));
        store.save(&credentials()).unwrap();
        assert_eq!(store.load().unwrap(), Some(credentials()));
    }

    #[test]
    fn corrupt_file_is_an_error_recovered_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = SessionStore::new(&path);
        assert!(store.load().is_err());
        assert_eq!(store.load_or_absent(), None);
    }

    #[test]
    fn clear_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("credentials.json"));
        store.save(&credentials()).unwrap();
        store.clear().unwrap();
        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn session_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SessionStore::new(dir.path().join("session.json"));
        let session = Session {
            id: Uuid::from_u128(7),
            username: "alice".to_string(),
        };
        store.save(&session).unwrap();
        assert_eq!(store.load_or_absent(), Some(session));
        store.clear().unwrap();
        assert_eq!(store.load_or_absent(), None);
    }
}
