//! Durable storage for the session token
//!
//! The token is the only state that outlives the process. It is stored under
//! the key `cid` with a 30-day expiry that restarts on every write.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Lifetime of a persisted token: 30 days
pub const SESSION_TTL: Duration = Duration::from_secs(2_592_000);

#[derive(Error, Debug)]
pub enum SessionStoreError {
    #[error("Session store I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Session store is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("Session TTL out of range: {0}")]
    Ttl(#[from] chrono::OutOfRangeError),
}

/// Where the session token lives between runs
pub trait SessionStore: Send + Sync {
    /// The stored token, if one exists, is non-empty, and has not expired
    fn load(&self) -> Result<Option<String>, SessionStoreError>;

    /// Store `token`, expiring `ttl` from now
    fn save(&self, token: &str, ttl: Duration) -> Result<(), SessionStoreError>;

    fn clear(&self) -> Result<(), SessionStoreError>;
}

impl<T: SessionStore + ?Sized> SessionStore for Arc<T> {
    fn load(&self) -> Result<Option<String>, SessionStoreError> {
        (**self).load()
    }

    fn save(&self, token: &str, ttl: Duration) -> Result<(), SessionStoreError> {
        (**self).save(token, ttl)
    }

    fn clear(&self) -> Result<(), SessionStoreError> {
        (**self).clear()
    }
}

/// On-disk record
#[derive(Debug, Serialize, Deserialize)]
struct StoredSession {
    cid: String,
    expires_at: DateTime<Utc>,
}

/// JSON file holding one `cid` record
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

    fn write_record(&self, record: &StoredSession) -> Result<(), SessionStoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(record)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<String>, SessionStoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let record: StoredSession = serde_json::from_slice(&bytes)?;

        if record.expires_at <= Utc::now() {
            tracing::debug!(path = %self.path.display(), "Stored session expired");
            return Ok(None);
        }
        Ok(Some(record.cid).filter(|cid| !cid.is_empty()))
    }

    fn save(&self, token: &str, ttl: Duration) -> Result<(), SessionStoreError> {
        let expires_at = Utc::now() + chrono::Duration::from_std(ttl)?;
        self.write_record(&StoredSession {
            cid: token.to_string(),
            expires_at,
        })
    }

    fn clear(&self) -> Result<(), SessionStoreError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
