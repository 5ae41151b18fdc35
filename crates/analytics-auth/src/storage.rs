//! Session storage for persisting tokens between runs.
//!
//! Only the consumer key and the token pair are persisted. The consumer
//! secret is supplied again by the application when a session is restored.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::credentials::{Credentials, TokenPair};
use crate::error::{Error, ErrorKind, Result};

/// Serializable state of one session's credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Consumer key the token was issued to.
    pub consumer_key: String,
    /// Token pair, absent before authorization.
    pub token: Option<TokenPair>,
}

impl Credentials {
    /// Capture the persistable part of these credentials.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            consumer_key: self.consumer_key().to_string(),
            token: self.token().map(|pair| (*pair).clone()),
        }
    }

    /// Rebuild credentials from a snapshot and the consumer secret.
    pub fn from_snapshot(snapshot: &SessionSnapshot, consumer_secret: impl Into<String>) -> Self {
        let creds = Credentials::new(snapshot.consumer_key.clone(), consumer_secret);
        if let Some(ref pair) = snapshot.token {
            creds.set_token(pair.token(), pair.secret());
        }
        creds
    }
}

/// Trait for session storage implementations.
pub trait TokenStorage: Send + Sync {
    /// Save a session.
    fn save(&self, key: &str, session: &SessionSnapshot) -> Result<()>;

    /// Load a session.
    fn load(&self, key: &str) -> Result<Option<SessionSnapshot>>;

    /// Delete a session.
    fn delete(&self, key: &str) -> Result<()>;

    /// Check if a session exists.
    fn exists(&self, key: &str) -> Result<bool>;

    /// List all stored session keys.
    fn list(&self) -> Result<Vec<String>>;
}

/// File-based session storage, one JSON document per key.
#[derive(Debug, Clone)]
pub struct FileTokenStorage {
    base_path: PathBuf,
}

impl FileTokenStorage {
    /// Create a new file storage with the default path.
    ///
    /// Default path: `~/.ridgeline/tokens/`
    pub fn new() -> Result<Self> {
        let base_path = default_token_dir()?;
        Ok(Self { base_path })
    }

    /// Create a new file storage with a custom path.
    pub fn with_path(path: impl AsRef<Path>) -> Self {
        Self {
            base_path: path.as_ref().to_path_buf(),
        }
    }

    /// Get the file path for a key.
    fn token_path(&self, key: &str) -> PathBuf {
        let safe_key = key
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect::<String>();

        self.base_path.join(format!("{}.json", safe_key))
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.base_path.exists() {
            std::fs::create_dir_all(&self.base_path)?;
        }
        Ok(())
    }
}

impl TokenStorage for FileTokenStorage {
    fn save(&self, key: &str, session: &SessionSnapshot) -> Result<()> {
        self.ensure_dir()?;

        let path = self.token_path(key);
        let stored = StoredSession {
            session: session.clone(),
            stored_at: chrono::Utc::now(),
        };

        let json = serde_json::to_string_pretty(&stored)?;
        std::fs::write(&path, json)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&path, perms)?;
        }

        tracing::debug!(key, "Session saved");
        Ok(())
    }

    fn load(&self, key: &str) -> Result<Option<SessionSnapshot>> {
        let path = self.token_path(key);

        if !path.exists() {
            return Ok(None);
        }

        let json = std::fs::read_to_string(&path)?;
        let stored: StoredSession = serde_json::from_str(&json)?;

        Ok(Some(stored.session))
    }

    fn delete(&self, key: &str) -> Result<()> {
        let path = self.token_path(key);

        if path.exists() {
            std::fs::remove_file(&path)?;
        }

        Ok(())
    }

    fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.token_path(key).exists())
    }

    fn list(&self) -> Result<Vec<String>> {
        if !self.base_path.exists() {
            return Ok(Vec::new());
        }

        let mut keys = Vec::new();
        for entry in std::fs::read_dir(&self.base_path)? {
            let path = entry?.path();

            if path.extension().is_some_and(|e| e == "json") {
                if let Some(stem) = path.file_stem() {
                    keys.push(stem.to_string_lossy().to_string());
                }
            }
        }

        Ok(keys)
    }
}

/// Session with storage metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredSession {
    session: SessionSnapshot,
    stored_at: chrono::DateTime<chrono::Utc>,
}

/// Get the default session storage directory.
pub fn default_token_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| {
        Error::new(ErrorKind::Config("Could not find home directory".to_string()))
    })?;

    Ok(home.join(".ridgeline").join("tokens"))
}
