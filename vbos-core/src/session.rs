//! Authentication session state and its on-disk persistence.

use crate::error::Result;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Fixed storage key the session is persisted under.
pub const SESSION_STORAGE_KEY: &str = "vbos-auth";

/// Profile returned by `GET /api/v1/users/me/`.
#[derive(Debug, PartialEq, Eq, Clone, Default, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: serde_json::Value,
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl AuthUser {
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

/// Token plus cached profile.
#[derive(Debug, PartialEq, Eq, Clone, Default, Serialize, Deserialize)]
pub struct Session {
    pub token: Option<String>,
    pub user: Option<AuthUser>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// A token with no cached profile has not been validated this run.
    pub fn needs_validation(&self) -> bool {
        self.token.is_some() && self.user.is_none()
    }
}

/// JSON file holding the persisted session.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Store at `<dir>/vbos-auth.json`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{SESSION_STORAGE_KEY}.json")),
        }
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted session. A missing or unreadable file yields an
    /// empty session rather than an error.
    pub fn load(&self) -> Session {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(_) => {
                debug!("no persisted session at {}", self.path.display());
                return Session::default();
            }
        };
        match serde_json::from_str(&contents) {
            Ok(session) => session,
            Err(e) => {
                warn!(
                    "ignoring malformed session file {}: {}",
                    self.path.display(),
                    e
                );
                Session::default()
            }
        }
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let body = serde_json::to_string_pretty(session)?;
        std::fs::write(&self.path, body)?;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Shared, process-wide session. Cheap to clone; every clone sees the same
/// state, and mutations are written through to the store when one is attached.
#[derive(Debug, Clone, Default)]
pub struct SessionHandle {
    inner: Arc<RwLock<Session>>,
    store: Option<SessionStore>,
}

impl SessionHandle {
    /// Handle backed by `store`, starting from whatever it holds.
    pub fn load(store: SessionStore) -> Self {
        let session = store.load();
        Self {
            inner: Arc::new(RwLock::new(session)),
            store: Some(store),
        }
    }

    pub fn in_memory(session: Session) -> Self {
        Self {
            inner: Arc::new(RwLock::new(session)),
            store: None,
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Session> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Session> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn snapshot(&self) -> Session {
        self.read().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.read().token.clone()
    }

    pub fn user(&self) -> Option<AuthUser> {
        self.read().user.clone()
    }

    fn persist(&self, session: &Session) -> Result<()> {
        match &self.store {
            Some(store) if session.token.is_none() && session.user.is_none() => store.clear(),
            Some(store) => store.save(session),
            None => Ok(()),
        }
    }

    pub fn set_auth(&self, token: String, user: AuthUser) -> Result<()> {
        let snapshot = {
            let mut session = self.write();
            session.token = Some(token);
            session.user = Some(user);
            session.clone()
        };
        self.persist(&snapshot)
    }

    pub fn set_user(&self, user: AuthUser) -> Result<()> {
        let snapshot = {
            let mut session = self.write();
            session.user = Some(user);
            session.clone()
        };
        self.persist(&snapshot)
    }

    /// Drop token and profile, in memory and on disk.
    pub fn clear(&self) -> Result<()> {
        *self.write() = Session::default();
        self.persist(&Session::default())
    }
}
