//! Persisted sign-in state.
//!
//! The store is a flat string key/value map. Commands only ever touch two
//! keys: the auth token and the JSON-encoded signed-in user.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::resource::ResourceId;

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

/// Default file name of the session store inside the data directory.
pub const SESSION_FILE: &str = "session.json";

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Failed to read session file '{}': {}", .0.display(), .1)]
    Read(PathBuf, io::Error),

    #[error("Failed to write session file '{}': {}", .0.display(), .1)]
    Write(PathBuf, io::Error),

    #[error("Invalid session file '{}': {}", .0.display(), .1)]
    Parse(PathBuf, serde_json::Error),

    #[error("Invalid session value for '{0}': {1}")]
    Value(String, serde_json::Error),
}

/// Key/value persistence for session data.
pub trait SessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), SessionError>;
    fn remove(&mut self, key: &str) -> Result<(), SessionError>;
    fn clear(&mut self) -> Result<(), SessionError>;
}

/// Session store backed by a JSON object on disk.
///
/// The file is read on every access, so several processes see each other's writes.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<data_dir>/session.json`.
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(SESSION_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Map<String, Value>, SessionError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(SessionError::Read(self.path.clone(), e)),
        };
        if contents.trim().is_empty() {
            return Ok(Map::new());
        }
        serde_json::from_str(&contents).map_err(|e| SessionError::Parse(self.path.clone(), e))
    }

    fn save(&self, values: &Map<String, Value>) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| SessionError::Write(self.path.clone(), e))?;
        }
        let json = serde_json::to_string_pretty(values)
            .map_err(|e| SessionError::Parse(self.path.clone(), e))?;
        fs::write(&self.path, json).map_err(|e| SessionError::Write(self.path.clone(), e))
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.load()?.get(key).and_then(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SessionError> {
        let mut values = self.load()?;
        values.insert(key.to_string(), Value::String(value.to_string()));
        self.save(&values)
    }

    fn remove(&mut self, key: &str) -> Result<(), SessionError> {
        let mut values = self.load()?;
        if values.remove(key).is_some() {
            self.save(&values)?;
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<(), SessionError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SessionError::Write(self.path.clone(), e)),
        }
    }
}

/// In-memory session store, used in tests and for one-shot invocations.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    values: HashMap<String, String>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), SessionError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), SessionError> {
        self.values.remove(key);
        Ok(())
    }

    fn clear(&mut self) -> Result<(), SessionError> {
        self.values.clear();
        Ok(())
    }
}

/// The signed-in user as returned by the login endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: ResourceId,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl SessionUser {
    /// Full name when known, otherwise the username.
    pub fn display_name(&self) -> String {
        let full = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if full.is_empty() {
            self.username.clone()
        } else {
            full
        }
    }
}

/// Typed access to the token and user held in a [`SessionStore`].
pub struct Session<S> {
    store: S,
}

impl<S: SessionStore> Session<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn token(&self) -> Result<Option<String>, SessionError> {
        self.store.get(TOKEN_KEY)
    }

    pub fn user(&self) -> Result<Option<SessionUser>, SessionError> {
        let Some(raw) = self.store.get(USER_KEY)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| SessionError::Value(USER_KEY.to_string(), e))
    }

    /// Id stamped into `sender`, `reported_by` and similar fields on create.
    pub fn current_user_id(&self) -> Result<Option<ResourceId>, SessionError> {
        Ok(self.user()?.map(|u| u.id))
    }

    pub fn is_signed_in(&self) -> Result<bool, SessionError> {
        Ok(self.token()?.is_some())
    }

    pub fn sign_in(&mut self, token: &str, user: &SessionUser) -> Result<(), SessionError> {
        let encoded =
            serde_json::to_string(user).map_err(|e| SessionError::Value(USER_KEY.to_string(), e))?;
        self.store.set(TOKEN_KEY, token)?;
        self.store.set(USER_KEY, &encoded)
    }

    pub fn sign_out(&mut self) -> Result<(), SessionError> {
        self.store.clear()
    }
}
