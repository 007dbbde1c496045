//! Local storage
//!
//! A directory of JSON documents addressed by key (`<dir>/<key>.json`).
//! Holds the handful of records the portal keeps across restarts: the
//! active session and user preferences.

use serde::{de::DeserializeOwned, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Errors reading or writing local storage
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Key/value JSON documents on disk, or nowhere when disabled
#[derive(Debug, Clone)]
pub struct LocalStorage {
    dir: Option<PathBuf>,
}

impl LocalStorage {
    /// Use `dir`, creating it if needed
    pub fn open(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir: Some(dir) })
    }

    /// Storage that remembers nothing
    pub fn disabled() -> Self {
        Self { dir: None }
    }

    fn path_for(&self, key: &str) -> StorageResult<Option<PathBuf>> {
        if key.is_empty()
            || !key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.as_ref().map(|d| d.join(format!("{}.json", key))))
    }

    /// Read a document; `None` when absent or storage is disabled
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> StorageResult<Option<T>> {
        let Some(path) = self.path_for(key)? else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Write a document, replacing any previous value
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> StorageResult<()> {
        let Some(path) = self.path_for(key)? else {
            return Ok(());
        };
        let content = serde_json::to_string_pretty(value)?;
        // write-then-rename keeps readers from seeing half a document
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> StorageResult<()> {
        let Some(path) = self.path_for(key)? else {
            return Ok(());
        };
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
