//! Read-only access to the client-side key/value storage file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::error::{ReportError, Result};

/// Key holding the bearer token.
pub const TOKEN_KEY: &str = "token";

/// A JSON object persisted on disk, read once.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LocalStorage {
    path: PathBuf,
    values: Map<String, Value>,
}

impl LocalStorage {
    /// Reads `path`.  A missing file behaves as empty storage.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let values = match fs::read_to_string(path) {
            Ok(content) if content.trim().is_empty() => Map::new(),
            Ok(content) => serde_json::from_str(&content)?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::debug!("storage file {} does not exist", path.display());
                Map::new()
            }
            Err(err) => return Err(err.into()),
        };
        Ok(Self {
            path: path.to_path_buf(),
            values,
        })
    }

    /// Storage file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// String value stored under `key`; empty strings count as absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
    }

    /// The bearer token.
    pub fn token(&self) -> Result<String> {
        self.get(TOKEN_KEY)
            .map(str::to_string)
            .ok_or_else(|| ReportError::MissingToken {
                key: TOKEN_KEY.to_string(),
                path: self.path.display().to_string(),
            })
    }
}
