use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

use crate::app::{PricefloorError, Result};

/// OAuth client registration (`installed` or `web` entry of the credentials file).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClientKeys {
    pub client_id: String,
    pub client_secret: String,
}

/// Local credentials file: product API key plus the OAuth client used for the
/// sheet store.
///
/// ```json
/// { "installed": { "client_id": "...", "client_secret": "..." },
///   "rainforestapi": { "apiKey": "..." } }
/// ```
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Product API key. A missing file or key is `Ok(None)`; a file that is
    /// not valid JSON is a configuration error.
    pub fn api_key(&self) -> Result<Option<String>> {
        let Some(doc) = self.read()? else {
            return Ok(None);
        };
        Ok(doc
            .pointer("/rainforestapi/apiKey")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(String::from))
    }

    /// OAuth client keys, required to store sheet authorization.
    pub fn client_keys(&self) -> Result<ClientKeys> {
        let doc = self.read()?.ok_or_else(|| {
            PricefloorError::Config(format!("Credentials file {} not found", self.path.display()))
        })?;
        let entry = doc
            .get("installed")
            .or_else(|| doc.get("web"))
            .cloned()
            .ok_or_else(|| {
                PricefloorError::Config(format!(
                    "Credentials file {} has no `installed` or `web` client",
                    self.path.display()
                ))
            })?;
        serde_json::from_value(entry).map_err(|e| {
            PricefloorError::Config(format!("Invalid OAuth client in {}: {}", self.path.display(), e))
        })
    }

    fn read(&self) -> Result<Option<Value>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&content).map(Some).map_err(|e| {
            PricefloorError::Config(format!("Malformed credentials file {}: {}", self.path.display(), e))
        })
    }
}
