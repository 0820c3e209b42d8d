//! Persisted authorization for the sheet store.
//!
//! The token file holds an `authorized_user` record (client id/secret plus a
//! refresh token). Each run exchanges the refresh token for a short-lived
//! access token. A rejected refresh token surfaces as
//! [`PricefloorError::AuthInvalidated`], which the orchestrator answers by
//! discarding the file and retrying once.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::app::{PricefloorError, Result};
use crate::credentials::CredentialStore;

pub const DEFAULT_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorizedUser {
    #[serde(rename = "type")]
    pub kind: String,
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Default, Deserialize)]
struct TokenErrorResponse {
    #[serde(default)]
    error: String,
    #[serde(default)]
    error_description: String,
}

pub struct TokenStore {
    path: PathBuf,
    token_endpoint: String,
    client: Client,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>, token_endpoint: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            path: path.into(),
            token_endpoint: token_endpoint.into(),
            client,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Store a refresh token together with the OAuth client from the
    /// credentials file.
    pub fn save(&self, credentials: &CredentialStore, refresh_token: &str) -> Result<()> {
        let keys = credentials.client_keys()?;
        let user = AuthorizedUser {
            kind: "authorized_user".to_string(),
            client_id: keys.client_id,
            client_secret: keys.client_secret,
            refresh_token: refresh_token.to_string(),
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(&user)?)?;
        tracing::info!("Saved authorization to {}", self.path.display());
        Ok(())
    }

    pub fn load(&self) -> Result<AuthorizedUser> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(PricefloorError::AuthMissing(self.path.clone()))
            }
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&content).map_err(|e| {
            PricefloorError::AuthInvalidated(format!("Unreadable token file {}: {}", self.path.display(), e))
        })
    }

    /// Remove the stored authorization. A missing file is not an error.
    pub fn discard(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::warn!("Discarded stored authorization {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Exchange the stored refresh token for an access token.
    pub async fn access_token(&self) -> Result<String> {
        let user = self.load()?;

        let body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("grant_type", "refresh_token")
            .append_pair("client_id", &user.client_id)
            .append_pair("client_secret", &user.client_secret)
            .append_pair("refresh_token", &user.refresh_token)
            .finish();

        let response = self
            .client
            .post(&self.token_endpoint)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;

        if status.is_success() {
            let token: TokenResponse = serde_json::from_slice(&bytes)?;
            return Ok(token.access_token);
        }

        let error: TokenErrorResponse = serde_json::from_slice(&bytes).unwrap_or_default();
        if matches!(status.as_u16(), 400 | 401)
            && matches!(error.error.as_str(), "invalid_grant" | "unauthorized_client" | "invalid_client")
        {
            return Err(PricefloorError::AuthInvalidated(format!(
                "{}: {}",
                error.error, error.error_description
            )));
        }

        Err(PricefloorError::Other(format!(
            "Token endpoint returned {}: {} {}",
            status, error.error, error.error_description
        )))
    }
}
