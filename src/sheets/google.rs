use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::json;
use url::Url;

use crate::app::{PricefloorError, Result};
use crate::sheets::rows::cell_text;
use crate::sheets::{Row, SheetStore, SheetsConfig};

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

/// Google Sheets values API, authenticated with a bearer access token.
pub struct GoogleSheets {
    client: Client,
    base: Url,
    access_token: String,
}

impl GoogleSheets {
    pub fn new(config: &SheetsConfig, access_token: String) -> Result<Self> {
        if config.spreadsheet_id.trim().is_empty() {
            return Err(PricefloorError::Config("sheets.spreadsheet_id is not set".into()));
        }

        let mut base = Url::parse(&config.api_base)
            .map_err(|e| PricefloorError::Config(format!("Invalid sheets.api_base: {}", e)))?;
        base.path_segments_mut()
            .map_err(|_| PricefloorError::Config("sheets.api_base cannot be a base URL".into()))?
            .pop_if_empty()
            .push(&config.spreadsheet_id)
            .push("values");

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base,
            access_token,
        })
    }

    fn values_url(&self, segment: &str) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.push(segment);
        }
        url
    }

    async fn send(&self, request: RequestBuilder, range: &str) -> Result<Vec<u8>> {
        let response = request.bearer_auth(&self.access_token).send().await?;
        let status = response.status();
        let body = response.bytes().await?.to_vec();

        if status.is_success() {
            return Ok(body);
        }

        let message = String::from_utf8_lossy(&body).into_owned();
        if status == StatusCode::UNAUTHORIZED {
            return Err(PricefloorError::AuthInvalidated(format!(
                "Sheets API rejected access to {} ({}): {}",
                range, status, message
            )));
        }
        Err(PricefloorError::Sheet {
            status: status.as_u16(),
            message: format!("{}: {}", range, message),
        })
    }
}

#[async_trait]
impl SheetStore for GoogleSheets {
    async fn read_range(&self, range: &str) -> Result<Vec<Vec<String>>> {
        let mut url = self.values_url(range);
        url.query_pairs_mut().append_pair("valueRenderOption", "FORMULA");

        let body = self.send(self.client.get(url), range).await?;
        let values: ValueRange = serde_json::from_slice(&body)?;

        Ok(values
            .values
            .iter()
            .map(|row| row.iter().map(cell_text).collect())
            .collect())
    }

    async fn update_range(&self, range: &str, rows: Vec<Row>) -> Result<()> {
        let mut url = self.values_url(range);
        url.query_pairs_mut().append_pair("valueInputOption", "USER_ENTERED");

        let request = self
            .client
            .put(url)
            .json(&json!({ "range": range, "values": rows }));
        self.send(request, range).await?;
        tracing::debug!("Updated {}", range);
        Ok(())
    }

    async fn append_rows(&self, range: &str, rows: Vec<Row>) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }

        let mut url = self.values_url(&format!("{}:append", range));
        url.query_pairs_mut().append_pair("valueInputOption", "USER_ENTERED");

        let count = rows.len();
        let request = self
            .client
            .post(url)
            .json(&json!({ "range": range, "values": rows }));
        self.send(request, range).await?;
        tracing::debug!("Appended {} rows to {}", count, range);
        Ok(())
    }
}
