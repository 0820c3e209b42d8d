use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::app::{PricefloorError, Result};
use crate::credentials::CredentialStore;
use crate::domain::{ProductId, Quote};
use crate::source::{ApiConfig, QuoteSource};

#[derive(Debug, Deserialize)]
struct ProductResponse {
    product: Option<Product>,
}

#[derive(Debug, Deserialize)]
struct Product {
    #[serde(default)]
    has_coupon: bool,
    coupon_text: Option<String>,
    buybox_winner: Option<BuyboxWinner>,
}

#[derive(Debug, Deserialize)]
struct BuyboxWinner {
    price: Option<Money>,
    rrp: Option<Money>,
}

#[derive(Debug, Deserialize)]
struct Money {
    value: Option<f64>,
}

impl From<Product> for Quote {
    fn from(product: Product) -> Self {
        let (price, rrp) = match product.buybox_winner {
            Some(winner) => (
                winner.price.and_then(|m| m.value),
                winner.rrp.and_then(|m| m.value),
            ),
            None => (None, None),
        };
        Quote::new(price, rrp, product.has_coupon, product.coupon_text)
    }
}

/// Rainforest product API client
pub struct RainforestClient {
    client: Client,
    config: ApiConfig,
    credentials: CredentialStore,
}

impl RainforestClient {
    pub fn new(config: ApiConfig, credentials: CredentialStore) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .brotli(true)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            config,
            credentials,
        })
    }

    fn request_url(&self, api_key: &str, id: &ProductId) -> Result<Url> {
        Url::parse_with_params(
            &self.config.endpoint,
            &[
                ("api_key", api_key),
                ("amazon_domain", self.config.amazon_domain.as_str()),
                ("type", "product"),
                ("asin", id.as_str()),
            ],
        )
        .map_err(|e| PricefloorError::Config(format!("Invalid API endpoint {}: {}", self.config.endpoint, e)))
    }
}

#[async_trait]
impl QuoteSource for RainforestClient {
    async fn fetch_quote(&self, id: &ProductId) -> Result<Option<Quote>> {
        let Some(api_key) = self.credentials.api_key()? else {
            tracing::debug!("No product API key configured, skipping API for {}", id);
            return Ok(None);
        };
        let url = self.request_url(&api_key, id)?;

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Product API request for {} failed: {}", id, e.without_url());
                return Ok(None);
            }
        };

        let status = response.status();
        if status.as_u16() >= 400 {
            tracing::warn!("Product API returned {} for {}", status, id);
            return Ok(None);
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Failed to read product API body for {}: {}", id, e.without_url());
                return Ok(None);
            }
        };

        match serde_json::from_slice::<ProductResponse>(&body) {
            Ok(ProductResponse {
                product: Some(product),
            }) => Ok(Some(product.into())),
            Ok(_) => {
                tracing::warn!("Product API response for {} has no product", id);
                Ok(None)
            }
            Err(e) => {
                tracing::warn!("Malformed product API response for {}: {}", id, e);
                Ok(None)
            }
        }
    }
}
