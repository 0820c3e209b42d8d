pub mod rainforest;
pub mod synthetic;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::app::Result;
use crate::domain::{ProductId, Quote};

pub use rainforest::RainforestClient;
pub use synthetic::SyntheticQuotes;

/// Structured price source queried before falling back to the rendered page.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// `Ok(None)` means the source is unavailable for this product and the
    /// caller should fall back. `Err` is reserved for configuration problems
    /// that make the whole run meaningless.
    async fn fetch_quote(&self, id: &ProductId) -> Result<Option<Quote>>;
}

/// Product API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Request endpoint (default: https://api.rainforestapi.com/request)
    pub endpoint: String,

    /// Marketplace domain passed to the API (default: amazon.com)
    pub amazon_domain: String,

    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,

    /// User agent sent with every request (default: pricefloor/<version>)
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.rainforestapi.com/request".to_string(),
            amazon_domain: "amazon.com".to_string(),
            timeout_secs: 30,
            user_agent: concat!("pricefloor/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}
