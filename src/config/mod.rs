//! Configuration management for pricefloor.
//!
//! Configuration is read from `~/.config/pricefloor/config.toml` unless a path
//! is given on the command line. If the file doesn't exist, a default
//! configuration with comments is created.

use crate::scraper::ScraperConfig;
use crate::sheets::SheetsConfig;
use crate::source::ApiConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Local files holding secrets, relative to the working directory by default.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub credentials: PathBuf,
    pub token: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            credentials: PathBuf::from("credentials.json"),
            token: PathBuf::from("token.json"),
        }
    }
}

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Use synthetic quotes and the test sheet instead of live data
    pub test_mode: bool,
    pub sheets: SheetsConfig,
    pub api: ApiConfig,
    pub scraper: ScraperConfig,
    pub paths: PathsConfig,
}

impl Config {
    /// Load configuration from `path`, or from the default path when `None`.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// If the config file exists but is invalid, returns an error.
    /// Missing fields in the config file will use default values.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_config_path()?,
        };

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
            tracing::info!("Created default config at {}", config_path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: config_path,
            source: e,
        })?;

        Ok(config)
    }

    /// Get the default config file path: `~/.config/pricefloor/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("pricefloor").join("config.toml"))
    }

    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# pricefloor configuration

# Use random quotes and write to the test sheet instead of live data
test_mode = false

[sheets]
# Spreadsheet holding the Links, result and Log sheets
spreadsheet_id = ""

# One product group per row, one candidate link per cell
links_range = "Links!A1:Z"

# Result sheet (display names in column B, results written to B:G)
target_sheet = "2022"
test_sheet = "2022Copy"

# Append-only run log
log_range = "Log!A2:E"

api_base = "https://sheets.googleapis.com/v4/spreadsheets"
token_endpoint = "https://oauth2.googleapis.com/token"
timeout_secs = 30

[api]
endpoint = "https://api.rainforestapi.com/request"
amazon_domain = "amazon.com"
timeout_secs = 30
# User agent sent with product API requests
# user_agent = "pricefloor/0.1"

[scraper]
# Run browser in headless mode (no visible window)
headless = true

# Page load timeout in seconds
timeout_secs = 30

# How long to wait for each price element (milliseconds)
element_wait_ms = 500
poll_interval_ms = 50

# Page layouts, tried in order for every field
[[scraper.layouts]]
name = "core-price-display"
current_price = "#corePriceDisplay_desktop_feature_div .priceToPay .a-offscreen"
reference_price = "#corePriceDisplay_desktop_feature_div .basisPrice .a-offscreen"
coupon = "#promoPriceBlockMessage_feature_div label[id^=\"couponText\"]"

[[scraper.layouts]]
name = "core-price"
current_price = "#corePrice_desktop .apexPriceToPay .a-offscreen"
reference_price = "#corePrice_desktop .a-text-price .a-offscreen"
coupon = "#couponBadgeRegularVpc"

[paths]
# rainforestapi.apiKey and the OAuth client (installed/web)
credentials = "credentials.json"
# Stored sheet authorization, written by `pricefloor authorize`
token = "token.json"
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
