//! Rendered page extraction, used when the product API cannot price a link.
//!
//! # Architecture
//!
//! ```text
//! Orchestrator ──owns──▶ LazySession ──▶ PageSession (one browser tab per run,
//!                              ▲            launched on first fallback)
//! PriceResolver ─▶ PageScraper ┘ (borrows the session per link)
//! ```
//!
//! The product page renders prices in one of several DOM layouts depending
//! on promotion state. Layouts are data ([`PriceLayout`]) tried in order, so
//! supporting another variant is a config change.
//!
//! # Usage
//!
//! ```rust,ignore
//! use pricefloor::scraper::{ChromeSession, PageScraper, ScraperConfig};
//!
//! let config = ScraperConfig::default();
//! let mut session = ChromeSession::launch(&config).await?;
//! let quote = PageScraper::new(config).scrape(&mut session, link).await;
//! session.close().await?;
//! ```

mod chrome;
mod config;
mod extractor;
mod lazy;

pub use chrome::{ChromeLauncher, ChromeSession};
pub use config::{PriceLayout, ScraperConfig};
pub use extractor::{parse_price_text, reveal_script, PageScraper};
pub use lazy::LazySession;

use std::time::Duration;

use async_trait::async_trait;

use crate::app::Result;

/// A single navigable page context.
///
/// It cannot serve two navigations at once, so it is always lent out as
/// `&mut`.
#[async_trait]
pub trait PageSession: Send {
    /// Load `url`, waiting for navigation to finish
    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// Text of the first element matching `selector`, waiting at most `wait`
    /// for it to appear. Hidden elements are made visible before reading.
    ///
    /// Every lookup or read failure yields `None`.
    async fn read_text(&mut self, selector: &str, wait: Duration) -> Option<String>;

    /// Release the underlying browser. Calling it again is a no-op.
    async fn close(&mut self) -> Result<()>;
}

/// Creates the page session for a run
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn PageSession>>;
}
