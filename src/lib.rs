//! # pricefloor
//!
//! Finds the lowest current price for each product group in a spreadsheet,
//! where a group is a row of candidate product links for one item.
//!
//! ## Architecture
//!
//! ```text
//! Links sheet → Orchestrator → PriceResolver ─▶ QuoteSource (product API)
//!                    │                      └─▶ PageScraper (browser fallback)
//!                    └─▶ select_lowest → result rows + log rows
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! # Store sheet authorization once
//! pricefloor authorize --refresh-token 1//0g...
//!
//! # Price every row and write the results
//! pricefloor run
//!
//! # Price a few links without touching the spreadsheet
//! pricefloor resolve https://www.amazon.com/dp/B08N5WRWNW
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the quote
/// source, scraper, resolver and sheet authorization.
pub mod app;

/// Sheet authorization persistence and access token refresh.
pub mod auth;

/// Command-line interface using clap.
///
/// - `run [--test]` - Price every product group
/// - `resolve <link>...` - Price individual links
/// - `authorize --refresh-token` - Store sheet authorization
pub mod cli;

/// Configuration file loading, `~/.config/pricefloor/config.toml`.
pub mod config;

/// Product API key and OAuth client file.
pub mod credentials;

/// Core domain models.
///
/// - [`ProductId`](domain::ProductId): identifier parsed from a link
/// - [`Quote`](domain::Quote): price/coupon snapshot from either source
/// - [`Resolution`](domain::Resolution): per-link outcome
pub mod domain;

/// Run orchestration: session lifecycle, group loop, sheet output.
pub mod orchestrator;

/// Discount math, per-link resolution and lowest-price selection.
pub mod pricing;

/// Browser-based price extraction via chromiumoxide.
///
/// - [`PageSession`](scraper::PageSession): one navigable tab
/// - [`ChromeSession`](scraper::ChromeSession): headless Chrome implementation
/// - [`PageScraper`](scraper::PageScraper): layout-driven price extraction
pub mod scraper;

/// Row source and sink.
pub mod sheets;

/// Structured price sources.
///
/// - [`RainforestClient`](source::RainforestClient): reqwest-based product API client
/// - [`SyntheticQuotes`](source::SyntheticQuotes): random quotes for test runs
pub mod source;
