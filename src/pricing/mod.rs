//! Price math and per-link resolution.
//!
//! ```text
//! link → ProductId → QuoteSource ─(unavailable)─▶ PageScraper
//!                         └──────────┬───────────────┘
//!                                 Quote → discount → Resolution → select_lowest
//! ```

pub mod discount;
pub mod resolver;
pub mod selector;

pub use discount::{coupon_percent, effective_price};
pub use resolver::PriceResolver;
pub use selector::select_lowest;
