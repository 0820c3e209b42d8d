use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Locators for one DOM variant of the product page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceLayout {
    /// Name used in logs
    pub name: String,
    /// CSS selector of the current (buy box) price
    pub current_price: String,
    /// CSS selector of the list/reference price
    pub reference_price: String,
    /// CSS selector of the coupon label, if this layout shows one
    #[serde(default)]
    pub coupon: Option<String>,
}

impl PriceLayout {
    pub fn new(
        name: &str,
        current_price: &str,
        reference_price: &str,
        coupon: Option<&str>,
    ) -> Self {
        Self {
            name: name.to_string(),
            current_price: current_price.to_string(),
            reference_price: reference_price.to_string(),
            coupon: coupon.map(String::from),
        }
    }
}

/// Configuration for the rendered page scraper
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Whether to run the browser in headless mode (default: true)
    pub headless: bool,

    /// Navigation timeout in seconds (default: 30)
    pub timeout_secs: u64,

    /// Bounded wait for each element lookup in milliseconds (default: 500)
    pub element_wait_ms: u64,

    /// Poll interval while waiting for an element in milliseconds (default: 50)
    pub poll_interval_ms: u64,

    /// Page layouts to try, in priority order
    pub layouts: Vec<PriceLayout>,

    /// User agent string to use
    pub user_agent: Option<String>,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            headless: true,
            timeout_secs: 30,
            element_wait_ms: 500,
            poll_interval_ms: 50,
            layouts: vec![
                PriceLayout::new(
                    "core-price-display",
                    "#corePriceDisplay_desktop_feature_div .priceToPay .a-offscreen",
                    "#corePriceDisplay_desktop_feature_div .basisPrice .a-offscreen",
                    Some("#promoPriceBlockMessage_feature_div label[id^=\"couponText\"]"),
                ),
                PriceLayout::new(
                    "core-price",
                    "#corePrice_desktop .apexPriceToPay .a-offscreen",
                    "#corePrice_desktop .a-text-price .a-offscreen",
                    Some("#couponBadgeRegularVpc"),
                ),
            ],
            user_agent: Some(
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                    .to_string(),
            ),
        }
    }
}

impl ScraperConfig {
    /// Get the navigation timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get the per-element wait as a Duration
    pub fn element_wait(&self) -> Duration {
        Duration::from_millis(self.element_wait_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}
