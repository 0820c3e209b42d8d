use std::sync::LazyLock;

use regex::Regex;

use crate::domain::Quote;

static COUPON_PERCENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)%").expect("valid coupon percent regex"));

/// First `<digits>%` in the coupon text, e.g. `"Apply 10% off"` gives 10.
///
/// Values too large for a `u32` saturate to `u32::MAX`.
pub fn coupon_percent(text: &str) -> Option<u32> {
    let digits = COUPON_PERCENT.captures(text)?.get(1)?.as_str();
    match digits.parse() {
        Ok(percent) => Some(percent),
        Err(_) => Some(u32::MAX),
    }
}

/// Price after applying the quote's coupon.
///
/// A coupon without a parsable percentage counts as no discount. Percentages
/// above 100 are capped so the result never goes negative.
pub fn effective_price(quote: &Quote) -> f64 {
    let current = quote.current_price.unwrap_or(0.0);
    let percent = if quote.has_coupon {
        coupon_percent(&quote.coupon_text).unwrap_or_else(|| {
            tracing::warn!(
                "Coupon text {:?} has no percentage, applying no discount",
                quote.coupon_text
            );
            0
        })
    } else {
        0
    };
    let percent = f64::from(percent.min(100));
    current * (1.0 - percent / 100.0)
}
