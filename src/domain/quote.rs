use serde::{Deserialize, Serialize};

/// Coupon text recorded for quotes without a coupon.
pub const NO_COUPON: &str = "0%";

/// Normalized price/coupon snapshot from either price source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub current_price: Option<f64>,
    pub reference_price: Option<f64>,
    pub has_coupon: bool,
    pub coupon_text: String,
}

impl Quote {
    pub fn new(
        current_price: Option<f64>,
        reference_price: Option<f64>,
        has_coupon: bool,
        coupon_text: Option<String>,
    ) -> Self {
        let coupon_text = match coupon_text {
            Some(text) if has_coupon => text,
            _ => NO_COUPON.to_string(),
        };
        Self {
            current_price: current_price.filter(|p| p.is_finite() && *p >= 0.0),
            reference_price: reference_price.filter(|p| p.is_finite() && *p >= 0.0),
            has_coupon,
            coupon_text,
        }
    }

    /// A zero or absent current price means "unknown", not "free".
    pub fn is_priced(&self) -> bool {
        self.current_price.is_some_and(|p| p > 0.0)
    }
}

/// Final discounted price for one link.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedPrice {
    pub effective_price: f64,
    pub source_link: String,
}

/// Outcome of resolving a single link.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Priced(ResolvedPrice),
    /// The link named a product but neither source produced a usable price.
    Unpriced { link: String, reason: String },
    /// No product identifier in the link.
    Unresolvable { link: String },
}

impl Resolution {
    pub fn price(&self) -> Option<&ResolvedPrice> {
        match self {
            Self::Priced(price) => Some(price),
            _ => None,
        }
    }

    pub fn link(&self) -> &str {
        match self {
            Self::Priced(price) => &price.source_link,
            Self::Unpriced { link, .. } | Self::Unresolvable { link } => link,
        }
    }
}

/// Candidate links sharing one display name; `index` is the sheet row.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductGroup {
    pub index: usize,
    pub display_name: String,
    pub links: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectionResult {
    Winner {
        display_name: String,
        winning_link: String,
        price: f64,
    },
    NoWinner,
}
