use async_trait::async_trait;
use rand::Rng;

use crate::app::Result;
use crate::domain::{ProductId, Quote};
use crate::source::QuoteSource;

/// Random quotes for exercising the pipeline without network access.
///
/// Prices are whole cents below 10.00 with a reference price 10.00 higher;
/// about 40% of quotes carry a 10% coupon.
#[derive(Debug, Default, Clone)]
pub struct SyntheticQuotes;

impl SyntheticQuotes {
    pub fn new() -> Self {
        Self
    }

    fn generate<R: Rng>(rng: &mut R) -> Quote {
        let price = f64::from(rng.random_range(0..1000u32)) / 100.0;
        let has_coupon = rng.random_range(0..10u32) > 5;
        Quote::new(
            Some(price),
            Some(price + 10.0),
            has_coupon,
            Some("Apply 10% off".to_string()),
        )
    }
}

#[async_trait]
impl QuoteSource for SyntheticQuotes {
    async fn fetch_quote(&self, id: &ProductId) -> Result<Option<Quote>> {
        let quote = Self::generate(&mut rand::rng());
        tracing::debug!("Synthetic quote for {}: {:?}", id, quote);
        Ok(Some(quote))
    }
}
