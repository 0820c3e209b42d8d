use std::sync::Arc;

use crate::app::Result;
use crate::domain::{ProductId, ResolvedPrice, Resolution};
use crate::pricing::discount::effective_price;
use crate::scraper::{PageScraper, PageSession};
use crate::source::QuoteSource;

/// Prices one link: product API first, rendered page second.
pub struct PriceResolver {
    source: Arc<dyn QuoteSource>,
    scraper: PageScraper,
}

impl PriceResolver {
    pub fn new(source: Arc<dyn QuoteSource>, scraper: PageScraper) -> Self {
        Self { source, scraper }
    }

    /// Resolve `link` to an effective price.
    ///
    /// Soft failures of either source are folded into the returned
    /// [`Resolution`]; only configuration errors come back as `Err`.
    pub async fn resolve(&self, session: &mut dyn PageSession, link: &str) -> Result<Resolution> {
        let Some(id) = ProductId::from_link(link) else {
            tracing::debug!("No product id in {:?}", link);
            return Ok(Resolution::Unresolvable {
                link: link.to_string(),
            });
        };

        let quote = match self.source.fetch_quote(&id).await? {
            Some(quote) => quote,
            None => {
                tracing::info!("Product API unavailable for {}, scraping {}", id, link);
                match self.scraper.scrape(session, link).await {
                    Some(quote) => quote,
                    None => {
                        return Ok(Resolution::Unpriced {
                            link: link.to_string(),
                            reason: "product page could not be loaded".to_string(),
                        })
                    }
                }
            }
        };

        if !quote.is_priced() {
            return Ok(Resolution::Unpriced {
                link: link.to_string(),
                reason: "no current price found".to_string(),
            });
        }

        let price = effective_price(&quote);
        tracing::debug!("{} resolved to {:.2} from {:?}", id, price, quote);

        Ok(Resolution::Priced(ResolvedPrice {
            effective_price: price,
            source_link: link.to_string(),
        }))
    }
}
