use crate::domain::Quote;
use crate::scraper::config::{PriceLayout, ScraperConfig};
use crate::scraper::PageSession;

/// Parse price text such as `"$1,299.99"` by dropping everything that is not
/// a digit or a period.
pub fn parse_price_text(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    cleaned.parse::<f64>().ok().filter(|p| p.is_finite())
}

/// JavaScript that forces the element matching `selector` to be rendered so
/// its text can be read.
///
/// The product page keeps some price nodes (`.a-offscreen`) hidden or moved
/// off screen.
pub fn reveal_script(selector: &str) -> String {
    let selector = selector.replace('\\', "\\\\").replace('\'', "\\'");
    format!(
        r#"
        (() => {{
            const el = document.querySelector('{selector}');
            if (!el) {{
                return false;
            }}
            el.style.display = 'block';
            el.style.opacity = '1';
            el.style.visibility = 'visible';
            el.style.position = 'static';
            el.style.clip = 'auto';
            el.style.width = 'auto';
            el.style.height = 'auto';
            return true;
        }})()
        "#
    )
}

/// Reads a [`Quote`] from a rendered product page.
///
/// Each field is looked up in every configured [`PriceLayout`] in order and
/// the first readable value wins.
pub struct PageScraper {
    config: ScraperConfig,
}

impl PageScraper {
    pub fn new(config: ScraperConfig) -> Self {
        Self { config }
    }

    /// Scrape the product page at `link` using the caller's session.
    ///
    /// Returns `None` only when navigation itself fails. Missing elements
    /// leave the corresponding field absent.
    pub async fn scrape(&self, session: &mut dyn PageSession, link: &str) -> Option<Quote> {
        if let Err(e) = session.navigate(link).await {
            tracing::warn!("Failed to load {}: {}", link, e);
            return None;
        }

        let current = self
            .first_price(session, |layout| Some(&layout.current_price))
            .await;
        let reference = self
            .first_price(session, |layout| Some(&layout.reference_price))
            .await
            .or(current);
        let coupon = self.first_text(session, |layout| layout.coupon.as_ref()).await;

        tracing::debug!(
            "Scraped {}: current={:?} reference={:?} coupon={:?}",
            link,
            current,
            reference,
            coupon
        );

        let has_coupon = coupon.is_some();
        Some(Quote::new(current, reference, has_coupon, coupon))
    }

    async fn first_price<F>(&self, session: &mut dyn PageSession, locator: F) -> Option<f64>
    where
        F: Fn(&PriceLayout) -> Option<&String>,
    {
        for layout in &self.config.layouts {
            let Some(selector) = locator(layout) else {
                continue;
            };
            let Some(text) = session.read_text(selector, self.config.element_wait()).await else {
                continue;
            };
            match parse_price_text(&text) {
                Some(price) => return Some(price),
                None => tracing::debug!(
                    "Layout {} price text {:?} is not a number",
                    layout.name,
                    text
                ),
            }
        }
        None
    }

    async fn first_text<F>(&self, session: &mut dyn PageSession, locator: F) -> Option<String>
    where
        F: Fn(&PriceLayout) -> Option<&String>,
    {
        for layout in &self.config.layouts {
            let Some(selector) = locator(layout) else {
                continue;
            };
            if let Some(text) = session.read_text(selector, self.config.element_wait()).await {
                let text = text.trim();
                if !text.is_empty() {
                    return Some(text.to_string());
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::app::{PricefloorError, Result};

    #[derive(Default)]
    struct FakePage {
        texts: HashMap<String, String>,
        fail_navigation: bool,
        visited: Vec<String>,
        lookups: Vec<String>,
    }

    impl FakePage {
        fn with(texts: &[(&str, &str)]) -> Self {
            Self {
                texts: texts
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl PageSession for FakePage {
        async fn navigate(&mut self, url: &str) -> Result<()> {
            self.visited.push(url.to_string());
            if self.fail_navigation {
                Err(PricefloorError::Browser("net::ERR_NAME_NOT_RESOLVED".into()))
            } else {
                Ok(())
            }
        }

        async fn read_text(&mut self, selector: &str, _wait: Duration) -> Option<String> {
            self.lookups.push(selector.to_string());
            self.texts.get(selector).cloned()
        }

        async fn close(&mut self) -> Result<()> {
            Ok(())
        }
    }

    fn scraper() -> PageScraper {
        PageScraper::new(ScraperConfig {
            layouts: vec![
                PriceLayout::new("primary", "#p1", "#r1", Some("#c1")),
                PriceLayout::new("secondary", "#p2", "#r2", None),
            ],
            ..Default::default()
        })
    }

    #[test]
    fn test_parse_price_text() {
        assert_eq!(parse_price_text("$1,299.99"), Some(1299.99));
        assert_eq!(parse_price_text(" 28.00 "), Some(28.0));
        assert_eq!(parse_price_text("USD 5"), Some(5.0));
        assert_eq!(parse_price_text("Currently unavailable"), None);
        assert_eq!(parse_price_text(""), None);
        assert_eq!(parse_price_text("1.2.3"), None);
    }

    #[test]
    fn test_reveal_script_escapes_selector() {
        let script = reveal_script("label[id^='coupon']");
        assert!(script.contains(r"label[id^=\'coupon\']"));
        assert!(script.contains("opacity"));
        assert!(script.contains("display"));
        assert!(script.contains("position"));
    }

    #[tokio::test]
    async fn test_primary_layout() {
        let mut page = FakePage::with(&[("#p1", "$30.00"), ("#r1", "$40.00"), ("#c1", "Apply 10% coupon")]);
        let quote = scraper().scrape(&mut page, "https://x/dp/A").await.unwrap();
        assert_eq!(quote.current_price, Some(30.0));
        assert_eq!(quote.reference_price, Some(40.0));
        assert!(quote.has_coupon);
        assert_eq!(quote.coupon_text, "Apply 10% coupon");
        assert_eq!(page.visited, vec!["https://x/dp/A"]);
    }

    #[tokio::test]
    async fn test_falls_back_to_secondary_layout() {
        let mut page = FakePage::with(&[("#p1", "See price in cart"), ("#p2", "$28.00"), ("#r2", "$35.00")]);
        let quote = scraper().scrape(&mut page, "https://x/dp/A").await.unwrap();
        assert_eq!(quote.current_price, Some(28.0));
        assert_eq!(quote.reference_price, Some(35.0));
        assert!(!quote.has_coupon);
        assert_eq!(quote.coupon_text, "0%");
    }

    #[tokio::test]
    async fn test_reference_defaults_to_current() {
        let mut page = FakePage::with(&[("#p1", "$28.00")]);
        let quote = scraper().scrape(&mut page, "https://x/dp/A").await.unwrap();
        assert_eq!(quote.current_price, Some(28.0));
        assert_eq!(quote.reference_price, Some(28.0));
    }

    #[tokio::test]
    async fn test_missing_elements_leave_fields_absent() {
        let mut page = FakePage::default();
        let quote = scraper().scrape(&mut page, "https://x/dp/A").await.unwrap();
        assert_eq!(quote.current_price, None);
        assert_eq!(quote.reference_price, None);
        assert!(!quote.is_priced());
        assert_eq!(page.lookups, vec!["#p1", "#p2", "#r1", "#r2", "#c1"]);
    }

    #[tokio::test]
    async fn test_navigation_failure_is_unavailable() {
        let mut page = FakePage {
            fail_navigation: true,
            ..FakePage::with(&[("#p1", "$30.00")])
        };
        assert!(scraper().scrape(&mut page, "https://x/dp/A").await.is_none());
        assert!(page.lookups.is_empty());
    }

    #[tokio::test]
    async fn test_blank_coupon_text_is_no_coupon() {
        let mut page = FakePage::with(&[("#p1", "$30.00"), ("#c1", "   ")]);
        let quote = scraper().scrape(&mut page, "https://x/dp/A").await.unwrap();
        assert!(!quote.has_coupon);
    }
}
