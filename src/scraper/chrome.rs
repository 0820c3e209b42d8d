use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::app::{PricefloorError, Result};
use crate::scraper::config::ScraperConfig;
use crate::scraper::extractor::reveal_script;
use crate::scraper::{PageSession, SessionLauncher};

/// One headless Chrome with a single reusable tab.
pub struct ChromeSession {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    poll_interval: Duration,
    timeout: Duration,
    closed: bool,
}

impl ChromeSession {
    /// Launch Chrome and open the tab every navigation of the run will reuse
    pub async fn launch(config: &ScraperConfig) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .arg("--no-sandbox")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-software-rasterizer")
            .request_timeout(config.timeout());

        if !config.headless {
            builder = builder.with_head();
        }

        let browser_config = builder
            .build()
            .map_err(|e| PricefloorError::Browser(format!("Failed to build browser config: {}", e)))?;

        let (mut browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
            PricefloorError::Browser(format!(
                "Failed to launch browser: {}. Is Chrome or Chromium installed and in PATH?",
                e
            ))
        })?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                let _ = browser.close().await;
                handler.abort();
                return Err(PricefloorError::Browser(format!("Failed to create page: {}", e)));
            }
        };

        let mut session = Self {
            browser,
            page,
            handler,
            poll_interval: config.poll_interval(),
            timeout: config.timeout(),
            closed: false,
        };

        if let Some(ref ua) = config.user_agent {
            if let Err(e) = session.page.set_user_agent(ua).await {
                let _ = session.close().await;
                return Err(PricefloorError::Browser(format!("Failed to set user agent: {}", e)));
            }
        }

        Ok(session)
    }

    async fn wait_for_element(&self, selector: &str, wait: Duration) -> Option<Element> {
        let deadline = Instant::now() + wait;
        loop {
            match self.page.find_element(selector).await {
                Ok(element) => return Some(element),
                Err(e) if Instant::now() >= deadline => {
                    tracing::debug!("Element {} not found within {:?}: {}", selector, wait, e);
                    return None;
                }
                Err(_) => tokio::time::sleep(self.poll_interval).await,
            }
        }
    }
}

#[async_trait]
impl PageSession for ChromeSession {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        let navigation = async {
            self.page.goto(url).await?;
            self.page.wait_for_navigation().await?;
            Ok::<_, chromiumoxide::error::CdpError>(())
        };

        match tokio::time::timeout(self.timeout, navigation).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(PricefloorError::Browser(format!("Navigation failed: {}", e))),
            Err(_) => Err(PricefloorError::Browser(format!(
                "Navigation to {} timed out after {:?}",
                url, self.timeout
            ))),
        }
    }

    async fn read_text(&mut self, selector: &str, wait: Duration) -> Option<String> {
        let element = self.wait_for_element(selector, wait).await?;

        if let Err(e) = self.page.evaluate(reveal_script(selector)).await {
            tracing::debug!("Failed to reveal {}: {}", selector, e);
        }

        match element.inner_text().await {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!("Failed to read text of {}: {}", selector, e);
                None
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let result = self.browser.close().await;
        let _ = self.browser.wait().await;
        self.handler.abort();

        result
            .map(|_| ())
            .map_err(|e| PricefloorError::Browser(format!("Failed to close browser: {}", e)))
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        if !self.closed {
            tracing::warn!("Browser session dropped without close, killing browser");
            self.handler.abort();
        }
    }
}

/// Launches [`ChromeSession`]s for the orchestrator.
pub struct ChromeLauncher {
    config: ScraperConfig,
}

impl ChromeLauncher {
    pub fn new(config: ScraperConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SessionLauncher for ChromeLauncher {
    async fn launch(&self) -> Result<Box<dyn PageSession>> {
        let session = ChromeSession::launch(&self.config).await?;
        Ok(Box::new(session))
    }
}
