use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::app::{PricefloorError, Result};
use crate::scraper::{PageSession, SessionLauncher};

/// Page session that launches the browser on the first navigation.
///
/// Runs where every link is priced by the product API never start a
/// browser. A failed launch is kept and not retried; callers collect it
/// with [`LazySession::take_launch_error`] to abort the run.
pub struct LazySession {
    launcher: Arc<dyn SessionLauncher>,
    session: Option<Box<dyn PageSession>>,
    launch_error: Option<PricefloorError>,
    launch_failed: bool,
}

impl LazySession {
    pub fn new(launcher: Arc<dyn SessionLauncher>) -> Self {
        Self {
            launcher,
            session: None,
            launch_error: None,
            launch_failed: false,
        }
    }

    pub fn is_launched(&self) -> bool {
        self.session.is_some()
    }

    pub fn take_launch_error(&mut self) -> Option<PricefloorError> {
        self.launch_error.take()
    }
}

#[async_trait]
impl PageSession for LazySession {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        if self.session.is_none() {
            if self.launch_failed {
                return Err(PricefloorError::Browser("browser is not available".into()));
            }
            match self.launcher.launch().await {
                Ok(session) => {
                    tracing::debug!("Browser session started");
                    self.session = Some(session);
                }
                Err(e) => {
                    let message = e.to_string();
                    self.launch_failed = true;
                    self.launch_error = Some(e);
                    return Err(PricefloorError::Browser(message));
                }
            }
        }

        match self.session.as_mut() {
            Some(session) => session.navigate(url).await,
            None => Err(PricefloorError::Browser("browser is not available".into())),
        }
    }

    async fn read_text(&mut self, selector: &str, wait: Duration) -> Option<String> {
        self.session.as_mut()?.read_text(selector, wait).await
    }

    async fn close(&mut self) -> Result<()> {
        match self.session.as_mut() {
            Some(session) => session.close().await,
            None => Ok(()),
        }
    }
}
