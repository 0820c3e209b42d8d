use std::sync::Arc;

use crate::app::error::Result;
use crate::auth::TokenStore;
use crate::config::Config;
use crate::credentials::CredentialStore;
use crate::orchestrator::{run_with_auth_retry, Orchestrator, RunSummary};
use crate::pricing::PriceResolver;
use crate::scraper::{ChromeLauncher, PageScraper, SessionLauncher};
use crate::sheets::GoogleSheets;
use crate::source::{QuoteSource, RainforestClient, SyntheticQuotes};

pub struct AppContext {
    pub config: Config,
    pub credentials: CredentialStore,
    pub tokens: TokenStore,
    pub resolver: Arc<PriceResolver>,
    pub launcher: Arc<dyn SessionLauncher>,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        let credentials = CredentialStore::new(&config.paths.credentials);
        let tokens = TokenStore::new(&config.paths.token, config.sheets.token_endpoint.clone())?;

        let source: Arc<dyn QuoteSource> = if config.test_mode {
            Arc::new(SyntheticQuotes::new())
        } else {
            Arc::new(RainforestClient::new(config.api.clone(), credentials.clone())?)
        };
        let scraper = PageScraper::new(config.scraper.clone());
        let resolver = Arc::new(PriceResolver::new(source, scraper));
        let launcher: Arc<dyn SessionLauncher> = Arc::new(ChromeLauncher::new(config.scraper.clone()));

        Ok(Self {
            config,
            credentials,
            tokens,
            resolver,
            launcher,
        })
    }

    pub fn orchestrator(&self) -> Orchestrator {
        Orchestrator::new(
            self.resolver.clone(),
            self.launcher.clone(),
            self.config.sheets.clone(),
            self.config.test_mode,
        )
    }

    /// Full run against the configured spreadsheet, retrying once after an
    /// invalidated authorization.
    pub async fn run(&self) -> Result<RunSummary> {
        let orchestrator = self.orchestrator();
        let orchestrator = &orchestrator;
        let tokens = &self.tokens;
        let sheets_config = &self.config.sheets;

        run_with_auth_retry(
            move || async move {
                let access_token = tokens.access_token().await?;
                let sheets = GoogleSheets::new(sheets_config, access_token)?;
                orchestrator.run(&sheets).await
            },
            || tokens.discard(),
        )
        .await
    }
}
