//! One pricing run: read groups, price every link, write results and log.

use std::future::Future;
use std::sync::Arc;

use chrono::Local;
use tracing::{error, info, warn};

use crate::app::Result;
use crate::domain::{ProductGroup, SelectionResult};
use crate::pricing::{select_lowest, PriceResolver};
use crate::scraper::{LazySession, PageSession, SessionLauncher};
use crate::sheets::rows::{hyperlink_label, log_row, log_timestamp, output_row};
use crate::sheets::{SheetStore, SheetsConfig};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub groups: usize,
    pub links: usize,
    pub winners: usize,
}

pub struct Orchestrator {
    resolver: Arc<PriceResolver>,
    launcher: Arc<dyn SessionLauncher>,
    sheets: SheetsConfig,
    test_mode: bool,
}

impl Orchestrator {
    pub fn new(
        resolver: Arc<PriceResolver>,
        launcher: Arc<dyn SessionLauncher>,
        sheets: SheetsConfig,
        test_mode: bool,
    ) -> Self {
        Self {
            resolver,
            launcher,
            sheets,
            test_mode,
        }
    }

    /// Run once against `store`.
    pub async fn run(&self, store: &dyn SheetStore) -> Result<RunSummary> {
        let groups = self.load_groups(store).await?;
        if groups.is_empty() {
            info!("No link rows found in {}", self.sheets.links_range);
            return Ok(RunSummary::default());
        }

        let selections = self.price_groups(&groups).await?;

        let output = selections.iter().map(output_row).collect();
        store
            .update_range(&self.sheets.output_range(self.test_mode), output)
            .await?;

        let timestamp = log_timestamp(&Local::now());
        let log: Vec<_> = selections
            .iter()
            .filter_map(|s| log_row(&timestamp, s, self.test_mode))
            .collect();
        let winners = log.len();
        store.append_rows(&self.sheets.log_range, log).await?;

        let summary = RunSummary {
            groups: groups.len(),
            links: groups.iter().map(|g| g.links.len()).sum(),
            winners,
        };
        info!(
            "Run complete: {} groups, {} links, {} winners",
            summary.groups, summary.links, summary.winners
        );
        Ok(summary)
    }

    /// Build product groups from the links table and the display names in
    /// column B of the result sheet. Row order is preserved.
    pub async fn load_groups(&self, store: &dyn SheetStore) -> Result<Vec<ProductGroup>> {
        let links = store.read_range(&self.sheets.links_range).await?;
        let names = store
            .read_range(&self.sheets.names_range(self.test_mode))
            .await?;

        Ok(links
            .into_iter()
            .enumerate()
            .map(|(index, row)| ProductGroup {
                index,
                display_name: names
                    .get(index)
                    .and_then(|r| r.get(1))
                    .map(|cell| hyperlink_label(cell))
                    .unwrap_or_default(),
                links: row
                    .into_iter()
                    .map(|cell| cell.trim().to_string())
                    .filter(|cell| !cell.is_empty())
                    .collect(),
            })
            .collect())
    }

    /// Select a winner for every group, in order, sharing one browser session.
    ///
    /// The browser starts on the first page fallback; if it was started it is
    /// closed exactly once whether pricing succeeds or not.
    pub async fn price_groups(&self, groups: &[ProductGroup]) -> Result<Vec<SelectionResult>> {
        let mut session = LazySession::new(self.launcher.clone());
        let result = self.select_all(&mut session, groups).await;

        if let Err(e) = session.close().await {
            warn!("Failed to close browser session: {}", e);
        }
        if let Err(ref e) = result {
            error!("Run aborted: {}", e);
        }
        result
    }

    async fn select_all(
        &self,
        session: &mut LazySession,
        groups: &[ProductGroup],
    ) -> Result<Vec<SelectionResult>> {
        let mut selections = Vec::with_capacity(groups.len());

        for group in groups {
            let mut resolutions = Vec::with_capacity(group.links.len());
            for link in &group.links {
                let resolution = self
                    .resolver
                    .resolve(session, link)
                    .await
                    .map_err(|e| e.in_group(group.index, link))?;
                if let Some(e) = session.take_launch_error() {
                    return Err(e);
                }
                resolutions.push(resolution);
            }

            let selection = select_lowest(&group.display_name, &resolutions);
            match &selection {
                SelectionResult::Winner {
                    winning_link, price, ..
                } => info!(
                    "Row {} {:?}: {:.2} at {}",
                    group.index + 1,
                    group.display_name,
                    price,
                    winning_link
                ),
                SelectionResult::NoWinner => info!(
                    "Row {} {:?}: no price among {} links",
                    group.index + 1,
                    group.display_name,
                    group.links.len()
                ),
            }
            selections.push(selection);
        }

        Ok(selections)
    }
}

/// Run `attempt`; if it fails because the sheet authorization was
/// invalidated, call `discard` and run it exactly once more.
pub async fn run_with_auth_retry<T, F, Fut, D>(mut attempt: F, discard: D) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    D: FnOnce() -> Result<()>,
{
    match attempt().await {
        Err(e) if e.is_auth_invalidated() => {
            warn!("{}; discarding stored authorization and retrying", e);
            discard()?;
            attempt().await.inspect_err(|e| {
                if e.is_auth_invalidated() {
                    error!("Authorization rejected again: {}", e);
                }
            })
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::app::PricefloorError;
    use crate::domain::Quote;
    use crate::pricing::resolver::tests::{test_scraper, ScriptedPage, TableSource, LINK_A, LINK_B};
    use crate::sheets::MemorySheets;

    struct CountingSession {
        inner: ScriptedPage,
        closes: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl PageSession for CountingSession {
        async fn navigate(&mut self, url: &str) -> Result<()> {
            self.inner.navigate(url).await
        }

        async fn read_text(&mut self, selector: &str, wait: Duration) -> Option<String> {
            self.inner.read_text(selector, wait).await
        }

        async fn close(&mut self) -> Result<()> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeLauncher {
        pages: HashMap<String, (String, String)>,
        launches: AtomicUsize,
        closes: Arc<AtomicUsize>,
        fail_launch: bool,
    }

    #[async_trait]
    impl SessionLauncher for FakeLauncher {
        async fn launch(&self) -> Result<Box<dyn PageSession>> {
            self.launches.fetch_add(1, Ordering::SeqCst);
            if self.fail_launch {
                return Err(PricefloorError::Browser("chrome not found".into()));
            }
            Ok(Box::new(CountingSession {
                inner: ScriptedPage {
                    pages: self.pages.clone(),
                    ..Default::default()
                },
                closes: self.closes.clone(),
            }))
        }
    }

    fn orchestrator(source: TableSource, launcher: Arc<FakeLauncher>) -> Orchestrator {
        let resolver = Arc::new(PriceResolver::new(Arc::new(source), test_scraper()));
        Orchestrator::new(resolver, launcher, SheetsConfig::default(), false)
    }

    fn api_source() -> TableSource {
        TableSource {
            quotes: HashMap::from([(
                "AAAAAAAAAA".to_string(),
                Quote::new(Some(30.0), Some(40.0), false, None),
            )]),
            ..Default::default()
        }
    }

    fn scraping_launcher() -> Arc<FakeLauncher> {
        Arc::new(FakeLauncher {
            pages: HashMap::from([(LINK_B.to_string(), ("$28.00".to_string(), "$28.00".to_string()))]),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_api_and_scrape_mix_picks_scraped_winner() {
        let launcher = scraping_launcher();
        let orchestrator = orchestrator(api_source(), launcher.clone());
        let store = MemorySheets::new()
            .with_range("Links!A1:Z", vec![vec![LINK_A, LINK_B]])
            .with_range(
                "2022!A1:Z",
                vec![vec!["", r#"=HYPERLINK("https://old", "Widget")"#]],
            );

        let summary = orchestrator.run(&store).await.unwrap();
        assert_eq!(
            summary,
            RunSummary {
                groups: 1,
                links: 2,
                winners: 1,
            }
        );

        let updates = store.updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].0, "2022!B1:G");
        let row = &updates[0].1[0];
        assert_eq!(
            row[0],
            json!(format!("=HYPERLINK(\"{}\", \"Widget\")", LINK_B))
        );
        assert_eq!(row[5], json!(28.0));

        let appends = store.appends();
        assert_eq!(appends.len(), 1);
        assert_eq!(appends[0].0, "Log!A2:E");
        assert_eq!(appends[0].1[0][2], json!(28.0));
        assert_eq!(appends[0].1[0][3], json!(false));

        assert_eq!(launcher.launches.load(Ordering::SeqCst), 1);
        assert_eq!(launcher.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_group_without_winner_keeps_row_alignment() {
        let launcher = scraping_launcher();
        let orchestrator = orchestrator(api_source(), launcher.clone());
        let store = MemorySheets::new()
            .with_range(
                "Links!A1:Z",
                vec![
                    vec!["https://example.com/nope", "https://www.amazon.com/dp/ZZZZZZZZZZ"],
                    vec![LINK_A],
                ],
            )
            .with_range("2022!A1:Z", vec![vec!["", "First"], vec!["", "Second"]]);

        let summary = orchestrator.run(&store).await.unwrap();
        assert_eq!(summary.winners, 1);

        let rows = &store.updates()[0].1;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], vec![json!(""); 6]);
        assert_eq!(rows[1][5], json!(30.0));
        assert_eq!(store.appends()[0].1.len(), 1);
    }

    #[tokio::test]
    async fn test_session_closed_once_when_every_link_fails() {
        let launcher = Arc::new(FakeLauncher::default());
        let orchestrator = orchestrator(TableSource::default(), launcher.clone());
        let groups = vec![
            ProductGroup {
                index: 0,
                display_name: "A".into(),
                links: vec![LINK_A.into(), LINK_B.into()],
            },
            ProductGroup {
                index: 1,
                display_name: "B".into(),
                links: vec!["garbage".into()],
            },
        ];

        let selections = orchestrator.price_groups(&groups).await.unwrap();
        assert_eq!(selections, vec![SelectionResult::NoWinner, SelectionResult::NoWinner]);
        assert_eq!(launcher.launches.load(Ordering::SeqCst), 1);
        assert_eq!(launcher.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_session_closed_on_fatal_error() {
        let launcher = scraping_launcher();
        let source = TableSource {
            config_error_for: Some("AAAAAAAAAA".into()),
            ..Default::default()
        };
        let orchestrator = orchestrator(source, launcher.clone());
        let groups = vec![
            ProductGroup {
                index: 3,
                display_name: "B".into(),
                links: vec![LINK_B.into()],
            },
            ProductGroup {
                index: 4,
                display_name: "A".into(),
                links: vec![LINK_A.into()],
            },
        ];

        let err = orchestrator.price_groups(&groups).await.unwrap_err();
        match err {
            PricefloorError::Group { index, link, .. } => {
                assert_eq!(index, 4);
                assert_eq!(link, LINK_A);
            }
            other => panic!("unexpected error {other}"),
        }
        assert_eq!(launcher.launches.load(Ordering::SeqCst), 1);
        assert_eq!(launcher.closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_api_priced_run_never_starts_browser() {
        let launcher = Arc::new(FakeLauncher::default());
        let orchestrator = orchestrator(api_source(), launcher.clone());
        let groups = vec![ProductGroup {
            index: 0,
            display_name: "A".into(),
            links: vec![LINK_A.into(), "https://example.com/nope".into()],
        }];

        let selections = orchestrator.price_groups(&groups).await.unwrap();
        assert!(matches!(selections[0], SelectionResult::Winner { .. }));
        assert_eq!(launcher.launches.load(Ordering::SeqCst), 0);
        assert_eq!(launcher.closes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_browser_launch_failure_aborts_run() {
        let launcher = Arc::new(FakeLauncher {
            fail_launch: true,
            ..Default::default()
        });
        let orchestrator = orchestrator(TableSource::default(), launcher.clone());
        let groups = vec![ProductGroup {
            index: 0,
            display_name: "B".into(),
            links: vec![LINK_B.into(), LINK_A.into()],
        }];

        let err = orchestrator.price_groups(&groups).await.unwrap_err();
        assert!(matches!(err, PricefloorError::Browser(_)));
        assert_eq!(launcher.launches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_links_table_skips_session() {
        let launcher = Arc::new(FakeLauncher::default());
        let orchestrator = orchestrator(api_source(), launcher.clone());
        let store = MemorySheets::new();

        assert_eq!(orchestrator.run(&store).await.unwrap(), RunSummary::default());
        assert_eq!(launcher.launches.load(Ordering::SeqCst), 0);
        assert!(store.updates().is_empty());
    }

    #[tokio::test]
    async fn test_test_mode_targets_test_sheet() {
        let resolver = Arc::new(PriceResolver::new(Arc::new(api_source()), test_scraper()));
        let orchestrator = Orchestrator::new(
            resolver,
            Arc::new(FakeLauncher::default()),
            SheetsConfig::default(),
            true,
        );
        let store = MemorySheets::new()
            .with_range("Links!A1:Z", vec![vec![LINK_A]])
            .with_range("2022Copy!A1:Z", vec![vec!["", "Widget"]]);

        orchestrator.run(&store).await.unwrap();
        assert_eq!(store.updates()[0].0, "2022Copy!B1:G");
        assert_eq!(store.appends()[0].1[0][3], json!(true));
    }

    #[tokio::test]
    async fn test_auth_retry_once_then_succeeds() {
        let attempts = AtomicUsize::new(0);
        let discards = AtomicUsize::new(0);

        let result = run_with_auth_retry(
            || async {
                if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(PricefloorError::AuthInvalidated("expired".into()))
                } else {
                    Ok(7)
                }
            },
            || {
                discards.fetch_add(1, Ordering::SeqCst);
                Ok(())
            },
        )
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        assert_eq!(discards.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_auth_retry_gives_up_after_second_failure() {
        let attempts = AtomicUsize::new(0);

        let result: Result<()> = run_with_auth_retry(
            || async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(PricefloorError::AuthInvalidated("revoked".into()))
            },
            || Ok(()),
        )
        .await;

        assert!(result.unwrap_err().is_auth_invalidated());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_other_errors_not_retried() {
        let attempts = AtomicUsize::new(0);

        let result: Result<()> = run_with_auth_retry(
            || async {
                attempts.fetch_add(1, Ordering::SeqCst);
                Err(PricefloorError::Config("bad".into()))
            },
            || panic!("discard must not run"),
        )
        .await;

        assert!(matches!(result, Err(PricefloorError::Config(_))));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
