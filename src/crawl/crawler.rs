//! Crawl orchestration for one result type across one or more seasons.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::discovery::RaceLinkDiscovery;
use crate::config::CrawlConfig;
use crate::error::ScraperError;
use crate::parse::ResultParser;
use crate::results::{ResultRecord, ResultType};
use crate::traits::Renderer;

/// Records collected by one crawl task.
#[derive(Debug, Clone)]
pub struct CrawlResult {
    pub result_type: ResultType,
    pub years: Vec<u16>,
    pub records: Vec<ResultRecord>,
    /// Render calls issued, successful or not.
    pub requests_made: usize,
}

/// Per-task bookkeeping: visited URLs and the request budget.
struct TaskState {
    visited: HashSet<String>,
    requests_made: usize,
    max_requests: usize,
    records: Vec<ResultRecord>,
}

impl TaskState {
    fn new(max_requests: usize) -> Self {
        Self {
            visited: HashSet::new(),
            requests_made: 0,
            max_requests,
            records: Vec::new(),
        }
    }

    fn budget_exhausted(&self) -> bool {
        self.requests_made >= self.max_requests
    }
}

/// Sequential crawler: overview page, race discovery, then one result page
/// per race in race-id order. Fetches never overlap.
pub struct Crawler<R> {
    config: Arc<CrawlConfig>,
    renderer: Arc<R>,
    parser: ResultParser,
    discovery: RaceLinkDiscovery,
}

impl<R: Renderer> Crawler<R> {
    pub fn new(config: CrawlConfig, renderer: Arc<R>) -> Result<Self, ScraperError> {
        config.validate()?;
        let parser = ResultParser::new(&config)?;
        let discovery = RaceLinkDiscovery::new(&config)?;
        Ok(Self {
            config: Arc::new(config),
            renderer,
            parser,
            discovery,
        })
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    pub fn parser(&self) -> &ResultParser {
        &self.parser
    }

    /// Crawl every race of `years` for one result type.
    ///
    /// Failed fetches are skipped and never retried. Once the request budget
    /// is spent the remaining races are abandoned.
    pub async fn crawl(&self, years: &[u16], result_type: ResultType) -> CrawlResult {
        let started = Instant::now();
        let mut state = TaskState::new(self.config.max_requests_per_type);
        info!(
            "Starting crawl for {} (suffix {}), years {:?}",
            result_type,
            result_type.url_suffix(),
            years
        );

        for &year in years {
            if state.budget_exhausted() {
                warn!(
                    "Request limit ({}) reached for {}. Stopping.",
                    state.max_requests, result_type
                );
                break;
            }
            self.crawl_year(&mut state, year, result_type).await;
        }

        info!(
            "Finished {}: {} rows from {} requests in {:.2}s",
            result_type,
            state.records.len(),
            state.requests_made,
            started.elapsed().as_secs_f64()
        );

        CrawlResult {
            result_type,
            years: years.to_vec(),
            records: state.records,
            requests_made: state.requests_made,
        }
    }

    async fn crawl_year(&self, state: &mut TaskState, year: u16, result_type: ResultType) {
        info!("Processing year {} for {}", year, result_type);
        let overview_url = self.config.overview_url(year);
        let overview_wait = self.config.selectors.overview_table.clone();

        let Some(overview_html) = self.fetch(state, &overview_url, &overview_wait).await else {
            warn!(
                "Failed to get overview page {}. Skipping {} for {}.",
                overview_url, year, result_type
            );
            return;
        };

        let Some(targets) = self
            .discovery
            .discover(&overview_html, &overview_url, year, result_type)
        else {
            warn!(
                "{}",
                ScraperError::ElementNotFound(format!(
                    "overview table '{}' on {}",
                    self.config.selectors.overview_table, overview_url
                ))
            );
            return;
        };
        info!(
            "Found {} race links for {} ({}), processing in race id order",
            targets.len(),
            year,
            result_type
        );

        let default_wait = self.config.selectors.default_wait.clone();
        for target in targets {
            if state.budget_exhausted() {
                warn!(
                    "Request limit ({}) reached for {}. Stopping.",
                    state.max_requests, result_type
                );
                break;
            }
            if state.visited.contains(&target.url) {
                continue;
            }
            state.visited.insert(target.url.clone());

            let Some(html) = self.fetch(state, &target.url, &default_wait).await else {
                continue;
            };

            let records = match result_type {
                ResultType::PitStop => self.parser.parse_pit_stop_summary(&html, &target.url),
                other => self.parser.parse_results_table(&html, &target.url, other),
            };
            debug!(
                "Race {}: {} {} rows",
                target.race_id,
                records.len(),
                result_type
            );
            state.records.extend(records);
        }
    }

    /// Render one page, counting it against the budget. A fixed delay
    /// separates consecutive fetches of a task.
    async fn fetch(&self, state: &mut TaskState, url: &str, wait_for: &str) -> Option<String> {
        if state.requests_made > 0 && !self.config.request_delay.is_zero() {
            sleep(self.config.request_delay).await;
        }
        state.requests_made += 1;
        debug!(
            "Fetching {} (wait for '{}', timeout {}s)",
            url,
            wait_for,
            self.config.wait_timeout.as_secs()
        );

        match self
            .renderer
            .render(url, wait_for, self.config.wait_timeout)
            .await
        {
            Ok(html) if !html.trim().is_empty() => Some(html),
            Ok(_) => {
                warn!("{}", ScraperError::EmptyPage(url.to_string()));
                None
            }
            Err(e) => {
                warn!("Fetch failed for {}: {}", url, e);
                None
            }
        }
    }
}
