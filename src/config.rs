use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::ScraperError;

/// How crawled records are grouped into output files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputLayout {
    /// One crawl task and one file per (year, result type): `f1_2023_race.csv`.
    PerYear,
    /// One crawl task and one file per result type: `f1_2015-2024_race.csv`.
    AllYears,
}

/// CSS selectors for the parts of the results archive the parsers look at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Table on the yearly overview page that lists the races.
    pub overview_table: String,
    /// Result table selectors, tried in order (older markup first).
    pub data_tables: Vec<String>,
    /// Page heading carrying the race name and year.
    pub title: String,
    /// Element a result page must contain before it counts as rendered.
    pub default_wait: String,
    pub first_name: String,
    pub last_name: String,
    pub code: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            overview_table: "table.f1-table.f1-table-with-data".to_string(),
            data_tables: vec![
                "table.resultsarchive-table".to_string(),
                "table.f1-table.f1-table-with-data".to_string(),
            ],
            title: "h1.ResultsArchiveTitle, h1.f1-heading".to_string(),
            default_wait: "footer".to_string(),
            first_name: "span.hide-for-mobile".to_string(),
            last_name: "span.hide-for-tablet".to_string(),
            code: "span.hide-for-desktop".to_string(),
        }
    }
}

/// Immutable crawl configuration, built once and handed to the crawler,
/// the parsers and the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    pub base_url: String,
    pub results_path: String,
    pub start_year: u16,
    pub end_year: u16,
    pub output_dir: PathBuf,
    pub output_layout: OutputLayout,
    pub max_requests_per_type: usize,
    pub request_delay: Duration,
    pub wait_timeout: Duration,
    pub headless: bool,
    pub chrome_executable: Option<PathBuf>,
    pub selectors: SelectorConfig,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.formula1.com".to_string(),
            results_path: "/en/results.html".to_string(),
            start_year: 2015,
            end_year: 2024,
            output_dir: PathBuf::from("f1_results_by_type_simple"),
            output_layout: OutputLayout::PerYear,
            max_requests_per_type: 500,
            request_delay: Duration::from_secs(2),
            wait_timeout: Duration::from_secs(30),
            headless: true,
            chrome_executable: None,
            selectors: SelectorConfig::default(),
        }
    }
}

impl CrawlConfig {
    /// Load a configuration from a JSON file. Missing keys keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ScraperError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)
            .map_err(|e| ScraperError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_years(mut self, start_year: u16, end_year: u16) -> Self {
        self.start_year = start_year;
        self.end_year = end_year;
        self
    }

    pub fn with_output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = path.into();
        self
    }

    pub fn with_output_layout(mut self, layout: OutputLayout) -> Self {
        self.output_layout = layout;
        self
    }

    pub fn with_max_requests_per_type(mut self, max: usize) -> Self {
        self.max_requests_per_type = max;
        self
    }

    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    pub fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = timeout;
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    pub fn with_chrome_executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.chrome_executable = Some(path.into());
        self
    }

    pub fn years(&self) -> RangeInclusive<u16> {
        self.start_year..=self.end_year
    }

    /// `https://www.formula1.com/en/results.html`
    pub fn results_base_url(&self) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            self.results_path
        )
    }

    pub fn overview_url(&self, year: u16) -> String {
        format!("{}/{}/races.html", self.results_base_url(), year)
    }

    /// Host that discovered race links must live on.
    pub fn allowed_host(&self) -> Result<String, ScraperError> {
        Url::parse(&self.base_url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .ok_or_else(|| ScraperError::Config(format!("base_url has no host: {}", self.base_url)))
    }

    pub fn validate(&self) -> Result<(), ScraperError> {
        self.allowed_host()?;
        if self.start_year > self.end_year {
            return Err(ScraperError::Config(format!(
                "start_year {} is after end_year {}",
                self.start_year, self.end_year
            )));
        }
        if self.selectors.data_tables.is_empty() {
            return Err(ScraperError::Config(
                "at least one data table selector is required".to_string(),
            ));
        }
        Ok(())
    }
}
