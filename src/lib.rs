//! Formula 1 results archive scraper
//!
//! - Discovers every race of a season from the yearly overview page
//! - Renders each result page (race, fastest laps, qualifying, starting grid,
//!   pit stops, practice 1-3) in headless Chromium
//! - Normalizes the result table rows into `ResultRecord`s and writes CSV
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use f1_results_scraper::{ChromeRenderer, CrawlConfig, Crawler, Renderer, ResultType};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = CrawlConfig::default().with_years(2023, 2023);
//!
//!     let mut renderer = ChromeRenderer::new(&config);
//!     renderer.initialize().await.unwrap();
//!
//!     let crawler = Crawler::new(config, Arc::new(renderer)).unwrap();
//!     let result = crawler.crawl(&[2023], ResultType::Qualifying).await;
//!     println!("rows: {}", result.records.len());
//! }
//! ```
//!
//! Parsing works on any HTML string without a browser:
//!
//! ```rust,ignore
//! use f1_results_scraper::{CrawlConfig, ResultParser, ResultType};
//!
//! let parser = ResultParser::new(&CrawlConfig::default()).unwrap();
//! let records = parser.parse_results_table(&html, &url, ResultType::Race);
//! ```

pub mod browser;
pub mod config;
pub mod crawl;
pub mod error;
pub mod output;
pub mod parse;
pub mod results;
pub mod service;
pub mod traits;

// Re-export the main types
pub use browser::ChromeRenderer;
pub use config::{CrawlConfig, OutputLayout, SelectorConfig};
pub use crawl::{CrawlResult, Crawler, RaceLinkDiscovery};
pub use error::ScraperError;
pub use parse::{DriverIdentity, ResultParser, RowRejection};
pub use results::{
    ColumnMapping, EssentialRule, Field, RaceMetadata, RaceTarget, ResultRecord, ResultType,
    TableSchema,
};
pub use service::{CrawlRequest, CrawlService};
pub use traits::Renderer;
