//! Crawl orchestration
//!
//! For each (years, result type) task: fetch the yearly overview, discover
//! the race links, then fetch and parse every race's result page.

mod crawler;
mod discovery;

pub use crawler::{CrawlResult, Crawler};
pub use discovery::RaceLinkDiscovery;
