use std::future::Future;
use std::ops::RangeInclusive;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tower::Service;
use tracing::info;

use crate::crawl::{CrawlResult, Crawler};
use crate::error::ScraperError;
use crate::results::ResultType;
use crate::traits::Renderer;

/// One crawl task: a result type over one or more seasons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlRequest {
    pub years: Vec<u16>,
    pub result_type: ResultType,
}

impl CrawlRequest {
    pub fn new(result_type: ResultType) -> Self {
        Self {
            years: Vec::new(),
            result_type,
        }
    }

    pub fn with_year(mut self, year: u16) -> Self {
        self.years = vec![year];
        self
    }

    pub fn with_years(mut self, years: RangeInclusive<u16>) -> Self {
        self.years = years.collect();
        self
    }
}

/// tower::Service front for the crawler; each call runs one crawl task.
pub struct CrawlService<R> {
    crawler: Arc<Crawler<R>>,
}

impl<R> Clone for CrawlService<R> {
    fn clone(&self) -> Self {
        Self {
            crawler: Arc::clone(&self.crawler),
        }
    }
}

impl<R: Renderer> CrawlService<R> {
    pub fn new(crawler: Crawler<R>) -> Self {
        Self {
            crawler: Arc::new(crawler),
        }
    }

    pub fn crawler(&self) -> &Crawler<R> {
        &self.crawler
    }
}

impl<R: Renderer + 'static> Service<CrawlRequest> for CrawlService<R> {
    type Response = CrawlResult;
    type Error = ScraperError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: CrawlRequest) -> Self::Future {
        info!(
            "Crawl request received: {} for years {:?}",
            req.result_type, req.years
        );

        let crawler = Arc::clone(&self.crawler);
        Box::pin(async move {
            if req.years.is_empty() {
                return Err(ScraperError::Config(format!(
                    "no years requested for {}",
                    req.result_type
                )));
            }
            Ok(crawler.crawl(&req.years, req.result_type).await)
        })
    }
}
