use async_trait::async_trait;
use std::time::Duration;

use crate::error::ScraperError;

/// Produces fully rendered page HTML.
///
/// The crawler treats any `Err` or empty page as "skip this URL"; it never
/// retries.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Start the underlying browser, if any.
    async fn initialize(&mut self) -> Result<(), ScraperError> {
        Ok(())
    }

    /// Load `url` and return the DOM once `wait_for_selector` is present,
    /// giving up after `timeout`.
    async fn render(
        &self,
        url: &str,
        wait_for_selector: &str,
        timeout: Duration,
    ) -> Result<String, ScraperError>;

    /// Release browser resources.
    async fn close(&mut self) -> Result<(), ScraperError> {
        Ok(())
    }
}
