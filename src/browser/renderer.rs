//! chromiumoxide page renderer

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::config::CrawlConfig;
use crate::error::ScraperError;
use crate::traits::Renderer;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36";

/// Interval between checks for the wait selector (milliseconds)
const SELECTOR_POLL_MS: u64 = 250;

/// Renders pages in a single Chromium instance, one fresh tab per URL.
pub struct ChromeRenderer {
    headless: bool,
    chrome_executable: Option<PathBuf>,
    browser: Option<Browser>,
    handler: Option<JoinHandle<()>>,
}

impl ChromeRenderer {
    pub fn new(config: &CrawlConfig) -> Self {
        Self {
            headless: config.headless,
            chrome_executable: config.chrome_executable.clone(),
            browser: None,
            handler: None,
        }
    }

    fn chrome_path(&self) -> Option<PathBuf> {
        self.chrome_executable.clone().or_else(|| {
            std::env::var("CHROME_PATH")
                .or_else(|_| std::env::var("CHROMIUM_PATH"))
                .ok()
                .map(PathBuf::from)
        })
    }

    /// Poll until `selector` matches an element on the page.
    async fn wait_for_selector(page: &Page, selector: &str) {
        loop {
            if page.find_element(selector).await.is_ok() {
                return;
            }
            sleep(Duration::from_millis(SELECTOR_POLL_MS)).await;
        }
    }
}

#[async_trait]
impl Renderer for ChromeRenderer {
    async fn initialize(&mut self) -> Result<(), ScraperError> {
        info!("Initializing browser (headless: {})...", self.headless);

        let mut builder = BrowserConfig::builder()
            .window_size(1920, 1080)
            .no_sandbox()
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg(format!("--user-agent={}", USER_AGENT));

        if !self.headless {
            builder = builder.with_head();
        }
        if let Some(path) = self.chrome_path() {
            builder = builder.chrome_executable(path);
        }

        let browser_config = builder
            .build()
            .map_err(|e| ScraperError::BrowserInit(e.to_string()))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| ScraperError::BrowserInit(e.to_string()))?;

        self.handler = Some(tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                debug!("Browser event: {:?}", event);
            }
        }));
        self.browser = Some(browser);

        info!("Browser initialized");
        Ok(())
    }

    async fn render(
        &self,
        url: &str,
        wait_for_selector: &str,
        timeout: Duration,
    ) -> Result<String, ScraperError> {
        let browser = self
            .browser
            .as_ref()
            .ok_or_else(|| ScraperError::BrowserInit("Browser not initialized".to_string()))?;

        info!(
            "Fetching: {} (wait: '{}', timeout: {}s)",
            url,
            wait_for_selector,
            timeout.as_secs()
        );

        let page = browser
            .new_page(url)
            .await
            .map_err(|e| ScraperError::Navigation(e.to_string()))?;

        let result = match tokio::time::timeout(timeout, Self::wait_for_selector(&page, wait_for_selector)).await {
            Ok(()) => page
                .content()
                .await
                .map_err(|e| ScraperError::Navigation(e.to_string())),
            Err(_) => Err(ScraperError::Timeout(format!(
                "waiting for '{}' on {}",
                wait_for_selector, url
            ))),
        };

        if let Err(e) = page.close().await {
            debug!("Failed to close page: {}", e);
        }

        if result.is_ok() {
            debug!("Fetched {}", url);
        }
        result
    }

    async fn close(&mut self) -> Result<(), ScraperError> {
        info!("Closing browser...");

        if let Some(mut browser) = self.browser.take() {
            if let Err(e) = browser.close().await {
                debug!("Failed to close browser: {}", e);
            }
            if let Err(e) = browser.wait().await {
                debug!("Failed to wait for browser exit: {}", e);
            }
        }
        if let Some(handler) = self.handler.take() {
            handler.abort();
        }

        info!("Browser closed");
        Ok(())
    }
}
