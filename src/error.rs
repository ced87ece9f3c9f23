use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("browser initialization failed: {0}")]
    BrowserInit(String),

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("timed out: {0}")]
    Timeout(String),

    #[error("element not found: {0}")]
    ElementNotFound(String),

    #[error("rendered page is empty: {0}")]
    EmptyPage(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("csv write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("file operation failed: {0}")]
    FileIO(#[from] std::io::Error),
}
