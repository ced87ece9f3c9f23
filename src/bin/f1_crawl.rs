//! Full results crawl: every season in the configured range, every result
//! type, one CSV per task.
//!
//! No flags. Defaults come from `CrawlConfig::default()`; point
//! `F1_CRAWL_CONFIG` at a JSON file to override them.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use f1_results_scraper::{
    output, ChromeRenderer, CrawlConfig, CrawlRequest, CrawlService, Crawler, OutputLayout,
    Renderer, ResultType, ScraperError,
};
use futures::future::poll_fn;
use tower::Service;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const CONFIG_ENV: &str = "F1_CRAWL_CONFIG";

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,f1_results_scraper=debug")),
        )
        .init();

    match run().await {
        Ok(total) => {
            info!("All scraping tasks finished: {} rows total", total);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Crawl aborted: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config() -> Result<CrawlConfig, ScraperError> {
    match std::env::var(CONFIG_ENV) {
        Ok(path) => {
            info!("Loading configuration from {}", path);
            CrawlConfig::from_json_file(path)
        }
        Err(_) => Ok(CrawlConfig::default()),
    }
}

/// Year groups that each become one crawl task per result type.
fn year_batches(config: &CrawlConfig) -> Vec<Vec<u16>> {
    match config.output_layout {
        OutputLayout::PerYear => config.years().map(|year| vec![year]).collect(),
        OutputLayout::AllYears => vec![config.years().collect()],
    }
}

async fn run() -> Result<usize, ScraperError> {
    let config = load_config()?;
    config.validate()?;
    info!(
        "F1 results scraper: years {}-{}, output {}, headless {}, timeout {}s",
        config.start_year,
        config.end_year,
        config.output_dir.display(),
        config.headless,
        config.wait_timeout.as_secs()
    );

    let started = Instant::now();
    let mut renderer = ChromeRenderer::new(&config);
    renderer.initialize().await?;
    let renderer = Arc::new(renderer);

    let mut service = CrawlService::new(Crawler::new(config.clone(), Arc::clone(&renderer))?);
    let mut total_rows = 0;

    for years in year_batches(&config) {
        let batch_started = Instant::now();
        let mut batch_rows = 0;

        for result_type in ResultType::ALL {
            poll_fn(|cx| service.poll_ready(cx)).await?;
            let request = CrawlRequest {
                years: years.clone(),
                result_type,
            };
            let result = service.call(request).await?;

            let path = config
                .output_dir
                .join(output::file_name(&years, result_type));
            if let Err(e) = output::write_records(&result.records, &path) {
                error!("Failed to save {}: {}", path.display(), e);
            }
            batch_rows += result.records.len();
        }

        info!(
            "Finished years {:?}: {} rows in {:.2}s",
            years,
            batch_rows,
            batch_started.elapsed().as_secs_f64()
        );
        total_rows += batch_rows;
    }

    drop(service);
    if let Ok(mut renderer) = Arc::try_unwrap(renderer) {
        renderer.close().await?;
    }

    info!(
        "Data in {} (total time {:.2}s)",
        config.output_dir.display(),
        started.elapsed().as_secs_f64()
    );
    Ok(total_rows)
}
