use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use f1_results_scraper::{
    CrawlConfig, CrawlRequest, CrawlService, Crawler, Renderer, ResultType, ScraperError,
};
use tokio::time::Instant;
use tower::Service;

const BASE: &str = "https://www.formula1.com/en/results.html";

/// Serves canned pages and records every URL it was asked for, and when.
#[derive(Default)]
struct FakeRenderer {
    pages: HashMap<String, String>,
    calls: Mutex<Vec<String>>,
    call_times: Mutex<Vec<Instant>>,
}

impl FakeRenderer {
    fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), html.into());
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn call_times(&self) -> Vec<Instant> {
        self.call_times.lock().unwrap().clone()
    }
}

#[async_trait]
impl Renderer for FakeRenderer {
    async fn render(
        &self,
        url: &str,
        _wait_for_selector: &str,
        _timeout: Duration,
    ) -> Result<String, ScraperError> {
        self.calls.lock().unwrap().push(url.to_string());
        self.call_times.lock().unwrap().push(Instant::now());
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| ScraperError::Timeout(url.to_string()))
    }
}

fn config() -> CrawlConfig {
    CrawlConfig::default()
        .with_years(2020, 2020)
        .with_request_delay(Duration::ZERO)
}

fn overview_page(hrefs: &[&str]) -> String {
    let rows: String = hrefs
        .iter()
        .map(|href| format!(r#"<tr><td><a href="{href}">Grand Prix</a></td><td>Winner</td></tr>"#))
        .collect();
    format!(
        r#"<html><body>
        <table class="f1-table f1-table-with-data">
          <thead><tr><th>Grand Prix</th><th>Winner</th></tr></thead>
          <tbody>{rows}</tbody>
        </table></body></html>"#
    )
}

fn race_result_page(driver: &str, team: &str) -> String {
    format!(
        r#"<html><body>
        <table class="f1-table f1-table-with-data">
          <thead><tr><th>Pos</th><th>No</th><th>Driver</th><th>Team</th><th>Laps</th><th>Time</th><th>Pts</th></tr></thead>
          <tbody>
            <tr><td>1</td><td>44</td><td>{driver}</td><td>{team}</td><td>71</td><td>1:30:55.739</td><td>25</td></tr>
            <tr><td colspan="7">Note: provisional classification</td></tr>
          </tbody>
        </table>
        <footer></footer></body></html>"#
    )
}

fn race_url(id: u32, location: &str) -> String {
    format!("{BASE}/2020/races/{id}/{location}/race-result.html")
}

#[tokio::test]
async fn test_crawl_filters_year_and_orders_by_race_id() {
    let overview = overview_page(&[
        "/en/results.html/2020/races/1047/austria/race-result.html",
        "/en/results.html/2021/races/1064/bahrain/race-result.html",
        "/en/results.html/2020/races/1045/styria/race-result.html",
        "/en/results.html/2020/races/1047/austria/race-result.html",
    ]);
    let renderer = Arc::new(
        FakeRenderer::default()
            .with_page(format!("{BASE}/2020/races.html"), overview)
            .with_page(race_url(1045, "styria"), race_result_page("Lewis Hamilton HAM", "Mercedes"))
            .with_page(race_url(1047, "austria"), race_result_page("Valtteri Bottas BOT", "Mercedes")),
    );

    let crawler = Crawler::new(config(), Arc::clone(&renderer)).unwrap();
    let result = crawler.crawl(&[2020], ResultType::Race).await;

    assert_eq!(
        renderer.calls(),
        vec![
            format!("{BASE}/2020/races.html"),
            race_url(1045, "styria"),
            race_url(1047, "austria"),
        ]
    );
    assert_eq!(result.requests_made, 3);
    assert_eq!(result.records.len(), 2);

    let first = &result.records[0];
    assert_eq!(first.race_id, "1045");
    assert_eq!(first.race_name, "Styria Grand Prix");
    assert_eq!(first.get("driver_code"), Some("HAM"));
    assert_eq!(result.records[1].get("driver_name"), Some("Valtteri Bottas"));
    assert!(result.records.iter().all(|r| r.year == "2020"));
}

#[tokio::test]
async fn test_failed_fetch_is_skipped() {
    let overview = overview_page(&[
        "/en/results.html/2020/races/1045/styria/race-result.html",
        "/en/results.html/2020/races/1046/hungary/race-result.html",
    ]);
    let renderer = Arc::new(
        FakeRenderer::default()
            .with_page(format!("{BASE}/2020/races.html"), overview)
            .with_page(race_url(1046, "hungary"), race_result_page("Lewis Hamilton HAM", "Mercedes")),
    );

    let crawler = Crawler::new(config(), Arc::clone(&renderer)).unwrap();
    let result = crawler.crawl(&[2020], ResultType::Race).await;

    assert_eq!(renderer.calls().len(), 3);
    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0].race_id, "1046");
}

#[tokio::test]
async fn test_request_cap_is_respected() {
    let overview = overview_page(&[
        "/en/results.html/2020/races/1045/styria/race-result.html",
        "/en/results.html/2020/races/1046/hungary/race-result.html",
        "/en/results.html/2020/races/1047/britain/race-result.html",
    ]);
    let renderer = Arc::new(
        FakeRenderer::default()
            .with_page(format!("{BASE}/2020/races.html"), overview)
            .with_page(race_url(1045, "styria"), race_result_page("Lewis Hamilton HAM", "Mercedes"))
            .with_page(race_url(1046, "hungary"), race_result_page("Lewis Hamilton HAM", "Mercedes"))
            .with_page(race_url(1047, "britain"), race_result_page("Lewis Hamilton HAM", "Mercedes")),
    );

    let crawler = Crawler::new(config().with_max_requests_per_type(2), Arc::clone(&renderer)).unwrap();
    let result = crawler.crawl(&[2020], ResultType::Race).await;

    assert_eq!(renderer.calls().len(), 2);
    assert_eq!(result.requests_made, 2);
    assert_eq!(result.records.len(), 1);
    assert_eq!(result.records[0].race_id, "1045");
}

#[tokio::test]
async fn test_missing_overview_skips_year() {
    let renderer = Arc::new(
        FakeRenderer::default()
            .with_page(format!("{BASE}/2021/races.html"), overview_page(&[])),
    );

    let crawler = Crawler::new(config().with_years(2020, 2021), Arc::clone(&renderer)).unwrap();
    let result = crawler.crawl(&[2020, 2021], ResultType::Qualifying).await;

    assert_eq!(
        renderer.calls(),
        vec![format!("{BASE}/2020/races.html"), format!("{BASE}/2021/races.html")]
    );
    assert!(result.records.is_empty());
}

#[tokio::test]
async fn test_pit_stop_task_uses_pit_stop_parser() {
    let overview = overview_page(&["/en/results.html/2020/races/1045/styria/race-result.html"]);
    let pit_page = r#"<table class="resultsarchive-table"><tbody>
        <tr><td>1</td><td>33</td><td>Max Verstappen VER</td><td>Red Bull Racing Honda</td><td>26</td><td>15:49:02</td><td>21.813</td></tr>
        <tr><td>1</td><td>33</td><td>Max Verstappen VER</td><td>Red Bull Racing Honda</td><td>26</td><td>15:49:02</td></tr>
        </tbody></table>"#;
    let renderer = Arc::new(
        FakeRenderer::default()
            .with_page(format!("{BASE}/2020/races.html"), overview)
            .with_page(format!("{BASE}/2020/races/1045/styria/pit-stop-summary.html"), pit_page),
    );

    let crawler = Crawler::new(config(), Arc::clone(&renderer)).unwrap();
    let result = crawler.crawl(&[2020], ResultType::PitStop).await;

    assert_eq!(result.records.len(), 1);
    let record = &result.records[0];
    assert_eq!(record.result_type, ResultType::PitStop);
    assert_eq!(record.get("pit_time"), Some("21.813"));
    assert_eq!(record.get("total_pit_time"), Some(""));
}

#[tokio::test]
async fn test_service_runs_one_task() {
    let overview = overview_page(&["/en/results.html/2020/races/1045/styria/race-result.html"]);
    let renderer = Arc::new(
        FakeRenderer::default()
            .with_page(format!("{BASE}/2020/races.html"), overview)
            .with_page(race_url(1045, "styria"), race_result_page("Lewis Hamilton HAM", "Mercedes")),
    );

    let mut service = CrawlService::new(Crawler::new(config(), renderer).unwrap());
    let result = service
        .call(CrawlRequest::new(ResultType::Race).with_year(2020))
        .await
        .unwrap();
    assert_eq!(result.result_type, ResultType::Race);
    assert_eq!(result.years, vec![2020]);
    assert_eq!(result.records.len(), 1);

    let empty = service.call(CrawlRequest::new(ResultType::Race)).await;
    assert!(matches!(empty, Err(ScraperError::Config(_))));
}

#[tokio::test(start_paused = true)]
async fn test_request_delay_between_fetches_only() {
    let delay = Duration::from_secs(2);
    let overview = overview_page(&[
        "/en/results.html/2020/races/1045/styria/race-result.html",
        "/en/results.html/2020/races/1046/hungary/race-result.html",
    ]);
    let renderer = Arc::new(
        FakeRenderer::default()
            .with_page(format!("{BASE}/2020/races.html"), overview)
            .with_page(race_url(1045, "styria"), race_result_page("Lewis Hamilton HAM", "Mercedes")),
    );

    let crawler = Crawler::new(config().with_request_delay(delay), Arc::clone(&renderer)).unwrap();
    let started = Instant::now();
    let result = crawler.crawl(&[2020], ResultType::Race).await;

    // The failed hungary fetch still waits its turn.
    let times = renderer.call_times();
    assert_eq!(result.requests_made, 3);
    assert_eq!(times.len(), 3);
    assert_eq!(times[0], started);
    assert_eq!(times[1] - times[0], delay);
    assert_eq!(times[2] - times[1], delay);
}
