//! Race link discovery on yearly overview pages.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use tracing::{debug, warn};
use url::Url;

use crate::config::CrawlConfig;
use crate::error::ScraperError;
use crate::parse::compile_selector;
use crate::results::{RaceTarget, ResultType};

/// `.../results[.html]/{year}/races/{race_id}/{location}`
static RACE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/results(?:\.html)?/(\d{4})/races/(\d+)/([^/?#]+)").expect("valid race link regex")
});

/// Finds the races of one season on its overview page.
#[derive(Debug)]
pub struct RaceLinkDiscovery {
    overview_table: Selector,
    anchor: Selector,
    allowed_host: String,
    results_base_url: String,
}

impl RaceLinkDiscovery {
    pub fn new(config: &CrawlConfig) -> Result<Self, ScraperError> {
        Ok(Self {
            overview_table: compile_selector(&config.selectors.overview_table)?,
            anchor: compile_selector("a[href]")?,
            allowed_host: config.allowed_host()?,
            results_base_url: config.results_base_url(),
        })
    }

    /// Canonical `result_type` URLs for every race of `year` linked from the
    /// overview table, sorted by race id.
    ///
    /// Returns `None` when the overview table is missing. Duplicate links
    /// are kept; the crawler skips URLs it has already visited.
    pub fn discover(
        &self,
        html: &str,
        overview_url: &str,
        year: u16,
        result_type: ResultType,
    ) -> Option<Vec<RaceTarget>> {
        let base = match Url::parse(overview_url) {
            Ok(base) => base,
            Err(e) => {
                warn!("Bad overview url {}: {}", overview_url, e);
                return None;
            }
        };

        let doc = Html::parse_document(html);
        let table = doc.select(&self.overview_table).next()?;
        let year = year.to_string();

        let mut targets = Vec::new();
        for href in table
            .select(&self.anchor)
            .filter_map(|a| a.value().attr("href"))
        {
            let Ok(link) = base.join(href) else {
                continue;
            };
            if link.host_str() != Some(self.allowed_host.as_str()) {
                continue;
            }
            let Some(caps) = RACE_LINK.captures(link.as_str()) else {
                continue;
            };
            let (link_year, race_id, location) = (&caps[1], &caps[2], &caps[3]);
            if link_year != year {
                debug!("Skipping {} race link: {}", link_year, link);
                continue;
            }
            let race_id_num = match race_id.parse::<u32>() {
                Ok(id) => id,
                Err(_) => {
                    warn!("Bad race id '{}' in {}", race_id, link);
                    continue;
                }
            };
            targets.push(RaceTarget {
                race_id: race_id_num,
                url: format!(
                    "{}/{}/races/{}/{}{}",
                    self.results_base_url,
                    link_year,
                    race_id,
                    location,
                    result_type.url_suffix()
                ),
            });
        }

        targets.sort_by_key(|t| t.race_id);
        Some(targets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OVERVIEW_URL: &str = "https://www.formula1.com/en/results.html/2020/races.html";

    fn overview(links: &[&str]) -> String {
        let rows: String = links
            .iter()
            .map(|href| format!(r#"<tr><td><a href="{href}">Race</a></td></tr>"#))
            .collect();
        format!(r#"<table class="f1-table f1-table-with-data"><tbody>{rows}</tbody></table>"#)
    }

    fn discovery() -> RaceLinkDiscovery {
        RaceLinkDiscovery::new(&CrawlConfig::default()).unwrap()
    }

    #[test]
    fn test_links_sorted_and_filtered_by_year() {
        let html = overview(&[
            "/en/results.html/2020/races/1047/austria/race-result.html",
            "/en/results.html/2021/races/1064/bahrain/race-result.html",
            "/en/results.html/2020/races/1045/hungary/race-result.html",
        ]);
        let targets = discovery()
            .discover(&html, OVERVIEW_URL, 2020, ResultType::Qualifying)
            .unwrap();

        assert_eq!(
            targets,
            vec![
                RaceTarget {
                    race_id: 1045,
                    url: "https://www.formula1.com/en/results.html/2020/races/1045/hungary/qualifying.html"
                        .to_string(),
                },
                RaceTarget {
                    race_id: 1047,
                    url: "https://www.formula1.com/en/results.html/2020/races/1047/austria/qualifying.html"
                        .to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_foreign_hosts_and_other_links_ignored() {
        let html = overview(&[
            "https://mirror.example.com/en/results.html/2020/races/1047/austria/race-result.html",
            "/en/latest/article.html",
            "https://www.formula1.com/en/results/2020/races/1050/britain/race-result",
        ]);
        let targets = discovery()
            .discover(&html, OVERVIEW_URL, 2020, ResultType::Race)
            .unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(
            targets[0].url,
            "https://www.formula1.com/en/results.html/2020/races/1050/britain/race-result.html"
        );
    }

    #[test]
    fn test_missing_overview_table() {
        let html = r#"<a href="/en/results.html/2020/races/1047/austria/race-result.html">x</a>"#;
        assert!(discovery()
            .discover(html, OVERVIEW_URL, 2020, ResultType::Race)
            .is_none());
    }
}
