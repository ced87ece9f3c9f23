//! Year, race name and race id recovery from the URL and page heading.

use std::sync::LazyLock;

use regex::Regex;
use scraper::Html;
use tracing::trace;

use super::{stripped_text, title_case, ResultParser};
use crate::results::RaceMetadata;

const UNKNOWN: &str = "Unknown";
const UNKNOWN_RACE: &str = "Unknown Race";

/// `.../results[.html]/{year}/races/{race_id}/{location}/...`
static RACE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"/results(?:\.html)?/(\d{4})/races/(\d+)/([^/]+)/").expect("valid race url regex")
});

static ANY_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/(\d{4})/").expect("valid year regex"));

/// Free-text race name followed by an optional "GRAND PRIX" and a year.
static HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^.*?([\w\s-]+?)\s*(?:GRAND PRIX)?\s*(\d{4})").expect("valid heading regex")
});

static SESSION_WORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:Race Result|Fastest Laps|Qualifying|Practice\s*\d|Starting Grid|Pit Stop Summary)\b",
    )
    .expect("valid session keyword regex")
});

/// What the URL alone says about the race.
#[derive(Debug, Default)]
struct UrlParts {
    year: Option<String>,
    race_id: Option<String>,
    location: Option<String>,
}

impl UrlParts {
    fn parse(url: &str) -> Self {
        if let Some(caps) = RACE_URL.captures(url) {
            return Self {
                year: Some(caps[1].to_string()),
                race_id: Some(caps[2].to_string()),
                location: Some(caps[3].to_string()),
            };
        }
        Self {
            year: ANY_YEAR.captures(url).map(|caps| caps[1].to_string()),
            ..Default::default()
        }
    }
}

/// Inputs available to the race-name sources.
struct NameSources<'a> {
    url: &'a UrlParts,
    heading: Option<&'a str>,
    /// (race name, year) split out of the heading by `HEADING`.
    heading_split: Option<(String, String)>,
}

type NameSource = fn(&NameSources<'_>) -> Option<String>;

/// Race name sources in priority order; the first usable name wins.
const RACE_NAME_SOURCES: [(&str, NameSource); 3] = [
    ("heading", heading_name),
    ("stripped_heading", stripped_heading_name),
    ("location", location_name),
];

impl ResultParser {
    /// Recover `(year, race_name, race_id)` for a result page.
    ///
    /// The URL is tried first, the page heading refines it, and anything
    /// still missing falls back to `"Unknown"` / `"Unknown Race"`.
    pub fn extract_metadata(&self, doc: &Html, url: &str) -> RaceMetadata {
        let url_parts = UrlParts::parse(url);
        let heading = doc.select(&self.selectors.title).next().map(stripped_text);
        let heading_split = heading.as_deref().and_then(split_heading);

        let sources = NameSources {
            url: &url_parts,
            heading: heading.as_deref(),
            heading_split,
        };

        let race_name = RACE_NAME_SOURCES
            .iter()
            .find_map(|(label, source)| {
                let name = source(&sources).filter(|name| is_usable_name(name))?;
                trace!("race name from {}: {}", label, name);
                Some(name)
            })
            .unwrap_or_else(|| UNKNOWN_RACE.to_string());

        let year = sources
            .heading_split
            .as_ref()
            .map(|(_, year)| year.clone())
            .or_else(|| url_parts.year.clone())
            .unwrap_or_else(|| UNKNOWN.to_string());

        RaceMetadata {
            year,
            race_name,
            race_id: url_parts.race_id.unwrap_or_else(|| UNKNOWN.to_string()),
        }
    }
}

fn split_heading(heading: &str) -> Option<(String, String)> {
    let caps = HEADING.captures(heading)?;
    Some((caps[1].trim().to_string(), caps[2].to_string()))
}

fn is_usable_name(name: &str) -> bool {
    !name.is_empty() && name != UNKNOWN && !name.eq_ignore_ascii_case("results")
}

fn heading_name(src: &NameSources<'_>) -> Option<String> {
    let (name, _) = src.heading_split.as_ref()?;
    (name.chars().count() > 3).then(|| title_case(name))
}

/// Only when the heading did not split and the URL already gave a year:
/// strip the year, branding and session words and keep what remains.
fn stripped_heading_name(src: &NameSources<'_>) -> Option<String> {
    if src.heading_split.is_some() {
        return None;
    }
    let heading = src.heading?;
    let year = src.url.year.as_deref()?;

    let cleaned = heading
        .replace(year, "")
        .replace("FORMULA 1", "")
        .replace("GRAND PRIX", "");
    let cleaned = cleaned.trim_matches(|c: char| c == ' ' || c == '-').trim();
    let cleaned = SESSION_WORDS.replace_all(cleaned, "");
    let cleaned = cleaned.trim();

    (!cleaned.is_empty()).then(|| title_case(cleaned))
}

fn location_name(src: &NameSources<'_>) -> Option<String> {
    src.url
        .location
        .as_deref()
        .map(|slug| format!("{} Grand Prix", title_case(&slug.replace('-', " "))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CrawlConfig;

    fn extract(html: &str, url: &str) -> RaceMetadata {
        let parser = ResultParser::new(&CrawlConfig::default()).unwrap();
        parser.extract_metadata(&Html::parse_document(html), url)
    }

    fn meta(year: &str, race_name: &str, race_id: &str) -> RaceMetadata {
        RaceMetadata {
            year: year.to_string(),
            race_name: race_name.to_string(),
            race_id: race_id.to_string(),
        }
    }

    #[test]
    fn test_url_only() {
        let got = extract(
            "<html><body><p>no heading</p></body></html>",
            "https://www.formula1.com/en/results/2022/races/3/monaco/race-result.html",
        );
        assert_eq!(got, meta("2022", "Monaco Grand Prix", "3"));
    }

    #[test]
    fn test_hyphenated_location() {
        let got = extract(
            "",
            "https://www.formula1.com/en/results.html/2021/races/1066/emilia-romagna/qualifying.html",
        );
        assert_eq!(got, meta("2021", "Emilia Romagna Grand Prix", "1066"));
    }

    #[test]
    fn test_heading_only() {
        let got = extract(
            r#"<h1 class="f1-heading">AUSTRIAN GRAND PRIX 2021</h1>"#,
            "https://example.com/some/page",
        );
        assert_eq!(got, meta("2021", "Austrian", "Unknown"));
    }

    #[test]
    fn test_heading_overrides_url_name() {
        let got = extract(
            r#"<h1 class="ResultsArchiveTitle">Monaco Grand Prix 2022 - Race Result</h1>"#,
            "https://www.formula1.com/en/results.html/2022/races/1110/monaco/race-result.html",
        );
        assert_eq!(got, meta("2022", "Monaco", "1110"));
    }

    #[test]
    fn test_short_heading_name_keeps_url_name() {
        let got = extract(
            r#"<h1 class="f1-heading">GP 2023</h1>"#,
            "https://www.formula1.com/en/results.html/2023/races/1141/bahrain/race-result.html",
        );
        assert_eq!(got, meta("2023", "Bahrain Grand Prix", "1141"));
    }

    #[test]
    fn test_stripped_heading_when_no_year_in_heading() {
        let got = extract(
            r#"<h1 class="f1-heading">FORMULA 1 SILVERSTONE GRAND PRIX Qualifying</h1>"#,
            "https://www.formula1.com/en/results/2019/unknown",
        );
        assert_eq!(got, meta("2019", "Silverstone", "Unknown"));
    }

    #[test]
    fn test_results_heading_falls_back() {
        let got = extract(r#"<h1 class="f1-heading">RESULTS</h1>"#, "https://example.com/2020/x");
        assert_eq!(got, meta("2020", "Unknown Race", "Unknown"));
    }

    #[test]
    fn test_nothing_known() {
        assert_eq!(
            extract("<p>hello</p>", "not a url"),
            meta("Unknown", "Unknown Race", "Unknown")
        );
    }
}
