//! HTML result-table extraction
//!
//! `ResultParser` owns the compiled selectors and exposes the driver-cell
//! parser, the metadata extractor and the table engine shared by every
//! result type.

mod driver;
mod metadata;
mod table;

use scraper::{ElementRef, Selector};

use crate::config::CrawlConfig;
use crate::error::ScraperError;

pub use driver::DriverIdentity;
pub use table::RowRejection;

/// Selectors compiled once from `CrawlConfig::selectors`.
#[derive(Debug)]
struct CompiledSelectors {
    data_tables: Vec<Selector>,
    title: Selector,
    first_name: Selector,
    last_name: Selector,
    code: Selector,
    table: Selector,
    row: Selector,
    cell: Selector,
}

/// Turns rendered result pages into `ResultRecord`s.
///
/// Parsing never fails: missing tables, short rows and odd markup degrade
/// to fewer records or `"Unknown"` metadata.
#[derive(Debug)]
pub struct ResultParser {
    selectors: CompiledSelectors,
}

impl ResultParser {
    pub fn new(config: &CrawlConfig) -> Result<Self, ScraperError> {
        let s = &config.selectors;
        let data_tables = s
            .data_tables
            .iter()
            .map(|sel| compile_selector(sel))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            selectors: CompiledSelectors {
                data_tables,
                title: compile_selector(&s.title)?,
                first_name: compile_selector(&s.first_name)?,
                last_name: compile_selector(&s.last_name)?,
                code: compile_selector(&s.code)?,
                table: compile_selector("table")?,
                row: compile_selector("tr")?,
                cell: compile_selector("td")?,
            },
        })
    }
}

pub(crate) fn compile_selector(selector: &str) -> Result<Selector, ScraperError> {
    Selector::parse(selector)
        .map_err(|e| ScraperError::Config(format!("invalid selector '{}': {:?}", selector, e)))
}

/// Text nodes trimmed and concatenated without a separator.
pub(crate) fn stripped_text(el: ElementRef<'_>) -> String {
    el.text().map(str::trim).collect()
}

/// Text nodes trimmed, empties dropped, joined with single spaces.
pub(crate) fn spaced_text(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Full text of the first descendant matching `selector`, trimmed.
fn fragment_text(el: ElementRef<'_>, selector: &Selector) -> String {
    el.select(selector)
        .next()
        .map(|found| found.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

/// At least one cased character and no lowercase ones.
pub(crate) fn is_upper(s: &str) -> bool {
    s.chars().any(char::is_uppercase) && !s.chars().any(char::is_lowercase)
}

/// Capitalize the first letter of every alphabetic run, lowercase the rest.
pub(crate) fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for ch in s.chars() {
        if prev_alpha {
            out.extend(ch.to_lowercase());
        } else {
            out.extend(ch.to_uppercase());
        }
        prev_alpha = ch.is_alphabetic();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn test_text_helpers() {
        let doc = Html::parse_fragment("<p> Max <b> Verstappen </b>\n VER </p>");
        let sel = Selector::parse("p").unwrap();
        let p = doc.select(&sel).next().unwrap();
        assert_eq!(stripped_text(p), "MaxVerstappenVER");
        assert_eq!(spaced_text(p), "Max Verstappen VER");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("emilia romagna"), "Emilia Romagna");
        assert_eq!(title_case("AUSTRIAN"), "Austrian");
        assert_eq!(title_case("sao-paulo"), "Sao-Paulo");
    }

    #[test]
    fn test_is_upper() {
        assert!(is_upper("VER"));
        assert!(is_upper("DE1"));
        assert!(!is_upper("Ver"));
        assert!(!is_upper("123"));
    }

    #[test]
    fn test_invalid_selector_is_config_error() {
        let mut config = CrawlConfig::default();
        config.selectors.title = "h1[".to_string();
        assert!(matches!(
            ResultParser::new(&config),
            Err(ScraperError::Config(_))
        ));
    }
}
