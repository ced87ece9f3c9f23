//! Result table location, row walking and column-mapped record building.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html};
use tracing::debug;

use super::{stripped_text, ResultParser};
use crate::results::{
    EssentialRule, Field, RaceMetadata, ResultRecord, ResultType, TableSchema,
};

/// Opening and closing `table` / `tbody` tags in raw markup.
static TABLE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<(/?)(table|tbody)\b").expect("valid table tag regex"));

/// Why a table row produced no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowRejection {
    /// Summary or ad rows with fewer cells than the schema needs.
    TooFewColumns { found: usize, required: usize },
    /// Decorative or blank rows: no driver, team or qualifying key field.
    NoEssentialData,
}

impl EssentialRule {
    fn admits(&self, field: Field, value: &str) -> bool {
        if value.is_empty() {
            return false;
        }
        match (self, field) {
            (EssentialRule::Position, Field::Position) => {
                value.chars().all(|c| c.is_ascii_digit()) || value.chars().count() <= 3
            }
            (EssentialRule::PitTime, Field::PitTime) => true,
            _ => false,
        }
    }
}

impl ResultParser {
    /// Parse the result table of `result_type` out of a rendered page.
    pub fn parse_results_table(
        &self,
        html: &str,
        url: &str,
        result_type: ResultType,
    ) -> Vec<ResultRecord> {
        self.parse_table(html, url, &result_type.schema())
    }

    /// Pit stop summaries: fixed 8-column layout, 7 cells suffice.
    pub fn parse_pit_stop_summary(&self, html: &str, url: &str) -> Vec<ResultRecord> {
        self.parse_table(html, url, &TableSchema::pit_stop())
    }

    /// Shared engine: one record per accepted row of the located table.
    pub fn parse_table(&self, html: &str, url: &str, schema: &TableSchema) -> Vec<ResultRecord> {
        if html.trim().is_empty() {
            return Vec::new();
        }

        let doc = Html::parse_document(html);
        let meta = self.extract_metadata(&doc, url);

        let Some(table) = self.locate_table(&doc) else {
            debug!("No {} table found on {}", schema.result_type, url);
            return Vec::new();
        };

        let explicit_body = self
            .table_index(&doc, table)
            .is_some_and(|index| markup_has_body(html, index));

        let mut records = Vec::new();
        for (row_idx, row) in self.result_rows(table, explicit_body).into_iter().enumerate() {
            match self.parse_row(row, &meta, url, schema) {
                Ok(record) => records.push(record),
                Err(reason) => debug!(
                    "Skipping {} row {} on {} ({} columns): {:?}",
                    schema.result_type, row_idx, url, schema.columns.name, reason
                ),
            }
        }

        debug!(
            "Parsed {} {} rows from {}",
            records.len(),
            schema.result_type,
            url
        );
        records
    }

    /// First table matching the configured selectors, in priority order.
    pub(crate) fn locate_table<'a>(&self, doc: &'a Html) -> Option<ElementRef<'a>> {
        self.selectors
            .data_tables
            .iter()
            .find_map(|selector| doc.select(selector).next())
    }

    /// Position of `table` among all tables of the document, in source order.
    fn table_index(&self, doc: &Html, table: ElementRef<'_>) -> Option<usize> {
        doc.select(&self.selectors.table)
            .position(|candidate| candidate.id() == table.id())
    }

    /// Data rows of a table: the direct rows of its body section if the
    /// markup declared one, otherwise every row after the first (header).
    ///
    /// The HTML parser inserts a `tbody` around loose rows, so a parsed
    /// body only counts when `explicit_body` says the source had one.
    pub(crate) fn result_rows<'a>(
        &self,
        table: ElementRef<'a>,
        explicit_body: bool,
    ) -> Vec<ElementRef<'a>> {
        let body = table
            .children()
            .filter_map(ElementRef::wrap)
            .find(|el| el.value().name() == "tbody")
            .filter(|_| explicit_body);

        match body {
            Some(body) => body
                .children()
                .filter_map(ElementRef::wrap)
                .filter(|el| el.value().name() == "tr")
                .collect(),
            None => table.select(&self.selectors.row).skip(1).collect(),
        }
    }

    fn parse_row(
        &self,
        row: ElementRef<'_>,
        meta: &RaceMetadata,
        url: &str,
        schema: &TableSchema,
    ) -> Result<ResultRecord, RowRejection> {
        let cells: Vec<ElementRef<'_>> = row.select(&self.selectors.cell).collect();
        if cells.len() < schema.min_columns {
            return Err(RowRejection::TooFewColumns {
                found: cells.len(),
                required: schema.min_columns,
            });
        }

        let mut record = ResultRecord::new(meta, schema.result_type, url);
        let mut has_essential_data = false;

        for &(field, index) in schema.columns.columns {
            let cell = cells.get(index).copied();
            match field {
                Field::Driver => {
                    let driver = self.parse_driver_cell(cell);
                    has_essential_data |= !driver.name.is_empty() || !driver.code.is_empty();
                    record.set("driver_name", driver.name);
                    record.set("driver_code", driver.code);
                }
                Field::Team => {
                    let team = cell.map(stripped_text).unwrap_or_default();
                    has_essential_data |= !team.is_empty();
                    record.set(field.as_str(), team);
                }
                _ => {
                    let value = cell.map(stripped_text).unwrap_or_default();
                    has_essential_data |= schema.essential.admits(field, &value);
                    record.set(field.as_str(), value);
                }
            }
        }

        if has_essential_data {
            Ok(record)
        } else {
            Err(RowRejection::NoEssentialData)
        }
    }
}

/// Whether the `table_index`-th `<table>` of `html` (source order, nested
/// tables included) directly contains a literal `<tbody>` tag.
fn markup_has_body(html: &str, table_index: usize) -> bool {
    let mut tables_seen = 0;
    // Nesting depth inside the target table; 0 means not inside it.
    let mut depth = 0usize;

    for caps in TABLE_TAG.captures_iter(html) {
        let closing = !caps[1].is_empty();
        let is_table = caps[2].eq_ignore_ascii_case("table");

        if depth == 0 {
            if is_table && !closing {
                if tables_seen == table_index {
                    depth = 1;
                }
                tables_seen += 1;
            }
            continue;
        }

        match (is_table, closing) {
            (true, false) => depth += 1,
            (true, true) => {
                depth -= 1;
                if depth == 0 {
                    return false;
                }
            }
            (false, false) if depth == 1 => return true,
            _ => {}
        }
    }
    false
}
