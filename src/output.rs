//! CSV output of crawled records.

use std::fs::{self, File};
use std::path::Path;

use tracing::info;

use crate::error::ScraperError;
use crate::results::{ResultRecord, ResultType};

/// Header order for known keys; unknown keys follow in first-seen order.
pub const PREFERRED_HEADERS: [&str; 25] = [
    "year",
    "race_name",
    "race_id",
    "result_type",
    "url",
    "position",
    "driver_number",
    "driver_code",
    "driver_name",
    "team",
    "laps",
    "time_or_retired",
    "points",
    "lap",
    "time_of_day",
    "lap_time",
    "avg_speed",
    "q1_time",
    "q2_time",
    "q3_time",
    "sg_time",
    "gap",
    "stops",
    "pit_time",
    "total_pit_time",
];

/// `f1_2023_race.csv` for one season, `f1_2015-2024_race.csv` for a span.
pub fn file_name(years: &[u16], result_type: ResultType) -> String {
    match (years.iter().min(), years.iter().max()) {
        (Some(first), Some(last)) if first != last => {
            format!("f1_{}-{}_{}.csv", first, last, result_type)
        }
        (Some(year), _) => format!("f1_{}_{}.csv", year, result_type),
        _ => format!("f1_{}.csv", result_type),
    }
}

/// Union of all record keys: preferred keys first, then the rest as seen.
pub fn headers_for(records: &[ResultRecord]) -> Vec<String> {
    let mut seen: Vec<&str> = Vec::new();
    for key in records.iter().flat_map(ResultRecord::keys) {
        if !seen.contains(&key) {
            seen.push(key);
        }
    }

    let mut headers: Vec<String> = PREFERRED_HEADERS
        .iter()
        .filter(|h| seen.contains(*h))
        .map(|h| h.to_string())
        .collect();
    headers.extend(
        seen.iter()
            .filter(|k| !PREFERRED_HEADERS.contains(*k))
            .map(|k| k.to_string()),
    );
    headers
}

/// Write `records` to `path`, creating the parent directory.
///
/// Returns `Ok(false)` without touching the filesystem when there is
/// nothing to write.
pub fn write_records(records: &[ResultRecord], path: &Path) -> Result<bool, ScraperError> {
    if records.is_empty() {
        info!("No data collected for {}, skipping CSV save", path.display());
        return Ok(false);
    }

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }

    let headers = headers_for(records);
    let mut writer = csv::Writer::from_writer(File::create(path)?);
    writer.write_record(&headers)?;
    for record in records {
        writer.write_record(headers.iter().map(|h| record.get(h).unwrap_or("")))?;
    }
    writer.flush()?;

    info!("Saved {} rows to {}", records.len(), path.display());
    Ok(true)
}
