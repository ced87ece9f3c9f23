//! Result record types and the per-result-type column layouts.

use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// One of the eight session categories scraped from the results archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultType {
    Race,
    FastestLap,
    Qualifying,
    StartingGrid,
    PitStop,
    Practice1,
    Practice2,
    Practice3,
}

impl ResultType {
    /// Crawl order used by the binary.
    pub const ALL: [ResultType; 8] = [
        ResultType::Race,
        ResultType::FastestLap,
        ResultType::Qualifying,
        ResultType::StartingGrid,
        ResultType::PitStop,
        ResultType::Practice1,
        ResultType::Practice2,
        ResultType::Practice3,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResultType::Race => "race",
            ResultType::FastestLap => "fastest_lap",
            ResultType::Qualifying => "qualifying",
            ResultType::StartingGrid => "starting_grid",
            ResultType::PitStop => "pit_stop",
            ResultType::Practice1 => "practice_1",
            ResultType::Practice2 => "practice_2",
            ResultType::Practice3 => "practice_3",
        }
    }

    /// Suffix appended to a canonical race URL to reach this result page.
    pub fn url_suffix(&self) -> &'static str {
        match self {
            ResultType::Race => "/race-result.html",
            ResultType::FastestLap => "/fastest-laps.html",
            ResultType::Qualifying => "/qualifying.html",
            ResultType::StartingGrid => "/starting-grid.html",
            ResultType::PitStop => "/pit-stop-summary.html",
            ResultType::Practice1 => "/practice-1.html",
            ResultType::Practice2 => "/practice-2.html",
            ResultType::Practice3 => "/practice-3.html",
        }
    }

    pub fn columns(&self) -> &'static ColumnMapping {
        match self {
            ResultType::Race => &RACE_COLUMNS,
            ResultType::FastestLap => &FASTEST_LAP_COLUMNS,
            ResultType::Qualifying => &QUALIFYING_COLUMNS,
            ResultType::StartingGrid => &STARTING_GRID_COLUMNS,
            ResultType::PitStop => &PIT_STOP_COLUMNS,
            ResultType::Practice1 | ResultType::Practice2 | ResultType::Practice3 => {
                &PRACTICE_COLUMNS
            }
        }
    }

    /// Parsing rules for this result type's table.
    pub fn schema(&self) -> TableSchema {
        match self {
            ResultType::PitStop => TableSchema::pit_stop(),
            other => TableSchema::column_mapped(*other),
        }
    }
}

impl fmt::Display for ResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Semantic output fields a table column can feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Position,
    DriverNumber,
    /// Expands into `driver_name` and `driver_code`.
    Driver,
    Team,
    Laps,
    TimeOrRetired,
    Points,
    Lap,
    TimeOfDay,
    LapTime,
    AvgSpeed,
    Q1Time,
    Q2Time,
    Q3Time,
    SgTime,
    Gap,
    Stops,
    PitTime,
    TotalPitTime,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Position => "position",
            Field::DriverNumber => "driver_number",
            Field::Driver => "driver",
            Field::Team => "team",
            Field::Laps => "laps",
            Field::TimeOrRetired => "time_or_retired",
            Field::Points => "points",
            Field::Lap => "lap",
            Field::TimeOfDay => "time_of_day",
            Field::LapTime => "lap_time",
            Field::AvgSpeed => "avg_speed",
            Field::Q1Time => "q1_time",
            Field::Q2Time => "q2_time",
            Field::Q3Time => "q3_time",
            Field::SgTime => "sg_time",
            Field::Gap => "gap",
            Field::Stops => "stops",
            Field::PitTime => "pit_time",
            Field::TotalPitTime => "total_pit_time",
        }
    }
}

/// Ordered (field, zero-based column index) pairs for one result type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMapping {
    pub name: &'static str,
    pub columns: &'static [(Field, usize)],
}

impl ColumnMapping {
    /// Column count a row needs to cover every declared index.
    pub fn required_columns(&self) -> usize {
        self.columns
            .iter()
            .map(|(_, index)| index + 1)
            .max()
            .unwrap_or(0)
    }
}

pub static RACE_COLUMNS: ColumnMapping = ColumnMapping {
    name: "race",
    columns: &[
        (Field::Position, 0),
        (Field::DriverNumber, 1),
        (Field::Driver, 2),
        (Field::Team, 3),
        (Field::Laps, 4),
        (Field::TimeOrRetired, 5),
        (Field::Points, 6),
    ],
};

pub static FASTEST_LAP_COLUMNS: ColumnMapping = ColumnMapping {
    name: "fastest_lap",
    columns: &[
        (Field::Position, 0),
        (Field::DriverNumber, 1),
        (Field::Driver, 2),
        (Field::Team, 3),
        (Field::Lap, 4),
        (Field::TimeOfDay, 5),
        (Field::LapTime, 6),
        (Field::AvgSpeed, 7),
    ],
};

pub static QUALIFYING_COLUMNS: ColumnMapping = ColumnMapping {
    name: "qualifying",
    columns: &[
        (Field::Position, 0),
        (Field::DriverNumber, 1),
        (Field::Driver, 2),
        (Field::Team, 3),
        (Field::Q1Time, 4),
        (Field::Q2Time, 5),
        (Field::Q3Time, 6),
        (Field::Laps, 7),
    ],
};

pub static STARTING_GRID_COLUMNS: ColumnMapping = ColumnMapping {
    name: "starting_grid",
    columns: &[
        (Field::Position, 0),
        (Field::DriverNumber, 1),
        (Field::Driver, 2),
        (Field::Team, 3),
        (Field::SgTime, 4),
    ],
};

pub static PIT_STOP_COLUMNS: ColumnMapping = ColumnMapping {
    name: "pit_stop",
    columns: &[
        (Field::Stops, 0),
        (Field::DriverNumber, 1),
        (Field::Driver, 2),
        (Field::Team, 3),
        (Field::Lap, 4),
        (Field::TimeOfDay, 5),
        (Field::PitTime, 6),
        (Field::TotalPitTime, 7),
    ],
};

pub static PRACTICE_COLUMNS: ColumnMapping = ColumnMapping {
    name: "practice",
    columns: &[
        (Field::Position, 0),
        (Field::DriverNumber, 1),
        (Field::Driver, 2),
        (Field::Team, 3),
        (Field::LapTime, 4),
        (Field::Gap, 5),
        (Field::Laps, 6),
    ],
};

/// Extra field that, when filled, makes a row worth keeping.
///
/// This is a heuristic and not a validity proof: a position of three
/// characters or fewer is accepted even when non-numeric so that "DNF",
/// "NC" and "DQ" rows survive, which also lets short junk through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EssentialRule {
    /// `position` is all digits or at most 3 characters long.
    Position,
    /// `pit_time` is non-empty.
    PitTime,
}

/// Everything the shared table engine needs to turn rows into records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    pub result_type: ResultType,
    pub columns: &'static ColumnMapping,
    /// Rows with fewer `<td>` cells are dropped before any field is read.
    pub min_columns: usize,
    pub essential: EssentialRule,
}

impl TableSchema {
    pub fn column_mapped(result_type: ResultType) -> Self {
        let columns = result_type.columns();
        Self {
            result_type,
            columns,
            min_columns: columns.required_columns(),
            essential: EssentialRule::Position,
        }
    }

    /// Pit stop summaries sometimes omit the trailing total column, so seven
    /// cells are enough.
    pub fn pit_stop() -> Self {
        Self {
            result_type: ResultType::PitStop,
            columns: &PIT_STOP_COLUMNS,
            min_columns: 7,
            essential: EssentialRule::PitTime,
        }
    }
}

/// Year, race name and race id recovered from a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaceMetadata {
    pub year: String,
    pub race_name: String,
    pub race_id: String,
}

/// A race discovered on a yearly overview page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaceTarget {
    pub race_id: u32,
    pub url: String,
}

/// One row of one result table.
///
/// The five common fields are always set; `fields` holds the result-type
/// specific values in column-mapping order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord {
    pub year: String,
    pub race_name: String,
    pub race_id: String,
    pub result_type: ResultType,
    pub url: String,
    pub fields: Vec<(&'static str, String)>,
}

impl ResultRecord {
    pub fn new(meta: &RaceMetadata, result_type: ResultType, url: &str) -> Self {
        Self {
            year: meta.year.clone(),
            race_name: meta.race_name.clone(),
            race_id: meta.race_id.clone(),
            result_type,
            url: url.to_string(),
            fields: Vec::new(),
        }
    }

    pub(crate) fn set(&mut self, key: &'static str, value: String) {
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
    }

    /// Look up any key, common or type specific.
    pub fn get(&self, key: &str) -> Option<&str> {
        match key {
            "year" => Some(&self.year),
            "race_name" => Some(&self.race_name),
            "race_id" => Some(&self.race_id),
            "result_type" => Some(self.result_type.as_str()),
            "url" => Some(&self.url),
            _ => self
                .fields
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.as_str()),
        }
    }

    /// All keys in record order: common fields first.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        COMMON_KEYS
            .iter()
            .copied()
            .chain(self.fields.iter().map(|(k, _)| *k))
    }
}

pub const COMMON_KEYS: [&str; 5] = ["year", "race_name", "race_id", "result_type", "url"];

impl Serialize for ResultRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(COMMON_KEYS.len() + self.fields.len()))?;
        map.serialize_entry("year", &self.year)?;
        map.serialize_entry("race_name", &self.race_name)?;
        map.serialize_entry("race_id", &self.race_id)?;
        map.serialize_entry("result_type", self.result_type.as_str())?;
        map.serialize_entry("url", &self.url)?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
