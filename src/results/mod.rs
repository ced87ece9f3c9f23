//! Result data model

mod types;

pub use types::{
    ColumnMapping, EssentialRule, Field, RaceMetadata, RaceTarget, ResultRecord, ResultType,
    TableSchema, COMMON_KEYS, FASTEST_LAP_COLUMNS, PIT_STOP_COLUMNS, PRACTICE_COLUMNS,
    QUALIFYING_COLUMNS, RACE_COLUMNS, STARTING_GRID_COLUMNS,
};
