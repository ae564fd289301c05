use chrono::NaiveDate;
use uuid::Uuid;

use crate::config::ConfigError;
use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("date {date} precedes cycle start {cycle_start}")]
    DateBeforeCycleStart {
        date: NaiveDate,
        cycle_start: NaiveDate,
    },
    #[error("end date {end} is before start date {start}")]
    InvalidEndDate { start: NaiveDate, end: NaiveDate },
    #[error("a regular cycle already starts on {0}")]
    DuplicateStartDate(NaiveDate),
    #[error("no cycle record with id {0}")]
    RecordNotFound(Uuid),
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("tracker state is unavailable: {0}")]
    State(String),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
