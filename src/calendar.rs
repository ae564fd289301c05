//! Day-level membership sets for calendar grids and cycle wheels.
//!
//! Sets are rebuilt from scratch whenever records or averages change.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::{add_days, day_key, expand_range};
use crate::error::EngineError;
use crate::models::{CycleRecord, RollingStats};
use crate::prediction::{period_end, project_from};
use crate::stats::{regular_sorted, MAX_PERIOD_LENGTH};

/// Default number of cycles projected ahead.
pub const DEFAULT_HORIZON: usize = 3;

/// How a single day renders.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum DayKind {
    Period,
    PredictedPeriod,
    Ovulation,
    Fertile,
    None,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CalendarProjection {
    pub period_days: BTreeSet<String>,
    pub predicted_period_days: BTreeSet<String>,
    pub fertile_days: BTreeSet<String>,
    pub ovulation_days: BTreeSet<String>,
}

impl CalendarProjection {
    /// Logged period days win over predictions; ovulation wins over the rest
    /// of the fertile window.
    pub fn classify(&self, date: NaiveDate) -> DayKind {
        let key = day_key(date);
        if self.period_days.contains(&key) {
            DayKind::Period
        } else if self.predicted_period_days.contains(&key) {
            DayKind::PredictedPeriod
        } else if self.ovulation_days.contains(&key) {
            DayKind::Ovulation
        } else if self.fertile_days.contains(&key) {
            DayKind::Fertile
        } else {
            DayKind::None
        }
    }

    /// Predicted days not covered by a logged period.
    pub fn predicted_only(&self) -> impl Iterator<Item = &String> {
        self.predicted_period_days.difference(&self.period_days)
    }

    /// The same sets restricted to one calendar month.
    pub fn month(&self, year: i32, month: u32) -> Result<CalendarProjection, EngineError> {
        let first_day = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| EngineError::InvalidDate(format!("{year:04}-{month:02}")))?;
        let prefix = first_day.format("%Y-%m-").to_string();
        let keep = |set: &BTreeSet<String>| -> BTreeSet<String> {
            set.iter().filter(|k| k.starts_with(&prefix)).cloned().collect()
        };

        Ok(CalendarProjection {
            period_days: keep(&self.period_days),
            predicted_period_days: keep(&self.predicted_period_days),
            fertile_days: keep(&self.fertile_days),
            ovulation_days: keep(&self.ovulation_days),
        })
    }
}

/// Last rendered day of a logged period.
///
/// An open record that is the current cycle runs through `today`, capped at
/// the longest plausible period. Older open records get the average length.
fn logged_period_end(record: &CycleRecord, is_current: bool, stats: RollingStats, today: NaiveDate) -> NaiveDate {
    match record.end_date {
        Some(end) => end,
        None if is_current && today >= record.start_date => {
            // Inclusive range: start + 13 paints 14 days.
            today.min(add_days(record.start_date, MAX_PERIOD_LENGTH - 2))
        }
        None => period_end(record.start_date, stats.avg_period_length),
    }
}

pub fn project_calendar(
    records: &[CycleRecord],
    stats: RollingStats,
    horizon: usize,
    today: NaiveDate,
) -> CalendarProjection {
    let regular = regular_sorted(records);
    let mut projection = CalendarProjection::default();

    for (i, record) in regular.iter().enumerate() {
        let is_current = i + 1 == regular.len();
        let end = logged_period_end(record, is_current, stats, today);
        projection
            .period_days
            .extend(expand_range(record.start_date, end).map(day_key));
    }

    if let Some(anchor) = regular.last() {
        for cycle in project_from(anchor.start_date, stats, horizon) {
            projection
                .predicted_period_days
                .extend(expand_range(cycle.start, cycle.end).map(day_key));
            let fw = cycle.fertile_window;
            projection
                .fertile_days
                .extend(expand_range(fw.start, fw.end).map(day_key));
            projection.ovulation_days.insert(day_key(fw.ovulation));
        }
    }

    projection
}
