use chrono::NaiveDate;

use crate::dates::add_days;
use crate::models::{CycleRecord, FertileWindow, PredictedCycle, RollingStats};
use crate::stats::{latest_regular, MAX_PERIOD_LENGTH};

/// Days from ovulation to the next period. Assumed fixed.
pub const LUTEAL_PHASE_DAYS: i64 = 14;
/// Fertile days before ovulation.
pub const FERTILE_DAYS_BEFORE_OVULATION: i64 = 5;

pub fn predict_next_period_start(cycle_start: NaiveDate, cycle_length: u32) -> NaiveDate {
    add_days(cycle_start, i64::from(cycle_length))
}

/// Ovulation 14 days before the given period start; fertile from five days
/// before ovulation through ovulation day.
pub fn calculate_fertile_window(next_period_start: NaiveDate) -> FertileWindow {
    let ovulation = add_days(next_period_start, -LUTEAL_PHASE_DAYS);
    FertileWindow {
        start: add_days(ovulation, -FERTILE_DAYS_BEFORE_OVULATION),
        end: ovulation,
        ovulation,
    }
}

/// Last day of a period starting on `start`. The length is kept within the
/// plausible period range.
pub fn period_end(start: NaiveDate, period_length: u32) -> NaiveDate {
    let days = i64::from(period_length).clamp(1, MAX_PERIOD_LENGTH - 1);
    add_days(start, days - 1)
}

fn predicted_cycle(start: NaiveDate, stats: RollingStats) -> PredictedCycle {
    PredictedCycle {
        start,
        end: period_end(start, stats.avg_period_length),
        fertile_window: calculate_fertile_window(start),
    }
}

/// Project `count` cycles after `anchor_start`, one average cycle apart.
pub fn project_from(anchor_start: NaiveDate, stats: RollingStats, count: usize) -> Vec<PredictedCycle> {
    (1..=count as i64)
        .map(|i| add_days(anchor_start, i64::from(stats.avg_cycle_length).saturating_mul(i)))
        .map(|start| predicted_cycle(start, stats))
        .collect()
}

/// Project `count` cycles after the most recent regular record.
pub fn project_cycles(
    records: &[CycleRecord],
    stats: RollingStats,
    count: usize,
) -> Vec<PredictedCycle> {
    latest_regular(records)
        .map(|anchor| project_from(anchor.start_date, stats, count))
        .unwrap_or_default()
}

/// The next predicted cycle, if there is any regular history.
pub fn predict(records: &[CycleRecord], stats: RollingStats) -> Option<PredictedCycle> {
    project_cycles(records, stats, 1).into_iter().next()
}
