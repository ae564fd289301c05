use tracing::debug;

use crate::dates::days_between;
use crate::models::{CycleGap, CycleRecord, CycleSummary, RollingStats};

/// Shortest distance between two period starts that counts as a real cycle.
pub const MIN_CYCLE_LENGTH: i64 = 21;
/// Longest distance between two period starts that counts as a real cycle.
pub const MAX_CYCLE_LENGTH: i64 = 45;
/// Exclusive upper bound on a plausible period length.
pub const MAX_PERIOD_LENGTH: i64 = 15;
/// Number of most recent valid values the rolling averages use.
pub const ROLLING_WINDOW: usize = 6;

impl RollingStats {
    /// Averages pulled into the plausible ranges. Zero counts as unset.
    pub fn clamped(self) -> Self {
        Self {
            avg_cycle_length: or_default(self.avg_cycle_length, Self::DEFAULT_CYCLE_LENGTH)
                .clamp(MIN_CYCLE_LENGTH as u32, MAX_CYCLE_LENGTH as u32),
            avg_period_length: or_default(self.avg_period_length, Self::DEFAULT_PERIOD_LENGTH)
                .clamp(1, MAX_PERIOD_LENGTH as u32 - 1),
        }
    }
}

/// Regular records, oldest first. Ties keep their input order.
pub fn regular_sorted(records: &[CycleRecord]) -> Vec<&CycleRecord> {
    let mut regular: Vec<&CycleRecord> = records.iter().filter(|r| r.is_regular()).collect();
    regular.sort_by_key(|r| r.start_date);
    regular
}

/// Most recent regular record, if any.
pub fn latest_regular(records: &[CycleRecord]) -> Option<&CycleRecord> {
    regular_sorted(records).last().copied()
}

pub fn is_plausible_cycle(days: i64) -> bool {
    (MIN_CYCLE_LENGTH..=MAX_CYCLE_LENGTH).contains(&days)
}

pub fn is_plausible_period(days: i64) -> bool {
    days > 0 && days < MAX_PERIOD_LENGTH
}

fn cycle_lengths(regular: &[&CycleRecord]) -> Vec<i64> {
    regular
        .windows(2)
        .map(|w| days_between(w[0].start_date, w[1].start_date))
        .filter(|days| is_plausible_cycle(*days))
        .collect()
}

fn period_lengths(regular: &[&CycleRecord]) -> Vec<i64> {
    regular
        .iter()
        .filter_map(|r| r.period_length())
        .filter(|days| is_plausible_period(*days))
        .collect()
}

fn recent(values: &[i64]) -> &[i64] {
    &values[values.len().saturating_sub(ROLLING_WINDOW)..]
}

fn rolling_mean(values: &[i64]) -> Option<u32> {
    let window = recent(values);
    if window.is_empty() {
        return None;
    }
    let sum: i64 = window.iter().sum();
    Some((sum as f64 / window.len() as f64).round() as u32)
}

fn or_default(current: u32, default: u32) -> u32 {
    if current == 0 {
        default
    } else {
        current
    }
}

/// Recompute the rolling averages from the full record list.
///
/// Cycle lengths outside `[21, 45]` and period lengths outside `(0, 15)` are
/// skipped. When nothing usable remains, the matching value of `current` is
/// kept (or the 28/5 default if it is unset).
pub fn recalculate_averages(records: &[CycleRecord], current: RollingStats) -> RollingStats {
    let regular = regular_sorted(records);
    let cycles = cycle_lengths(&regular);
    let periods = period_lengths(&regular);

    let stats = RollingStats {
        avg_cycle_length: rolling_mean(&cycles).unwrap_or_else(|| {
            or_default(current.avg_cycle_length, RollingStats::DEFAULT_CYCLE_LENGTH)
        }),
        avg_period_length: rolling_mean(&periods).unwrap_or_else(|| {
            or_default(current.avg_period_length, RollingStats::DEFAULT_PERIOD_LENGTH)
        }),
    };

    debug!(
        regular = regular.len(),
        cycle_lengths = cycles.len(),
        period_lengths = periods.len(),
        avg_cycle_length = stats.avg_cycle_length,
        avg_period_length = stats.avg_period_length,
        "recalculated rolling averages"
    );

    stats
}

/// Adjacent regular records too close together or too far apart to be a
/// single cycle: usually a missed log or a logging mistake.
pub fn detect_gaps(records: &[CycleRecord]) -> Vec<CycleGap> {
    let gaps: Vec<CycleGap> = regular_sorted(records)
        .windows(2)
        .filter_map(|w| {
            let days = days_between(w[0].start_date, w[1].start_date);
            (!is_plausible_cycle(days)).then_some(CycleGap {
                from_start: w[0].start_date,
                to_start: w[1].start_date,
                days,
            })
        })
        .collect();

    if !gaps.is_empty() {
        debug!(gaps = gaps.len(), "excluded irregular cycle lengths");
    }
    gaps
}

/// History overview: counts, extremes, gaps, and how far the recent cycle
/// lengths can be trusted.
pub fn cycle_summary(records: &[CycleRecord], current: RollingStats) -> CycleSummary {
    let regular = regular_sorted(records);
    let cycles = cycle_lengths(&regular);
    let periods = period_lengths(&regular);
    let last = regular.last();

    let window = recent(&cycles);
    let confidence = if window.len() < 2 {
        0.5
    } else {
        (1.0 - (std_deviation(window) / mean(window)) as f32).clamp(0.1, 0.95)
    };

    CycleSummary {
        total_cycles: regular.len(),
        stats: recalculate_averages(records, current),
        cycle_length_is_default: cycles.is_empty(),
        period_length_is_default: periods.is_empty(),
        shortest_cycle: cycles.iter().copied().min(),
        longest_cycle: cycles.iter().copied().max(),
        last_period_start: last.map(|r| r.start_date),
        last_period_end: last.and_then(|r| r.end_date),
        confidence,
        gaps: detect_gaps(records),
    }
}

fn mean(days: &[i64]) -> f64 {
    match days.len() {
        0 => 0.0,
        n => days.iter().sum::<i64>() as f64 / n as f64,
    }
}

/// Sample standard deviation of cycle lengths in days.
fn std_deviation(days: &[i64]) -> f64 {
    if days.len() < 2 {
        return 0.0;
    }
    let avg = mean(days);
    let squares: f64 = days.iter().map(|&d| (d as f64 - avg).powi(2)).sum();
    (squares / (days.len() - 1) as f64).sqrt()
}
