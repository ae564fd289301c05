use chrono::NaiveDate;

use crate::dates::days_between;
use crate::error::EngineError;
use crate::models::{CycleDay, CyclePhase, CycleRecord, RollingStats};
use crate::prediction::{calculate_fertile_window, predict_next_period_start};
use crate::stats::regular_sorted;

/// Classify `date` within the cycle that started on `cycle_start`.
///
/// Checks run in a fixed order: period, fertile window, luteal, late, and
/// follicular for whatever is left. A `date` before `cycle_start` yields
/// `Luteal`; see [`try_cycle_phase`] for a strict variant.
pub fn get_cycle_phase(
    date: NaiveDate,
    cycle_start: NaiveDate,
    period_length: u32,
    cycle_length: u32,
) -> CyclePhase {
    if date < cycle_start {
        return CyclePhase::Luteal;
    }

    let days_since_start = days_between(cycle_start, date);
    if days_since_start < i64::from(period_length) {
        return CyclePhase::Period;
    }

    let next_period = predict_next_period_start(cycle_start, cycle_length);
    let fertile = calculate_fertile_window(next_period);

    if fertile.contains(date) {
        CyclePhase::Fertile
    } else if date > fertile.end && date < next_period {
        CyclePhase::Luteal
    } else if date >= next_period {
        CyclePhase::Late
    } else {
        CyclePhase::Follicular
    }
}

/// Like [`get_cycle_phase`], but rejects a `date` before `cycle_start`.
pub fn try_cycle_phase(
    date: NaiveDate,
    cycle_start: NaiveDate,
    period_length: u32,
    cycle_length: u32,
) -> Result<CyclePhase, EngineError> {
    if date < cycle_start {
        return Err(EngineError::DateBeforeCycleStart { date, cycle_start });
    }
    Ok(get_cycle_phase(date, cycle_start, period_length, cycle_length))
}

/// Where `today` sits in the current cycle.
///
/// The current cycle is the latest regular record starting on or before
/// `today`. A closed record uses its own period length, an open one the
/// rolling average.
pub fn cycle_day(records: &[CycleRecord], stats: RollingStats, today: NaiveDate) -> Option<CycleDay> {
    let current = regular_sorted(records)
        .into_iter()
        .rev()
        .find(|r| r.start_date <= today)?;

    let period_length = current
        .period_length()
        .and_then(|days| u32::try_from(days).ok())
        .unwrap_or(stats.avg_period_length);
    let next_period_start = predict_next_period_start(current.start_date, stats.avg_cycle_length);

    Some(CycleDay {
        cycle_start: current.start_date,
        day: days_between(current.start_date, today) + 1,
        phase: get_cycle_phase(today, current.start_date, period_length, stats.avg_cycle_length),
        next_period_start,
        days_until_next_period: days_between(today, next_period_start),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CycleType;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn phase_on(day: &str) -> CyclePhase {
        get_cycle_phase(date(day), date("2024-01-01"), 5, 28)
    }

    #[test]
    fn walks_through_a_textbook_cycle() {
        assert_eq!(phase_on("2024-01-01"), CyclePhase::Period);
        assert_eq!(phase_on("2024-01-05"), CyclePhase::Period);
        assert_eq!(phase_on("2024-01-06"), CyclePhase::Follicular);
        assert_eq!(phase_on("2024-01-09"), CyclePhase::Follicular);
        assert_eq!(phase_on("2024-01-10"), CyclePhase::Fertile);
        assert_eq!(phase_on("2024-01-15"), CyclePhase::Fertile);
        assert_eq!(phase_on("2024-01-16"), CyclePhase::Luteal);
        assert_eq!(phase_on("2024-01-28"), CyclePhase::Luteal);
        assert_eq!(phase_on("2024-01-29"), CyclePhase::Late);
    }

    #[test]
    fn ten_days_overdue_is_late() {
        assert_eq!(phase_on("2024-02-10"), CyclePhase::Late);
    }

    #[test]
    fn huge_cycle_length_is_not_late() {
        let start = date("2024-01-01");
        assert_eq!(get_cycle_phase(date("2024-01-20"), start, 5, u32::MAX), CyclePhase::Follicular);
        assert_eq!(get_cycle_phase(date("2024-01-02"), start, u32::MAX, u32::MAX), CyclePhase::Period);
    }

    #[test]
    fn date_before_start_falls_back_to_luteal() {
        assert_eq!(phase_on("2023-12-31"), CyclePhase::Luteal);
        assert!(matches!(
            try_cycle_phase(date("2023-12-31"), date("2024-01-01"), 5, 28),
            Err(EngineError::DateBeforeCycleStart { .. })
        ));
        assert_eq!(
            try_cycle_phase(date("2024-01-12"), date("2024-01-01"), 5, 28).unwrap(),
            CyclePhase::Fertile
        );
    }

    #[test]
    fn period_wins_over_fertile_window() {
        // A 21-day cycle with a 10-day period overlaps the fertile window.
        let start = date("2024-01-01");
        assert_eq!(get_cycle_phase(date("2024-01-02"), start, 10, 21), CyclePhase::Period);
        assert_eq!(get_cycle_phase(date("2024-01-10"), start, 10, 21), CyclePhase::Period);
        assert_eq!(get_cycle_phase(date("2024-01-11"), start, 10, 21), CyclePhase::Luteal);
    }

    #[test]
    fn every_day_gets_exactly_one_phase() {
        let start = date("2024-03-01");
        for cycle_length in 21..=45u32 {
            for period_length in 1..=14u32 {
                for offset in 0..60 {
                    let day = start + chrono::Duration::days(offset);
                    let phase = get_cycle_phase(day, start, period_length, cycle_length);
                    let next = predict_next_period_start(start, cycle_length);
                    match phase {
                        CyclePhase::Period => assert!(offset < i64::from(period_length)),
                        CyclePhase::Late => assert!(day >= next),
                        CyclePhase::Fertile => {
                            assert!(calculate_fertile_window(next).contains(day))
                        }
                        CyclePhase::Luteal | CyclePhase::Follicular => assert!(day < next),
                    }
                }
            }
        }
    }

    #[test]
    fn cycle_day_uses_latest_started_cycle() {
        let mut first = CycleRecord::new(date("2024-01-01"), CycleType::Regular);
        first.end_date = Some(date("2024-01-04"));
        let records = vec![first, CycleRecord::new(date("2024-03-01"), CycleType::Regular)];
        let stats = RollingStats::default();

        let day = cycle_day(&records, stats, date("2024-01-05")).unwrap();
        assert_eq!(day.day, 5);
        // Closed after four days.
        assert_eq!(day.phase, CyclePhase::Follicular);
        assert_eq!(day.next_period_start, date("2024-01-29"));
        assert_eq!(day.days_until_next_period, 24);

        let overdue = cycle_day(&records, stats, date("2024-02-02")).unwrap();
        assert_eq!(overdue.phase, CyclePhase::Late);
        assert_eq!(overdue.days_until_next_period, -4);
    }

    #[test]
    fn no_cycle_day_before_any_history() {
        let records = vec![CycleRecord::new(date("2024-03-01"), CycleType::Regular)];
        assert!(cycle_day(&records, RollingStats::default(), date("2024-02-01")).is_none());
    }
}
