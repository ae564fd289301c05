//! Calendar-day helpers.
//!
//! Every date in the engine is a timezone-naive `NaiveDate`. Instants only
//! appear at the edges: hosts hand in local timestamps, exports hand out
//! 12:00 UTC so that a day never slides across a date line.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::error::EngineError;

const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

/// `YYYY-MM-DD` key used by the calendar sets.
pub fn day_key(date: NaiveDate) -> String {
    date.format(DAY_KEY_FORMAT).to_string()
}

pub fn parse_day(value: &str) -> Result<NaiveDate, EngineError> {
    NaiveDate::parse_from_str(value.trim(), DAY_KEY_FORMAT)
        .map_err(|_| EngineError::InvalidDate(value.to_string()))
}

/// Whole days from `from` to `to`; negative when `to` is earlier.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Saturates at `NaiveDate::MIN` / `NaiveDate::MAX` instead of overflowing.
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    Duration::try_days(days)
        .and_then(|delta| date.checked_add_signed(delta))
        .unwrap_or(if days < 0 { NaiveDate::MIN } else { NaiveDate::MAX })
}

/// Inclusive day range. Yields nothing when `end < start`.
pub fn expand_range(start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    start.iter_days().take_while(move |day| *day <= end)
}

/// The calendar day the host's clock shows, in the host's own zone.
pub fn calendar_day<Tz: TimeZone>(instant: &DateTime<Tz>) -> NaiveDate {
    instant.date_naive()
}

/// Serialization instant for a calendar day.
pub fn to_utc_midday(date: NaiveDate) -> DateTime<Utc> {
    (date.and_time(NaiveTime::default()) + Duration::hours(12)).and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn day_key_is_zero_padded() {
        assert_eq!(day_key(d(2024, 3, 7)), "2024-03-07");
    }

    #[test]
    fn parse_day_rejects_garbage() {
        assert_eq!(parse_day(" 2024-02-29 ").unwrap(), d(2024, 2, 29));
        assert!(matches!(
            parse_day("2024-02-30"),
            Err(EngineError::InvalidDate(_))
        ));
    }

    #[test]
    fn expand_range_is_inclusive() {
        let days: Vec<_> = expand_range(d(2024, 2, 27), d(2024, 3, 1)).collect();
        assert_eq!(days, vec![d(2024, 2, 27), d(2024, 2, 28), d(2024, 2, 29), d(2024, 3, 1)]);
        assert_eq!(expand_range(d(2024, 3, 2), d(2024, 3, 1)).count(), 0);
    }

    #[test]
    fn local_midnight_keeps_its_calendar_day() {
        // 00:30 in UTC+2 is still the previous day in UTC.
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let instant = tz.with_ymd_and_hms(2024, 3, 31, 0, 30, 0).unwrap();
        assert_eq!(calendar_day(&instant), d(2024, 3, 31));
        assert_eq!(calendar_day(&instant.with_timezone(&Utc)), d(2024, 3, 30));
    }

    #[test]
    fn utc_midday_round_trips_the_day() {
        let instant = to_utc_midday(d(2024, 10, 27));
        assert_eq!(instant.to_rfc3339(), "2024-10-27T12:00:00+00:00");
        assert_eq!(calendar_day(&instant), d(2024, 10, 27));
    }

    #[test]
    fn days_between_is_signed() {
        assert_eq!(days_between(d(2024, 1, 1), d(2024, 1, 29)), 28);
        assert_eq!(days_between(d(2024, 1, 29), d(2024, 1, 1)), -28);
        assert_eq!(add_days(d(2024, 2, 28), 1), d(2024, 2, 29));
    }

    #[test]
    fn add_days_saturates() {
        assert_eq!(add_days(d(2024, 1, 1), i64::from(u32::MAX)), NaiveDate::MAX);
        assert_eq!(add_days(d(2024, 1, 1), i64::MIN), NaiveDate::MIN);
        assert_eq!(add_days(NaiveDate::MAX, 1), NaiveDate::MAX);
    }
}
