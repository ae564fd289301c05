//! Read-only cycle context bundled for the chat assistant's prompt.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::{add_days, days_between};
use crate::models::{CyclePhase, CycleRecord, RollingStats, SymptomLog};
use crate::phase::cycle_day;
use crate::prediction::calculate_fertile_window;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssistantSnapshot {
    pub today: NaiveDate,
    pub is_period: bool,
    pub is_fertile: bool,
    pub is_ovulation: bool,
    pub phase: Option<CyclePhase>,
    pub current_cycle_day: Option<i64>,
    pub days_until_next_period: Option<i64>,
    pub stats: RollingStats,
    pub recent_symptoms: Vec<SymptomLog>,
}

pub fn assistant_snapshot(
    records: &[CycleRecord],
    stats: RollingStats,
    symptoms: &[SymptomLog],
    today: NaiveDate,
    lookback_days: u32,
) -> AssistantSnapshot {
    let day = cycle_day(records, stats, today);
    let ovulation = day.map(|d| calculate_fertile_window(d.next_period_start).ovulation);

    let since = add_days(today, -i64::from(lookback_days));
    let mut recent_symptoms: Vec<SymptomLog> = symptoms
        .iter()
        .filter(|s| s.date > since && days_between(s.date, today) >= 0)
        .cloned()
        .collect();
    recent_symptoms.sort_by(|a, b| b.date.cmp(&a.date));

    AssistantSnapshot {
        today,
        is_period: day.is_some_and(|d| d.phase == CyclePhase::Period),
        is_fertile: day.is_some_and(|d| d.phase == CyclePhase::Fertile),
        is_ovulation: ovulation == Some(today),
        phase: day.map(|d| d.phase),
        current_cycle_day: day.map(|d| d.day),
        days_until_next_period: day.map(|d| d.days_until_next_period),
        stats,
        recent_symptoms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CycleType, SymptomType};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn symptom(day: &str, symptom_type: SymptomType) -> SymptomLog {
        SymptomLog {
            date: date(day),
            symptom_type,
            severity: 2,
        }
    }

    #[test]
    fn ovulation_day_snapshot() {
        let records = vec![CycleRecord::new(date("2024-01-01"), CycleType::Regular)];
        let symptoms = vec![
            symptom("2024-01-02", SymptomType::Cramps),
            symptom("2024-01-14", SymptomType::Bloating),
            symptom("2024-01-15", SymptomType::MoodHigh),
            symptom("2024-01-16", SymptomType::Acne),
        ];
        let snap = assistant_snapshot(&records, RollingStats::default(), &symptoms, date("2024-01-15"), 7);

        assert!(snap.is_fertile);
        assert!(snap.is_ovulation);
        assert!(!snap.is_period);
        assert_eq!(snap.current_cycle_day, Some(15));
        assert_eq!(snap.days_until_next_period, Some(14));
        let kinds: Vec<_> = snap.recent_symptoms.iter().map(|s| s.symptom_type).collect();
        assert_eq!(kinds, vec![SymptomType::MoodHigh, SymptomType::Bloating]);
    }

    #[test]
    fn snapshot_serializes_camel_case() {
        let records = vec![CycleRecord::new(date("2024-01-01"), CycleType::Regular)];
        let snap = assistant_snapshot(&records, RollingStats::default(), &[], date("2024-01-03"), 7);
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["isPeriod"], true);
        assert_eq!(json["currentCycleDay"], 3);
        assert_eq!(json["daysUntilNextPeriod"], 26);
        assert_eq!(json["phase"], "period");
        assert_eq!(json["stats"]["avgCycleLength"], 28);
    }

    #[test]
    fn empty_history_snapshot() {
        let snap = assistant_snapshot(&[], RollingStats::default(), &[], date("2024-01-03"), 7);
        assert!(!snap.is_period && !snap.is_fertile && !snap.is_ovulation);
        assert_eq!(snap.current_cycle_day, None);
        assert_eq!(snap.phase, None);
    }
}
