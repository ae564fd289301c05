use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of a logged cycle. Only `Regular` cycles feed statistics and
/// prediction; the others are kept as history.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CycleType {
    #[default]
    Regular,
    Pregnancy,
    Miscarriage,
    Irregular,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CycleRecord {
    pub id: Uuid,
    pub start_date: NaiveDate,
    /// `None` while the period is still ongoing.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(rename = "type", default)]
    pub cycle_type: CycleType,
}

impl CycleRecord {
    pub fn new(start_date: NaiveDate, cycle_type: CycleType) -> Self {
        Self {
            id: Uuid::new_v4(),
            start_date,
            end_date: None,
            cycle_type,
        }
    }

    pub fn is_regular(&self) -> bool {
        self.cycle_type == CycleType::Regular
    }

    pub fn is_active(&self) -> bool {
        self.end_date.is_none()
    }

    /// Inclusive length of a closed period in days.
    pub fn period_length(&self) -> Option<i64> {
        self.end_date
            .map(|end| (end - self.start_date).num_days() + 1)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RollingStats {
    pub avg_cycle_length: u32,
    pub avg_period_length: u32,
}

impl RollingStats {
    pub const DEFAULT_CYCLE_LENGTH: u32 = 28;
    pub const DEFAULT_PERIOD_LENGTH: u32 = 5;
}

impl Default for RollingStats {
    fn default() -> Self {
        Self {
            avg_cycle_length: Self::DEFAULT_CYCLE_LENGTH,
            avg_period_length: Self::DEFAULT_PERIOD_LENGTH,
        }
    }
}

/// Six-day fertile window ending on the ovulation day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FertileWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub ovulation: NaiveDate,
}

impl FertileWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CyclePhase {
    Period,
    Follicular,
    Fertile,
    Luteal,
    Late,
}

/// One projected future cycle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PredictedCycle {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub fertile_window: FertileWindow,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SymptomType {
    Cramps,
    Headache,
    MoodLow,
    MoodHigh,
    Fatigue,
    Bloating,
    BreastTenderness,
    Acne,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SymptomLog {
    pub date: NaiveDate,
    pub symptom_type: SymptomType,
    pub severity: u8, // 1-3
}

/// Two adjacent regular cycles whose distance falls outside the plausible
/// cycle-length range.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CycleGap {
    pub from_start: NaiveDate,
    pub to_start: NaiveDate,
    pub days: i64,
}

/// Data for the statistics view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CycleSummary {
    pub total_cycles: usize,
    pub stats: RollingStats,
    pub cycle_length_is_default: bool,
    pub period_length_is_default: bool,
    pub shortest_cycle: Option<i64>,
    pub longest_cycle: Option<i64>,
    pub last_period_start: Option<NaiveDate>,
    pub last_period_end: Option<NaiveDate>,
    pub confidence: f32,
    pub gaps: Vec<CycleGap>,
}

/// "Day N of cycle, phase X" for a given day.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CycleDay {
    pub cycle_start: NaiveDate,
    pub day: i64,
    pub phase: CyclePhase,
    pub next_period_start: NaiveDate,
    pub days_until_next_period: i64,
}
