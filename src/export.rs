use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::dates::to_utc_midday;
use crate::models::{CycleRecord, RollingStats};
use crate::prediction::project_cycles;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum CalendarEventKind {
    Period,
    FertileWindow,
    Ovulation,
}

/// An all-day block spanning `start..=end`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CalendarEvent {
    pub kind: CalendarEventKind,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl CalendarEvent {
    pub fn starts_at(&self) -> DateTime<Utc> {
        to_utc_midday(self.start)
    }

    pub fn ends_at(&self) -> DateTime<Utc> {
        to_utc_midday(self.end)
    }

    pub fn duration_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Predicted period, fertile window and ovulation blocks for the next
/// `cycles` cycles, ordered by start date.
pub fn calendar_events(records: &[CycleRecord], stats: RollingStats, cycles: usize) -> Vec<CalendarEvent> {
    let mut events: Vec<CalendarEvent> = project_cycles(records, stats, cycles)
        .into_iter()
        .flat_map(|cycle| {
            let fw = cycle.fertile_window;
            [
                CalendarEvent {
                    kind: CalendarEventKind::FertileWindow,
                    start: fw.start,
                    end: fw.end,
                },
                CalendarEvent {
                    kind: CalendarEventKind::Ovulation,
                    start: fw.ovulation,
                    end: fw.ovulation,
                },
                CalendarEvent {
                    kind: CalendarEventKind::Period,
                    start: cycle.start,
                    end: cycle.end,
                },
            ]
        })
        .collect();
    events.sort_by_key(|e| e.start);
    events
}
