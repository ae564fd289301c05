use std::sync::Mutex;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::calendar::{project_calendar, CalendarProjection};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::export::{calendar_events, CalendarEvent};
use crate::models::*;
use crate::phase;
use crate::snapshot::{assistant_snapshot, AssistantSnapshot};
use crate::stats::{cycle_summary, recalculate_averages};
use crate::store::{CycleStore, StoreError};

/// Stored shape of one user's cycle document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CycleDocument {
    #[serde(default)]
    pub cycles: Vec<CycleRecord>,
    #[serde(default)]
    pub avg_cycle_length: Option<u32>,
    #[serde(default)]
    pub avg_period_length: Option<u32>,
    #[serde(default)]
    pub symptoms: Vec<SymptomLog>,
}

#[derive(Debug, Clone)]
struct TrackerData {
    records: Vec<CycleRecord>,
    stats: RollingStats,
    symptoms: Vec<SymptomLog>,
}

impl TrackerData {
    fn to_document(&self) -> CycleDocument {
        CycleDocument {
            cycles: self.records.clone(),
            avg_cycle_length: Some(self.stats.avg_cycle_length),
            avg_period_length: Some(self.stats.avg_period_length),
            symptoms: self.symptoms.clone(),
        }
    }

    fn record_mut(&mut self, id: Uuid) -> Result<&mut CycleRecord, EngineError> {
        self.records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(EngineError::RecordNotFound(id))
    }

    fn set_end(&mut self, id: Uuid, end: Option<NaiveDate>) -> Result<CycleRecord, EngineError> {
        let record = self.record_mut(id)?;
        if let Some(end) = end {
            if end < record.start_date {
                warn!(%id, %end, "rejected end date before start");
                return Err(EngineError::InvalidEndDate {
                    start: record.start_date,
                    end,
                });
            }
        }
        record.end_date = end;
        info!(%id, ?end, "updated period end");
        Ok(record.clone())
    }
}

/// One user's cycle log on top of a document store.
///
/// Every mutation recalculates the rolling averages and merges the records
/// and averages back into the store. Writes are serialized by the lock.
pub struct CycleTracker<S: CycleStore> {
    store: S,
    key: String,
    config: EngineConfig,
    data: Mutex<TrackerData>,
}

impl<S: CycleStore> CycleTracker<S> {
    pub fn load(store: S, key: impl Into<String>, config: EngineConfig) -> Result<Self, EngineError> {
        let key = key.into();
        let document: CycleDocument = match store.get(&key)? {
            Some(value) => serde_json::from_value(value).map_err(StoreError::from)?,
            None => CycleDocument::default(),
        };

        let stored = RollingStats {
            avg_cycle_length: document.avg_cycle_length.unwrap_or(config.default_cycle_length),
            avg_period_length: document
                .avg_period_length
                .unwrap_or(config.default_period_length),
        }
        .clamped();
        let data = TrackerData {
            stats: recalculate_averages(&document.cycles, stored),
            records: document.cycles,
            symptoms: document.symptoms,
        };
        info!(key = %key, records = data.records.len(), "loaded cycle document");

        Ok(Self {
            store,
            key,
            config,
            data: Mutex::new(data),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn read<T>(&self, f: impl FnOnce(&TrackerData) -> T) -> Result<T, EngineError> {
        let data = self.data.lock().map_err(|e| EngineError::State(e.to_string()))?;
        Ok(f(&data))
    }

    /// Apply `f` to a copy of the state, recalculate, persist, then commit.
    fn mutate<T>(
        &self,
        f: impl FnOnce(&mut TrackerData) -> Result<T, EngineError>,
    ) -> Result<T, EngineError> {
        let mut data_lock = self.data.lock().map_err(|e| EngineError::State(e.to_string()))?;
        let mut next = data_lock.clone();

        let result = f(&mut next)?;
        next.stats = recalculate_averages(&next.records, next.stats);

        let patch = serde_json::to_value(next.to_document()).map_err(StoreError::from)?;
        self.store.merge(&self.key, patch)?;

        *data_lock = next;
        Ok(result)
    }

    pub fn records(&self) -> Result<Vec<CycleRecord>, EngineError> {
        self.read(|d| d.records.clone())
    }

    pub fn stats(&self) -> Result<RollingStats, EngineError> {
        self.read(|d| d.stats)
    }

    pub fn symptoms(&self) -> Result<Vec<SymptomLog>, EngineError> {
        self.read(|d| d.symptoms.clone())
    }

    pub fn log_period_start(
        &self,
        date: NaiveDate,
        cycle_type: CycleType,
    ) -> Result<CycleRecord, EngineError> {
        self.mutate(|data| {
            if cycle_type == CycleType::Regular
                && data
                    .records
                    .iter()
                    .any(|r| r.is_regular() && r.start_date == date)
            {
                warn!(%date, "rejected duplicate period start");
                return Err(EngineError::DuplicateStartDate(date));
            }

            let record = CycleRecord::new(date, cycle_type);
            data.records.push(record.clone());
            info!(id = %record.id, %date, ?cycle_type, "logged period start");
            Ok(record)
        })
    }

    /// Set or clear the end date of a record.
    pub fn set_period_end(&self, id: Uuid, end: Option<NaiveDate>) -> Result<CycleRecord, EngineError> {
        self.mutate(|data| data.set_end(id, end))
    }

    /// Close an open record on `today`, or reopen a closed one.
    pub fn toggle_period_end(&self, id: Uuid, today: NaiveDate) -> Result<CycleRecord, EngineError> {
        self.mutate(|data| {
            let end = match data.record_mut(id)?.end_date {
                Some(_) => None,
                None => Some(today),
            };
            data.set_end(id, end)
        })
    }

    pub fn delete_record(&self, id: Uuid) -> Result<(), EngineError> {
        self.mutate(|data| {
            let before = data.records.len();
            data.records.retain(|r| r.id != id);
            if data.records.len() == before {
                return Err(EngineError::RecordNotFound(id));
            }
            info!(%id, "deleted cycle record");
            Ok(())
        })
    }

    /// Replace the symptoms logged for `date`.
    pub fn log_symptoms(
        &self,
        date: NaiveDate,
        symptoms: Vec<(SymptomType, u8)>,
    ) -> Result<(), EngineError> {
        self.mutate(|data| {
            data.symptoms.retain(|s| s.date != date);
            for (symptom_type, severity) in symptoms {
                data.symptoms.push(SymptomLog {
                    date,
                    symptom_type,
                    severity: severity.clamp(1, 3),
                });
            }
            info!(%date, "logged symptoms");
            Ok(())
        })
    }

    pub fn projection(&self, today: NaiveDate) -> Result<CalendarProjection, EngineError> {
        let horizon = self.config.projection_horizon;
        self.read(|d| project_calendar(&d.records, d.stats, horizon, today))
    }

    pub fn summary(&self) -> Result<CycleSummary, EngineError> {
        self.read(|d| cycle_summary(&d.records, d.stats))
    }

    pub fn cycle_day(&self, today: NaiveDate) -> Result<Option<CycleDay>, EngineError> {
        self.read(|d| phase::cycle_day(&d.records, d.stats, today))
    }

    pub fn snapshot(&self, today: NaiveDate) -> Result<AssistantSnapshot, EngineError> {
        let lookback = self.config.symptom_lookback_days;
        self.read(|d| assistant_snapshot(&d.records, d.stats, &d.symptoms, today, lookback))
    }

    pub fn export_events(&self) -> Result<Vec<CalendarEvent>, EngineError> {
        let horizon = self.config.export_horizon;
        self.read(|d| calendar_events(&d.records, d.stats, horizon))
    }

    pub fn export_json(&self) -> Result<String, EngineError> {
        let document = self.read(|d| d.to_document())?;
        Ok(serde_json::to_string_pretty(&document).map_err(StoreError::from)?)
    }
}
