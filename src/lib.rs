//! Cycle statistics, period prediction and calendar projection.
//!
//! The engine modules are pure: they take cycle records and rolling averages
//! and return derived dates and day sets. [`tracker::CycleTracker`] wires them
//! to a [`store::CycleStore`] for the logging workflow.

pub mod calendar;
pub mod config;
pub mod dates;
pub mod error;
pub mod export;
pub mod models;
pub mod phase;
pub mod prediction;
pub mod snapshot;
pub mod stats;
pub mod store;
pub mod tracker;

pub use calendar::{project_calendar, CalendarProjection, DayKind};
pub use config::EngineConfig;
pub use error::EngineError;
pub use models::{CyclePhase, CycleRecord, CycleType, FertileWindow, RollingStats};
pub use phase::{get_cycle_phase, try_cycle_phase};
pub use prediction::{calculate_fertile_window, predict_next_period_start, project_cycles};
pub use stats::recalculate_averages;
pub use tracker::CycleTracker;
