//! Activity tracking for the signal playground.
//!
//! Counts how each dataset is used and how sessions are driven, so the
//! `status` command can report on past runs.

pub mod log;

pub use log::{ActivityLog, ActivityTotals, Interaction, PersistedActivity, SeriesUsage};
