//! Core domain logic for the baby tracker.
//!
//! This crate contains the fundamental types and logic for:
//! - Events: parsing and writing `timestamp,activity,notes` log lines
//! - Reconciliation: pairing `asleep`/`awake` markers into naps
//! - Aggregation: daily summaries, multi-day history and the sleep histogram
//! - Storage: the [`LogStore`] trait and an in-memory implementation

pub mod activity;
pub mod event;
pub mod reconcile;
pub mod report;
mod stats;
pub mod store;
pub mod summary;
mod tracker;

pub use activity::Activity;
pub use event::{Event, EventError, ParseError, extract_volume_ml};
pub use reconcile::{
    AnomalyKind, NapInterval, NapSnapshot, Reconciliation, SleepAnomaly, detect_anomalies,
    reconcile,
};
pub use report::{HistogramBucket, HistogramTable};
pub use stats::Stats;
pub use store::{DEFAULT_RETAIN_COUNT, LogStore, MemoryLogStore, StoreError};
pub use summary::DailySummary;
pub use tracker::Tracker;
