//! Entry point used by front ends.
//!
//! A [`Tracker`] owns a [`LogStore`] and rebuilds events, naps and summaries
//! from it on every call; nothing is cached between calls.

use chrono::{NaiveDate, NaiveDateTime};

use crate::event::Event;
use crate::reconcile::{NapSnapshot, SleepAnomaly, detect_anomalies, exclude_anomalous, reconcile};
use crate::report::{HistogramTable, history, sleep_histogram};
use crate::store::{DEFAULT_RETAIN_COUNT, LogStore, StoreError};
use crate::summary::{DailySummary, summarize};

/// Activity tracker over an injected store.
#[derive(Debug)]
pub struct Tracker<S> {
    store: S,
    retain_count: usize,
}

impl<S: LogStore> Tracker<S> {
    pub const fn new(store: S, retain_count: usize) -> Self {
        Self {
            store,
            retain_count,
        }
    }

    pub const fn with_default_retention(store: S) -> Self {
        Self::new(store, DEFAULT_RETAIN_COUNT)
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn retain_count(&self) -> usize {
        self.retain_count
    }

    /// Appends an event, then rotates the active log down to the retention count.
    ///
    /// Not idempotent: retrying a failed call may record the event twice.
    pub fn record(&self, event: &Event) -> Result<(), StoreError> {
        self.store.append(event)?;
        let moved = self.store.rotate(self.retain_count)?;
        if moved > 0 {
            tracing::info!(moved, "archived old log entries");
        }
        tracing::debug!(line = %event.to_line(), "recorded event");
        Ok(())
    }

    /// Events in the active log, newest first when `reverse` is set.
    pub fn query_log(&self, reverse: bool) -> Result<Vec<Event>, StoreError> {
        let mut events = self.store.read(false)?;
        if reverse {
            events.reverse();
        }
        Ok(events)
    }

    /// Archive plus active log, in file order.
    pub fn full_log(&self) -> Result<Vec<Event>, StoreError> {
        self.store.read(true)
    }

    /// Replaces the active log verbatim. Used for manual corrections.
    pub fn overwrite_log(&self, contents: &str) -> Result<(), StoreError> {
        self.store.overwrite(contents)?;
        tracing::info!(bytes = contents.len(), "active log overwritten");
        Ok(())
    }

    pub fn daily_stats(
        &self,
        date: NaiveDate,
        now: NaiveDateTime,
    ) -> Result<DailySummary, StoreError> {
        let events = self.full_log()?;
        let intervals = reconcile(&events).intervals;
        Ok(summarize(date, &events, &intervals, now))
    }

    /// One summary per day, optionally limited to the last `days` days.
    ///
    /// With `exclude_anomalous`, naps bounded by an unpaired marker are left
    /// out of the nap statistics.
    pub fn history_summary(
        &self,
        days: Option<u32>,
        exclude_anomalous_naps: bool,
        now: NaiveDateTime,
    ) -> Result<Vec<DailySummary>, StoreError> {
        let events = self.full_log()?;
        let mut intervals = reconcile(&events).intervals;
        if exclude_anomalous_naps {
            intervals = exclude_anomalous(&intervals, &detect_anomalies(&events));
        }
        Ok(history(&events, &intervals, days, now.date(), now))
    }

    pub fn sleep_histogram(
        &self,
        days: Option<u32>,
        now: NaiveDateTime,
    ) -> Result<HistogramTable, StoreError> {
        let events = self.full_log()?;
        let intervals = reconcile(&events).intervals;
        Ok(sleep_histogram(&events, &intervals, days, now.date()))
    }

    /// Naps with their tags evaluated at `now`, optionally for one start date.
    pub fn naps(
        &self,
        date: Option<NaiveDate>,
        now: NaiveDateTime,
    ) -> Result<Vec<NapSnapshot>, StoreError> {
        let events = self.full_log()?;
        Ok(reconcile(&events)
            .intervals
            .iter()
            .filter(|i| date.is_none_or(|d| i.date() == d))
            .map(|i| i.snapshot(now))
            .collect())
    }

    /// Unpaired sleep markers across the full history.
    pub fn anomalies(&self) -> Result<Vec<SleepAnomaly>, StoreError> {
        Ok(detect_anomalies(&self.full_log()?))
    }
}
