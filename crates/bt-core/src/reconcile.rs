//! Sleep interval reconciliation.
//!
//! Pairs `asleep`/`awake` markers into [`NapInterval`]s.
//!
//! # Algorithm Summary
//!
//! 1. Keep only sleep markers, stable-sorted by timestamp (file order is not
//!    guaranteed to be chronological)
//! 2. Walk once with at most one pending `asleep`
//! 3. An `awake` closes the pending nap; a second `asleep` replaces it
//! 4. A nap still pending at the end of the log stays open
//!
//! Anomaly detection is a separate advisory pass over the whole event stream
//! and never changes which intervals are built.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::activity::Activity;
use crate::event::Event;

/// Naps longer than this are tagged as long sleeps (night sleep).
pub const LONG_SLEEP_MINUTES: i64 = 240;

/// A reconciled nap. `end` is `None` while the baby is still asleep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NapInterval {
    pub start: NaiveDateTime,
    pub end: Option<NaiveDateTime>,
}

impl NapInterval {
    pub const fn closed(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    pub const fn open(start: NaiveDateTime) -> Self {
        Self { start, end: None }
    }

    pub const fn is_still_asleep(&self) -> bool {
        self.end.is_none()
    }

    /// End of the nap, or `now` for an open nap. Never earlier than `start`.
    pub fn effective_end(&self, now: NaiveDateTime) -> NaiveDateTime {
        self.end.unwrap_or(now).max(self.start)
    }

    /// Whole minutes slept; open naps are measured against `now`.
    pub fn duration_minutes(&self, now: NaiveDateTime) -> i64 {
        (self.effective_end(now) - self.start).num_minutes()
    }

    /// The calendar date a nap belongs to.
    pub fn date(&self) -> NaiveDate {
        self.start.date()
    }

    /// True when the nap starts and ends on different calendar dates.
    pub fn is_overnight(&self, now: NaiveDateTime) -> bool {
        self.start.date() != self.effective_end(now).date()
    }

    pub fn is_long_sleep(&self, now: NaiveDateTime) -> bool {
        self.duration_minutes(now) > LONG_SLEEP_MINUTES
    }

    /// Freezes the time-dependent tags at `now` for display.
    pub fn snapshot(&self, now: NaiveDateTime) -> NapSnapshot {
        NapSnapshot {
            start: self.start,
            end: self.end,
            still_asleep: self.is_still_asleep(),
            duration_minutes: self.duration_minutes(now),
            overnight: self.is_overnight(now),
            long_sleep: self.is_long_sleep(now),
        }
    }
}

/// A nap with its tags evaluated at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NapSnapshot {
    pub start: NaiveDateTime,
    pub end: Option<NaiveDateTime>,
    pub still_asleep: bool,
    pub duration_minutes: i64,
    pub overnight: bool,
    pub long_sleep: bool,
}

/// Why a sleep marker was flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    /// `asleep` not immediately followed by `awake`.
    AsleepWithoutWake,
    /// `awake` not immediately preceded by `asleep`.
    AwakeWithoutSleep,
    /// An unmatched `asleep` replaced by a later one during reconciliation.
    SupersededAsleep,
}

/// An unpaired sleep marker. Advisory only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SleepAnomaly {
    pub timestamp: NaiveDateTime,
    pub activity: Activity,
    pub kind: AnomalyKind,
}

/// Output of [`reconcile`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Naps in start order. At most one is open, and it is last.
    pub intervals: Vec<NapInterval>,
    /// Markers discarded while pairing.
    pub anomalies: Vec<SleepAnomaly>,
}

impl Reconciliation {
    pub fn open_interval(&self) -> Option<&NapInterval> {
        self.intervals.iter().find(|i| i.is_still_asleep())
    }
}

/// Stable-sorts events by timestamp, keeping file order for ties.
pub(crate) fn chronological(events: &[Event]) -> Vec<&Event> {
    let mut sorted: Vec<&Event> = events.iter().collect();
    sorted.sort_by_key(|e| e.timestamp);
    sorted
}

/// Pairs sleep markers into naps.
///
/// Two `asleep` markers in a row keep the newer one; the older is reported as
/// [`AnomalyKind::SupersededAsleep`]. An `awake` with nothing pending is
/// reported as [`AnomalyKind::AwakeWithoutSleep`] and dropped.
pub fn reconcile(events: &[Event]) -> Reconciliation {
    let mut markers: Vec<&Event> = events
        .iter()
        .filter(|e| e.activity.is_sleep_marker())
        .collect();
    markers.sort_by_key(|e| e.timestamp);

    let mut result = Reconciliation::default();
    let mut pending: Option<NaiveDateTime> = None;

    for event in markers {
        match event.activity {
            Activity::Asleep => {
                if let Some(previous) = pending.replace(event.timestamp) {
                    tracing::debug!(%previous, "discarding unmatched asleep");
                    result.anomalies.push(SleepAnomaly {
                        timestamp: previous,
                        activity: Activity::Asleep,
                        kind: AnomalyKind::SupersededAsleep,
                    });
                }
            }
            Activity::Awake => match pending.take() {
                Some(start) => result
                    .intervals
                    .push(NapInterval::closed(start, event.timestamp)),
                None => {
                    tracing::debug!(timestamp = %event.timestamp, "awake without asleep");
                    result.anomalies.push(SleepAnomaly {
                        timestamp: event.timestamp,
                        activity: Activity::Awake,
                        kind: AnomalyKind::AwakeWithoutSleep,
                    });
                }
            },
            _ => {}
        }
    }

    if let Some(start) = pending {
        result.intervals.push(NapInterval::open(start));
    }

    result
}

/// Flags every sleep marker whose chronological neighbour is not its partner.
///
/// Runs over the whole event stream: an `asleep` followed by a feeding is
/// flagged even if an `awake` comes later.
pub fn detect_anomalies(events: &[Event]) -> Vec<SleepAnomaly> {
    let sorted = chronological(events);
    let mut anomalies = Vec::new();

    for (i, event) in sorted.iter().enumerate() {
        let kind = match event.activity {
            Activity::Asleep => {
                let next = sorted.get(i + 1).map(|e| &e.activity);
                (next != Some(&Activity::Awake)).then_some(AnomalyKind::AsleepWithoutWake)
            }
            Activity::Awake => {
                let prev = i.checked_sub(1).map(|j| &sorted[j].activity);
                (prev != Some(&Activity::Asleep)).then_some(AnomalyKind::AwakeWithoutSleep)
            }
            _ => None,
        };

        if let Some(kind) = kind {
            anomalies.push(SleepAnomaly {
                timestamp: event.timestamp,
                activity: event.activity.clone(),
                kind,
            });
        }
    }

    anomalies
}

/// Drops naps bounded by an anomalous marker.
///
/// The open nap is always kept: its `asleep` has no partner yet, which is
/// expected while the baby is still asleep.
pub fn exclude_anomalous(
    intervals: &[NapInterval],
    anomalies: &[SleepAnomaly],
) -> Vec<NapInterval> {
    intervals
        .iter()
        .filter(|interval| {
            !anomalies.iter().any(|a| match a.kind {
                AnomalyKind::AsleepWithoutWake => {
                    interval.end.is_some() && a.timestamp == interval.start
                }
                AnomalyKind::AwakeWithoutSleep => Some(a.timestamp) == interval.end,
                AnomalyKind::SupersededAsleep => false,
            })
        })
        .copied()
        .collect()
}
