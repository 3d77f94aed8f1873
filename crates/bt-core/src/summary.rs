//! Per-day aggregation of events and naps.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::activity::Activity;
use crate::event::Event;
use crate::reconcile::NapInterval;
use crate::stats::Stats;

/// Statistics for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub wet_diapers: u32,
    pub dirty_diapers: u32,
    pub feedings: u32,
    /// Only feedings with a recorded volume contribute.
    pub feeding_volume_ml: Stats,
    /// Count of `asleep` events, resolved or not.
    pub naps: u32,
    /// Naps starting this day, overnight naps excluded.
    pub nap_minutes: Stats,
    pub long_sleeps: u32,
    /// Asleep at `now` for today, at midnight ending the day for past days.
    pub currently_asleep: bool,
    /// Measured at the same instant as `currently_asleep`. `Some(0)` while
    /// asleep, `None` when no nap had been recorded by then.
    pub minutes_since_last_nap: Option<i64>,
}

/// Summarizes `date` from the full event history and its reconciled naps.
///
/// Events and naps are attributed to the date of their own (start) timestamp.
/// The asleep flag and time since the last nap are taken at the end of
/// `date`, or at `now` if that comes first.
#[allow(clippy::cast_precision_loss)]
pub fn summarize(
    date: NaiveDate,
    events: &[Event],
    intervals: &[NapInterval],
    now: NaiveDateTime,
) -> DailySummary {
    let mut wet_diapers = 0;
    let mut dirty_diapers = 0;
    let mut feedings = 0;
    let mut naps = 0;
    let mut volumes = Vec::new();

    for event in events.iter().filter(|e| e.date() == date) {
        if event.activity.is_wet() {
            wet_diapers += 1;
        }
        if event.activity.is_dirty() {
            dirty_diapers += 1;
        }
        match event.activity {
            Activity::Feeding => {
                feedings += 1;
                volumes.extend(event.volume_ml());
            }
            Activity::Asleep => naps += 1,
            _ => {}
        }
    }

    let days_naps: Vec<&NapInterval> = intervals.iter().filter(|i| i.date() == date).collect();
    let nap_durations: Vec<f64> = days_naps
        .iter()
        .filter(|i| !i.is_overnight(now))
        .map(|i| i.duration_minutes(now) as f64)
        .collect();
    let long_sleeps = days_naps.iter().filter(|i| i.is_long_sleep(now)).count();

    let as_of = now.min(end_of_day(date));
    let currently_asleep = asleep_at(intervals, as_of);

    DailySummary {
        date,
        wet_diapers,
        dirty_diapers,
        feedings,
        feeding_volume_ml: Stats::from_values(&volumes),
        naps,
        nap_minutes: Stats::from_values(&nap_durations),
        long_sleeps: u32::try_from(long_sleeps).unwrap_or(u32::MAX),
        currently_asleep,
        minutes_since_last_nap: minutes_since_last_nap(intervals, as_of),
    }
}

/// Midnight at the end of `date`.
fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    (date + Duration::days(1)).and_time(NaiveTime::MIN)
}

/// Whether some nap had started by `at` and had not ended yet.
fn asleep_at(intervals: &[NapInterval], at: NaiveDateTime) -> bool {
    intervals.iter().any(|i| i.start <= at && i.end.is_none_or(|end| end > at))
}

/// Minutes between the most recent wake-up and `at`.
///
/// Zero while asleep, `None` when no nap had ended by `at`.
pub fn minutes_since_last_nap(intervals: &[NapInterval], at: NaiveDateTime) -> Option<i64> {
    if asleep_at(intervals, at) {
        return Some(0);
    }
    intervals
        .iter()
        .filter_map(|i| i.end)
        .filter(|end| *end <= at)
        .max()
        .map(|end| (at - end).num_minutes())
}
