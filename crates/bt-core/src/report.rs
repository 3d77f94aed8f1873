//! Multi-day summaries and the time-of-day sleep histogram.

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::event::Event;
use crate::reconcile::NapInterval;
use crate::summary::{DailySummary, summarize};

/// Width of one histogram bucket in minutes.
pub const BUCKET_MINUTES: u32 = 15;

/// Number of buckets in a day.
pub const BUCKETS_PER_DAY: usize = (24 * 60 / BUCKET_MINUTES) as usize;

/// One time-of-day bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBucket {
    /// Bucket start as `HH:MM`.
    pub time: String,
    pub count: u32,
    /// `count / observed_days`: the chance of being asleep at this time.
    pub fraction: f64,
}

/// Sleep occurrence by time of day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramTable {
    pub observed_days: u32,
    pub buckets: Vec<HistogramBucket>,
}

impl HistogramTable {
    pub fn bucket(&self, time: &str) -> Option<&HistogramBucket> {
        self.buckets.iter().find(|b| b.time == time)
    }
}

/// First day of a window of `days` days ending `today`.
fn window_start(days: u32, today: NaiveDate) -> NaiveDate {
    today - Duration::days(i64::from(days.max(1)) - 1)
}

/// One summary per calendar day, oldest first.
///
/// Covers the first event date (or the start of the `days` window, if later)
/// through today. Days without events appear as zero rows so charts keep a
/// continuous axis. Future-dated events get no row.
pub fn history(
    events: &[Event],
    intervals: &[NapInterval],
    days: Option<u32>,
    today: NaiveDate,
    now: NaiveDateTime,
) -> Vec<DailySummary> {
    let Some(first) = events.iter().map(Event::date).min() else {
        return Vec::new();
    };

    let future = events.iter().filter(|e| e.date() > today).count();
    if future > 0 {
        tracing::warn!(future, %today, "ignoring future-dated events in history");
    }

    let start = days.map_or(first, |d| first.max(window_start(d, today)));

    start
        .iter_days()
        .take_while(|date| *date <= today)
        .map(|date| summarize(date, events, intervals, now))
        .collect()
}

/// Builds the time-of-day histogram from closed naps.
///
/// Each nap increments every 15-minute bucket from its floored start through
/// its floored end, wrapping past midnight, at most once per bucket. With
/// `days`, only naps starting inside the window count.
#[allow(clippy::cast_precision_loss)]
pub fn sleep_histogram(
    events: &[Event],
    intervals: &[NapInterval],
    days: Option<u32>,
    today: NaiveDate,
) -> HistogramTable {
    let since = days.map(|d| window_start(d, today));
    let in_scope = |date: NaiveDate| since.is_none_or(|s| date >= s);

    let observed: BTreeSet<NaiveDate> = events
        .iter()
        .map(Event::date)
        .filter(|d| in_scope(*d))
        .collect();
    let observed_days = u32::try_from(observed.len()).unwrap_or(u32::MAX);

    let mut counts = [0_u32; BUCKETS_PER_DAY];
    for interval in intervals.iter().filter(|i| in_scope(i.date())) {
        let Some(end) = interval.end else {
            continue;
        };
        for bucket in spanned_buckets(interval.start, end) {
            counts[bucket] += 1;
        }
    }

    let buckets = counts
        .iter()
        .enumerate()
        .map(|(i, &count)| HistogramBucket {
            time: bucket_label(i),
            count,
            fraction: if observed_days == 0 {
                0.0
            } else {
                f64::from(count) / f64::from(observed_days)
            },
        })
        .collect();

    HistogramTable {
        observed_days,
        buckets,
    }
}

/// Bucket index of a timestamp's time of day.
fn bucket_index(ts: NaiveDateTime) -> usize {
    let minutes = ts.hour() * 60 + ts.minute();
    (minutes / BUCKET_MINUTES) as usize
}

/// Buckets covered by `[start, end]`, in order, each at most once.
fn spanned_buckets(start: NaiveDateTime, end: NaiveDateTime) -> impl Iterator<Item = usize> {
    let first = bucket_index(start);
    let start_floor = floor_to_bucket(start);
    let end_floor = floor_to_bucket(end.max(start));
    let steps = (end_floor - start_floor).num_minutes() / i64::from(BUCKET_MINUTES);
    let span = usize::try_from(steps + 1).unwrap_or(1).min(BUCKETS_PER_DAY);

    (0..span).map(move |offset| (first + offset) % BUCKETS_PER_DAY)
}

fn floor_to_bucket(ts: NaiveDateTime) -> NaiveDateTime {
    let minute = ts.minute() - ts.minute() % BUCKET_MINUTES;
    ts.date().and_time(NaiveTime::from_hms_opt(ts.hour(), minute, 0).unwrap_or(NaiveTime::MIN))
}

fn bucket_label(index: usize) -> String {
    let minutes = index * BUCKET_MINUTES as usize;
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}
