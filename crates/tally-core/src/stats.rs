//! Derived statistics over the entry collection.
//!
//! Buckets are half-open windows `[start, end)` computed in the caller's time
//! zone. An entry falls into a bucket when its start time does.

use chrono::{
    DateTime, Datelike, Duration, LocalResult, Months, NaiveDate, NaiveTime, TimeZone, Utc,
    Weekday,
};
use serde::{Deserialize, Serialize};

use crate::entry::TimeEntry;

/// First day of the week for the weekly bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

impl WeekStart {
    /// The weekday the week begins on.
    pub const fn weekday(self) -> Weekday {
        match self {
            Self::Sunday => Weekday::Sun,
            Self::Monday => Weekday::Mon,
        }
    }

    /// Days elapsed since the start of the week containing `day`.
    fn days_into_week(self, day: Weekday) -> u32 {
        let start = self.weekday().num_days_from_sunday();
        (day.num_days_from_sunday() + 7 - start) % 7
    }
}

/// A half-open UTC interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    /// Whether `instant` lies within `[start, end)`.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }
}

/// Total time and entry count for one bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BucketTotals {
    /// Sum of completed durations, in seconds.
    pub seconds: i64,
    /// Number of entries, running ones included.
    pub count: usize,
}

impl BucketTotals {
    fn add(&mut self, entry: &TimeEntry) {
        self.seconds += entry.counted_duration();
        self.count += 1;
    }
}

/// Aggregated statistics for the home view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub today: BucketTotals,
    pub week: BucketTotals,
    pub month: BucketTotals,
    /// Every entry regardless of date.
    pub total: BucketTotals,
}

// ========== Window Calculation ==========

/// Converts midnight at the start of `date` in `tz` to UTC.
///
/// Ambiguous midnights (DST fall-back) take the earlier instant. A midnight
/// skipped by a spring-forward gap resolves to 01:00.
fn midnight_to_utc<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    match tz.from_local_datetime(&midnight) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        LocalResult::None => {
            let one_am = midnight + Duration::hours(1);
            tz.from_local_datetime(&one_am).earliest().map_or_else(
                || Utc.from_utc_datetime(&midnight),
                |dt| dt.with_timezone(&Utc),
            )
        }
    }
}

fn days_window<Tz: TimeZone>(tz: &Tz, first: NaiveDate, last_exclusive: NaiveDate) -> Window {
    Window {
        start: midnight_to_utc(tz, first),
        end: midnight_to_utc(tz, last_exclusive),
    }
}

/// The calendar day containing `now`.
pub fn day_window<Tz: TimeZone>(now: &DateTime<Tz>) -> Window {
    let today = now.date_naive();
    days_window(&now.timezone(), today, today + Duration::days(1))
}

/// The week containing `now`, beginning on `week_start`.
pub fn week_window<Tz: TimeZone>(now: &DateTime<Tz>, week_start: WeekStart) -> Window {
    let today = now.date_naive();
    let first = today - Duration::days(i64::from(week_start.days_into_week(today.weekday())));
    days_window(&now.timezone(), first, first + Duration::days(7))
}

/// The calendar month containing `now`.
pub fn month_window<Tz: TimeZone>(now: &DateTime<Tz>) -> Window {
    let today = now.date_naive();
    let first = today.with_day(1).unwrap_or(today);
    let next = first.checked_add_months(Months::new(1)).unwrap_or(first);
    days_window(&now.timezone(), first, next)
}

// ========== Aggregation ==========

/// Computes today/week/month/overall totals relative to `now`.
pub fn compute_stats<Tz: TimeZone>(
    entries: &[TimeEntry],
    now: &DateTime<Tz>,
    week_start: WeekStart,
) -> Stats {
    let day = day_window(now);
    let week = week_window(now, week_start);
    let month = month_window(now);

    let mut stats = Stats {
        today: BucketTotals::default(),
        week: BucketTotals::default(),
        month: BucketTotals::default(),
        total: BucketTotals::default(),
    };
    for entry in entries {
        if day.contains(entry.start_time) {
            stats.today.add(entry);
        }
        if week.contains(entry.start_time) {
            stats.week.add(entry);
        }
        if month.contains(entry.start_time) {
            stats.month.add(entry);
        }
        stats.total.add(entry);
    }
    stats
}

/// Entries whose start falls in `month` (1-12) of `year`, as seen in `tz`.
///
/// Collection order is preserved.
pub fn entries_in_month<'a, Tz: TimeZone>(
    entries: &'a [TimeEntry],
    year: i32,
    month: u32,
    tz: &Tz,
) -> Vec<&'a TimeEntry> {
    entries
        .iter()
        .filter(|e| {
            let local = e.start_time.with_timezone(tz);
            local.year() == year && local.month() == month
        })
        .collect()
}
