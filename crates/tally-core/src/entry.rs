//! Time entries - one tracked session each.

use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::time::calculate_duration;
use crate::types::EntryId;

/// A single tracked session, running or completed.
///
/// Field names and timestamp format match the persisted JSON
/// (`startTime`, `isActive`, `2025-01-15T09:00:00.000Z`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEntry {
    /// Stable identity, generated at creation.
    pub id: EntryId,

    /// UTC calendar day the session started.
    pub date: NaiveDate,

    /// When the session started.
    #[serde(serialize_with = "serialize_timestamp")]
    pub start_time: DateTime<Utc>,

    /// When the session ended; `None` while running.
    #[serde(default, serialize_with = "serialize_optional_timestamp")]
    pub end_time: Option<DateTime<Utc>>,

    /// Whole seconds between start and end; `None` while running.
    #[serde(default)]
    pub duration: Option<i64>,

    /// Whether this is the currently running session.
    pub is_active: bool,
}

impl TimeEntry {
    /// Creates a running entry starting at `now`.
    ///
    /// The start instant is truncated to millisecond precision so that the
    /// stored value survives a serialization round trip unchanged.
    pub fn start(now: DateTime<Utc>) -> Self {
        let start_time = now.trunc_subsecs(3);
        Self {
            id: EntryId::generate(),
            date: start_time.date_naive(),
            start_time,
            end_time: None,
            duration: None,
            is_active: true,
        }
    }

    /// Applies every field present in `patch`, leaving the rest unchanged.
    pub fn apply(&mut self, patch: &EntryPatch) {
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(start_time) = patch.start_time {
            self.start_time = start_time;
        }
        if let Some(end_time) = patch.end_time {
            self.end_time = end_time;
        }
        if let Some(duration) = patch.duration {
            self.duration = duration;
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
    }

    /// Duration to count in totals: running entries contribute zero.
    pub fn counted_duration(&self) -> i64 {
        self.duration.unwrap_or(0)
    }
}

/// A partial update for a [`TimeEntry`].
///
/// `None` leaves a field untouched. `end_time` and `duration` are nested
/// options so a patch can also clear them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryPatch {
    pub date: Option<NaiveDate>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<Option<DateTime<Utc>>>,
    pub duration: Option<Option<i64>>,
    pub is_active: Option<bool>,
}

impl EntryPatch {
    /// The patch that completes a session started at `start`.
    pub fn stop(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        let end = end.trunc_subsecs(3);
        Self {
            end_time: Some(Some(end)),
            duration: Some(Some(calculate_duration(start, end))),
            is_active: Some(false),
            ..Self::default()
        }
    }
}

fn serialize_timestamp<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}

#[allow(clippy::ref_option)] // serde passes `&Option<T>` to serialize_with
fn serialize_optional_timestamp<S: Serializer>(
    ts: &Option<DateTime<Utc>>,
    s: S,
) -> Result<S::Ok, S::Error> {
    match ts {
        Some(ts) => serialize_timestamp(ts, s),
        None => s.serialize_none(),
    }
}
