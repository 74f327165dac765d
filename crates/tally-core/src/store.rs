//! The entry store: owner of the time entry collection.
//!
//! Entries are kept in insertion order and mirrored, as a JSON array, into a
//! [`KeyValueStore`] under a single key. The mirror is written after every
//! mutation, but never before [`EntryStore::load`] has run, so a fresh
//! store cannot clobber persisted data with an empty list.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::entry::{EntryPatch, TimeEntry};
use crate::storage::{KeyValueStore, StorageError};
use crate::types::EntryId;

/// Default key the collection is stored under.
pub const STORAGE_KEY: &str = "timeEntries";

/// Entry store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// `start` was called while another session is running.
    #[error("a timer is already running (entry {id})")]
    AlreadyRunning { id: EntryId },
    /// `stop` was called with no running session.
    #[error("no timer is running")]
    NotRunning,
    /// The collection could not be serialized.
    #[error("failed to serialize time entries: {0}")]
    Serialize(#[from] serde_json::Error),
    /// The backend rejected the write. The in-memory change is kept.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Outcome of [`EntryStore::toggle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toggled {
    Started(TimeEntry),
    Stopped(TimeEntry),
}

/// Owned collection of time entries backed by a key-value store.
#[derive(Debug)]
pub struct EntryStore<S> {
    storage: S,
    key: String,
    entries: Vec<TimeEntry>,
    loaded: bool,
}

impl<S: KeyValueStore> EntryStore<S> {
    /// Creates an unloaded store using the default key.
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, STORAGE_KEY)
    }

    /// Creates an unloaded store using a custom key.
    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            entries: Vec::new(),
            loaded: false,
        }
    }

    /// Creates a store and loads it immediately.
    pub fn open(storage: S, key: impl Into<String>) -> Self {
        let mut store = Self::with_key(storage, key);
        store.load();
        store
    }

    /// Reads the persisted collection.
    ///
    /// Missing data yields an empty collection. Data that is not a JSON array
    /// is logged and also yields an empty collection; this never fails.
    /// Individual records that do not decode are skipped with a warning.
    ///
    /// If the backend itself cannot be read, the collection is left empty and
    /// the store stays unloaded, so no later mutation overwrites the stored
    /// value. Check [`is_loaded`](Self::is_loaded) before relying on writes.
    pub fn load(&mut self) {
        let raw = match self.storage.get(&self.key) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!(key = %self.key, error = %e, "error reading time entries");
                self.entries.clear();
                return;
            }
        };
        self.entries = raw.map_or_else(Vec::new, |raw| {
            decode_entries(&raw).unwrap_or_else(|e| {
                tracing::error!(key = %self.key, error = %e, "error loading time entries");
                Vec::new()
            })
        });
        self.loaded = true;
        tracing::debug!(count = self.entries.len(), "loaded time entries");
    }

    /// Whether [`load`](Self::load) has read the backend successfully.
    pub const fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// All entries in insertion order.
    pub fn entries(&self) -> &[TimeEntry] {
        &self.entries
    }

    /// The underlying backend.
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Consumes the store, returning the backend.
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Appends an entry. No uniqueness or single-active checks are made.
    pub fn add_entry(&mut self, entry: TimeEntry) -> Result<(), StoreError> {
        self.entries.push(entry);
        self.persist()
    }

    /// Merges `patch` into the entry with `id`.
    ///
    /// Returns `false`, and writes nothing, when no entry matches.
    pub fn update_entry(&mut self, id: &str, patch: &EntryPatch) -> Result<bool, StoreError> {
        let Some(entry) = self.entries.iter_mut().find(|e| e.id.as_str() == id) else {
            return Ok(false);
        };
        entry.apply(patch);
        self.persist()?;
        Ok(true)
    }

    /// Removes the entry with `id`.
    ///
    /// Returns `false`, and writes nothing, when no entry matches.
    pub fn delete_entry(&mut self, id: &str) -> Result<bool, StoreError> {
        let before = self.entries.len();
        self.entries.retain(|e| e.id.as_str() != id);
        if self.entries.len() == before {
            return Ok(false);
        }
        self.persist()?;
        Ok(true)
    }

    /// The first running entry, in collection order.
    pub fn active_entry(&self) -> Option<&TimeEntry> {
        self.entries.iter().find(|e| e.is_active)
    }

    /// Starts a new session at `now`.
    ///
    /// Fails with [`StoreError::AlreadyRunning`] if a session is active.
    pub fn start(&mut self, now: DateTime<Utc>) -> Result<TimeEntry, StoreError> {
        if let Some(active) = self.active_entry() {
            return Err(StoreError::AlreadyRunning {
                id: active.id.clone(),
            });
        }
        let entry = TimeEntry::start(now);
        tracing::debug!(id = %entry.id, start = %entry.start_time, "starting session");
        self.add_entry(entry.clone())?;
        Ok(entry)
    }

    /// Stops the running session at `now`.
    ///
    /// Fails with [`StoreError::NotRunning`] if nothing is active.
    pub fn stop(&mut self, now: DateTime<Utc>) -> Result<TimeEntry, StoreError> {
        let Some(index) = self.entries.iter().position(|e| e.is_active) else {
            return Err(StoreError::NotRunning);
        };
        let patch = EntryPatch::stop(self.entries[index].start_time, now);
        self.entries[index].apply(&patch);
        let entry = self.entries[index].clone();
        tracing::debug!(id = %entry.id, duration = ?entry.duration, "stopped session");
        self.persist()?;
        Ok(entry)
    }

    /// Stops the running session if there is one, otherwise starts one.
    pub fn toggle(&mut self, now: DateTime<Utc>) -> Result<Toggled, StoreError> {
        if self.active_entry().is_some() {
            self.stop(now).map(Toggled::Stopped)
        } else {
            self.start(now).map(Toggled::Started)
        }
    }

    /// Writes the full collection to the backend, once loaded.
    fn persist(&mut self) -> Result<(), StoreError> {
        if !self.loaded {
            tracing::debug!("store not loaded yet; skipping write");
            return Ok(());
        }
        let json = serde_json::to_string(&self.entries)?;
        self.storage.set(&self.key, &json)?;
        Ok(())
    }
}

/// Decodes a stored array, dropping records that are not valid entries.
fn decode_entries(raw: &str) -> Result<Vec<TimeEntry>, serde_json::Error> {
    let records: Vec<serde_json::Value> = serde_json::from_str(raw)?;
    let entries = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| {
            serde_json::from_value::<TimeEntry>(record)
                .inspect_err(|e| tracing::warn!(index, error = %e, "skipping invalid time entry"))
                .ok()
        })
        .collect();
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::{Duration, NaiveDate};

    use crate::storage::MemoryStore;
    use crate::time::format_duration;

    fn ts(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn entry(id: &str, start: &str, active: bool) -> TimeEntry {
        let start_time = ts(start);
        let (end_time, duration) = if active {
            (None, None)
        } else {
            (Some(start_time + Duration::minutes(30)), Some(1800))
        };
        TimeEntry {
            id: EntryId::new(id).unwrap(),
            date: start_time.date_naive(),
            start_time,
            end_time,
            duration,
            is_active: active,
        }
    }

    fn loaded_store() -> EntryStore<MemoryStore> {
        EntryStore::open(MemoryStore::new(), STORAGE_KEY)
    }

    fn stored_entries(store: &EntryStore<MemoryStore>) -> Vec<TimeEntry> {
        let raw = store.storage().get(STORAGE_KEY).unwrap().unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    #[test]
    fn test_initialises_empty() {
        let store = loaded_store();
        assert!(store.entries().is_empty());
        assert!(store.active_entry().is_none());
        assert_eq!(store.storage().write_count(), 0);
    }

    #[test]
    fn test_add_entry_appends_and_persists() {
        let mut store = loaded_store();
        let e = entry("test-id", "2025-01-15T09:00:00.000Z", true);
        store.add_entry(e.clone()).unwrap();

        assert_eq!(store.entries(), [e.clone()]);
        assert_eq!(stored_entries(&store), vec![e]);
    }

    #[test]
    fn test_add_keeps_insertion_order() {
        let mut store = loaded_store();
        store.add_entry(entry("b", "2025-01-15T10:00:00Z", false)).unwrap();
        store.add_entry(entry("a", "2025-01-15T08:00:00Z", false)).unwrap();
        store.add_entry(entry("c", "2025-01-15T09:00:00Z", false)).unwrap();

        let ids: Vec<_> = store.entries().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["b", "a", "c"]);
    }

    #[test]
    fn test_update_entry_merges_fields() {
        let mut store = loaded_store();
        store
            .add_entry(entry("test-id", "2025-01-15T09:00:00.000Z", true))
            .unwrap();

        let updated = store
            .update_entry(
                "test-id",
                &EntryPatch {
                    end_time: Some(Some(ts("2025-01-15T10:00:00.000Z"))),
                    duration: Some(Some(3600)),
                    is_active: Some(false),
                    ..EntryPatch::default()
                },
            )
            .unwrap();

        assert!(updated);
        let e = &store.entries()[0];
        assert_eq!(e.end_time, Some(ts("2025-01-15T10:00:00Z")));
        assert_eq!(e.duration, Some(3600));
        assert!(!e.is_active);
        assert_eq!(e.start_time, ts("2025-01-15T09:00:00Z"));
        assert_eq!(e.date, NaiveDate::from_ymd_opt(2025, 1, 15).unwrap());
        assert_eq!(stored_entries(&store)[0], *e);
    }

    #[test]
    fn test_update_unknown_id_is_noop() {
        let mut store = loaded_store();
        let e = entry("test-id", "2025-01-15T09:00:00Z", true);
        store.add_entry(e.clone()).unwrap();
        let writes = store.storage().write_count();

        let updated = store
            .update_entry(
                "missing",
                &EntryPatch {
                    is_active: Some(false),
                    ..EntryPatch::default()
                },
            )
            .unwrap();

        assert!(!updated);
        assert_eq!(store.entries(), [e]);
        assert_eq!(store.storage().write_count(), writes);
    }

    #[test]
    fn test_delete_entry() {
        let mut store = loaded_store();
        store.add_entry(entry("a", "2025-01-15T08:00:00Z", false)).unwrap();
        store.add_entry(entry("b", "2025-01-15T09:00:00Z", false)).unwrap();
        store.add_entry(entry("c", "2025-01-15T10:00:00Z", false)).unwrap();

        assert!(store.delete_entry("b").unwrap());

        let ids: Vec<_> = store.entries().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["a", "c"]);
        assert_eq!(stored_entries(&store).len(), 2);
    }

    #[test]
    fn test_delete_unknown_id_is_noop() {
        let mut store = loaded_store();
        store.add_entry(entry("a", "2025-01-15T08:00:00Z", false)).unwrap();

        assert!(!store.delete_entry("missing").unwrap());
        assert_eq!(store.entries().len(), 1);
    }

    #[test]
    fn test_active_entry_returns_first_active() {
        let mut store = loaded_store();
        let inactive = entry("inactive-id", "2025-01-15T08:00:00.000Z", false);
        let active = entry("active-id", "2025-01-15T09:00:00.000Z", true);
        let later = entry("later-id", "2025-01-15T10:00:00.000Z", true);
        store.add_entry(inactive).unwrap();
        store.add_entry(active.clone()).unwrap();
        store.add_entry(later).unwrap();

        assert_eq!(store.active_entry(), Some(&active));
    }

    #[test]
    fn test_load_reads_stored_entries() {
        let raw = r#"[{"id":"stored-id","date":"2025-01-15","startTime":"2025-01-15T09:00:00.000Z","endTime":"2025-01-15T10:00:00.000Z","duration":3600,"isActive":false}]"#;
        let store = EntryStore::open(MemoryStore::with_value(STORAGE_KEY, raw), STORAGE_KEY);

        assert_eq!(store.entries().len(), 1);
        assert_eq!(store.entries()[0].id.as_str(), "stored-id");
        assert_eq!(store.entries()[0].duration, Some(3600));
    }

    #[test]
    fn test_load_malformed_yields_empty() {
        let mut store = EntryStore::new(MemoryStore::with_value(STORAGE_KEY, "{not json"));
        store.load();

        assert!(store.is_loaded());
        assert!(store.entries().is_empty());
    }

    #[test]
    fn test_load_wrong_shape_yields_empty() {
        let store = EntryStore::open(
            MemoryStore::with_value(STORAGE_KEY, r#"{"id":"x"}"#),
            STORAGE_KEY,
        );
        assert!(store.entries().is_empty());
    }

    #[test]
    fn test_load_skips_invalid_records() {
        let raw = r#"[
            {"id":"","date":"2025-01-14","startTime":"2025-01-14T09:00:00.000Z","endTime":null,"duration":null,"isActive":false},
            {"id":"good","date":"2025-01-15","startTime":"2025-01-15T09:00:00.000Z","endTime":"2025-01-15T10:00:00.000Z","duration":3600,"isActive":false},
            {"id":"no-start","date":"2025-01-15","isActive":false}
        ]"#;
        let store = EntryStore::open(MemoryStore::with_value(STORAGE_KEY, raw), STORAGE_KEY);

        assert!(store.is_loaded());
        let ids: Vec<_> = store.entries().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["good"]);
    }

    #[test]
    fn test_read_failure_keeps_stored_history() {
        let raw = r#"[{"id":"old-1","date":"2025-01-14","startTime":"2025-01-14T09:00:00.000Z","endTime":"2025-01-14T10:00:00.000Z","duration":3600,"isActive":false}]"#;
        let mut store = EntryStore::open(MemoryStore::unreadable(STORAGE_KEY, raw), STORAGE_KEY);

        assert!(!store.is_loaded());
        assert!(store.entries().is_empty());

        store.start(ts("2025-01-15T09:00:00Z")).unwrap();

        assert_eq!(store.storage().write_count(), 0);
        assert_eq!(store.storage().stored(STORAGE_KEY), Some(raw));
    }

    #[test]
    fn test_no_write_before_load() {
        let raw = r#"[{"id":"stored-id","date":"2025-01-15","startTime":"2025-01-15T09:00:00.000Z","endTime":null,"duration":null,"isActive":true}]"#;
        let mut store = EntryStore::new(MemoryStore::with_value(STORAGE_KEY, raw));

        store
            .add_entry(entry("early", "2025-01-15T08:00:00Z", false))
            .unwrap();

        assert_eq!(store.storage().write_count(), 0);
        assert_eq!(
            store.storage().get(STORAGE_KEY).unwrap().as_deref(),
            Some(raw)
        );
    }

    #[test]
    fn test_persistence_round_trip() {
        let mut store = loaded_store();
        let e = entry("test-id", "2025-01-15T09:00:00.000Z", true);
        store.add_entry(e.clone()).unwrap();

        let reloaded = EntryStore::open(store.into_storage(), STORAGE_KEY);
        assert_eq!(reloaded.entries(), [e]);
    }

    #[test]
    fn test_custom_key() {
        let mut store = EntryStore::open(MemoryStore::new(), "work");
        store
            .add_entry(entry("a", "2025-01-15T08:00:00Z", false))
            .unwrap();

        assert!(store.storage().get(STORAGE_KEY).unwrap().is_none());
        assert!(store.storage().get("work").unwrap().is_some());
    }

    #[test]
    fn test_start_stop_scenario() {
        let mut store = loaded_store();
        let t0 = ts("2025-01-15T09:00:00.000Z");

        let started = store.start(t0).unwrap();
        assert!(started.is_active);
        assert_eq!(store.active_entry(), Some(&started));

        let stopped = store.stop(t0 + Duration::seconds(65)).unwrap();
        assert_eq!(stopped.id, started.id);
        assert_eq!(stopped.duration, Some(65));
        assert!(!stopped.is_active);
        assert_eq!(stopped.end_time, Some(ts("2025-01-15T09:01:05.000Z")));
        assert_eq!(format_duration(65), "0h 1m");
        assert!(store.active_entry().is_none());
        assert_eq!(stored_entries(&store), vec![stopped]);
    }

    #[test]
    fn test_start_rejects_second_session() {
        let mut store = loaded_store();
        let first = store.start(ts("2025-01-15T09:00:00Z")).unwrap();

        let err = store.start(ts("2025-01-15T09:05:00Z")).unwrap_err();
        assert!(matches!(err, StoreError::AlreadyRunning { ref id } if *id == first.id));
        assert_eq!(store.entries().len(), 1);
    }

    #[test]
    fn test_stop_without_session_fails() {
        let mut store = loaded_store();
        assert!(matches!(
            store.stop(ts("2025-01-15T09:00:00Z")),
            Err(StoreError::NotRunning)
        ));
    }

    #[test]
    fn test_toggle_alternates() {
        let mut store = loaded_store();
        let t0 = ts("2025-01-15T09:00:00Z");

        let Toggled::Started(started) = store.toggle(t0).unwrap() else {
            panic!("expected a started session");
        };
        let Toggled::Stopped(stopped) = store.toggle(t0 + Duration::hours(1)).unwrap() else {
            panic!("expected a stopped session");
        };
        assert_eq!(started.id, stopped.id);
        assert_eq!(stopped.duration, Some(3600));
    }

    #[test]
    fn test_write_failure_is_reported_but_kept_in_memory() {
        let mut store = EntryStore::open(MemoryStore::failing_writes(), STORAGE_KEY);
        let err = store
            .add_entry(entry("a", "2025-01-15T08:00:00Z", false))
            .unwrap_err();

        assert!(matches!(err, StoreError::Storage(_)));
        assert_eq!(store.entries().len(), 1);
    }

    #[test]
    fn test_count_matches_adds_minus_deletes() {
        let mut store = loaded_store();
        for i in 0..5 {
            store
                .add_entry(entry(&format!("e{i}"), "2025-01-15T08:00:00Z", false))
                .unwrap();
        }
        store.delete_entry("e1").unwrap();
        store.delete_entry("e3").unwrap();
        store.delete_entry("e3").unwrap();

        let ids: Vec<_> = store.entries().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["e0", "e2", "e4"]);
    }
}
