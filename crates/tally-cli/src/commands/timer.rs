//! Start, stop and toggle commands.

use std::fmt::Display;
use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use tally_core::time::{format_clock, format_duration};
use tally_core::{EntryStore, KeyValueStore, TimeEntry, Toggled};

/// Starts a session at `now`.
pub fn start<W, S, Tz>(
    writer: &mut W,
    store: &mut EntryStore<S>,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Result<()>
where
    W: Write,
    S: KeyValueStore,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let entry = store.start(now).context("failed to start timer")?;
    write_started(writer, &entry, tz)
}

/// Stops the running session at `now`.
pub fn stop<W, S, Tz>(
    writer: &mut W,
    store: &mut EntryStore<S>,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Result<()>
where
    W: Write,
    S: KeyValueStore,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let entry = store.stop(now).context("failed to stop timer")?;
    write_stopped(writer, &entry, tz)
}

/// Stops the running session, or starts one when idle.
pub fn toggle<W, S, Tz>(
    writer: &mut W,
    store: &mut EntryStore<S>,
    now: DateTime<Utc>,
    tz: &Tz,
) -> Result<()>
where
    W: Write,
    S: KeyValueStore,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match store.toggle(now).context("failed to toggle timer")? {
        Toggled::Started(entry) => write_started(writer, &entry, tz),
        Toggled::Stopped(entry) => write_stopped(writer, &entry, tz),
    }
}

fn write_started<W: Write, Tz>(writer: &mut W, entry: &TimeEntry, tz: &Tz) -> Result<()>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    writeln!(
        writer,
        "Started {} at {}",
        entry.id,
        format_clock(&entry.start_time.with_timezone(tz))
    )?;
    Ok(())
}

fn write_stopped<W: Write, Tz>(writer: &mut W, entry: &TimeEntry, tz: &Tz) -> Result<()>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let end = entry
        .end_time
        .map(|t| format_clock(&t.with_timezone(tz)))
        .unwrap_or_default();
    writeln!(
        writer,
        "Stopped {} at {} ({})",
        entry.id,
        end,
        format_duration(entry.counted_duration())
    )?;
    Ok(())
}
