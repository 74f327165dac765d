//! Status command for showing the running session.

use std::fmt::Display;
use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use tally_core::TimeEntry;
use tally_core::time::{elapsed_seconds, format_clock, format_date, format_elapsed};

#[derive(Debug, Serialize)]
struct StatusJson<'a> {
    running: bool,
    entry: Option<&'a TimeEntry>,
    elapsed_seconds: Option<i64>,
    elapsed: Option<String>,
}

pub fn run<W, Tz>(
    writer: &mut W,
    active: Option<&TimeEntry>,
    now: DateTime<Utc>,
    tz: &Tz,
    json: bool,
) -> Result<()>
where
    W: Write,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let elapsed = active.map(|e| elapsed_seconds(e.start_time, now));

    if json {
        let status = StatusJson {
            running: active.is_some(),
            entry: active,
            elapsed_seconds: elapsed.map(|s| s.max(0)),
            elapsed: elapsed.map(format_elapsed),
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&status)?)?;
        return Ok(());
    }

    let (Some(entry), Some(elapsed)) = (active, elapsed) else {
        writeln!(writer, "No timer running.")?;
        return Ok(());
    };

    let start = entry.start_time.with_timezone(tz);
    writeln!(writer, "Timer running")?;
    writeln!(writer, "Entry:   {}", entry.id)?;
    writeln!(
        writer,
        "Started: {} {}",
        format_date(start.date_naive()),
        format_clock(&start)
    )?;
    writeln!(writer, "Elapsed: {}", format_elapsed(elapsed))?;

    Ok(())
}
