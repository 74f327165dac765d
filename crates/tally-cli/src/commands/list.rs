//! List command: the month view.
//!
//! Renders one card per session whose start falls in the selected month,
//! in the order the sessions were recorded.

use std::fmt::Display;
use std::io::Write;

use anyhow::{Context, Result};
use chrono::{NaiveDate, TimeZone};
use serde::Serialize;
use tally_core::time::{format_clock, format_date, format_duration};
use tally_core::{TimeEntry, entries_in_month};

#[derive(Debug, Serialize)]
struct MonthJson<'a> {
    year: i32,
    month: u32,
    entries: Vec<&'a TimeEntry>,
}

/// Formats one entry as a single-line card.
fn format_card<Tz>(entry: &TimeEntry, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let start = entry.start_time.with_timezone(tz);
    let end = entry.end_time.map_or_else(
        || "Running...".to_string(),
        |t| format!("to {}", format_clock(&t.with_timezone(tz))),
    );
    let duration = match entry.duration {
        Some(secs) if secs > 0 => format_duration(secs),
        _ => "--".to_string(),
    };
    format!(
        "{:<18} {} {:<11} {:>8}  {}",
        format_date(start.date_naive()),
        format_clock(&start),
        end,
        duration,
        entry.id
    )
}

pub fn run<W, Tz>(
    writer: &mut W,
    entries: &[TimeEntry],
    year: i32,
    month: u32,
    tz: &Tz,
    json: bool,
) -> Result<()>
where
    W: Write,
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let filtered = entries_in_month(entries, year, month, tz);

    if json {
        let output = MonthJson {
            year,
            month,
            entries: filtered,
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&output)?)?;
        return Ok(());
    }

    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .with_context(|| format!("invalid month: {year}-{month}"))?;
    writeln!(writer, "{}", first.format("%B %Y"))?;
    writeln!(writer, "Time Entries ({})", filtered.len())?;

    if filtered.is_empty() {
        writeln!(writer, "No time entries yet. Start tracking!")?;
        return Ok(());
    }

    writeln!(writer)?;
    for entry in filtered {
        writeln!(writer, "{}", format_card(entry, tz).trim_end())?;
    }

    Ok(())
}
