//! Stats command: today, this week and this month at a glance.

use std::io::Write;

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use tally_core::time::format_duration;
use tally_core::{BucketTotals, Stats, TimeEntry, WeekStart, compute_stats};

use super::util::sessions_label;

/// Stats payload for JSON output.
#[derive(Debug, Serialize)]
struct StatsJson {
    generated_at: DateTime<Utc>,
    timezone: String,
    week_start: WeekStart,
    #[serde(flatten)]
    stats: Stats,
}

fn bucket_line(label: &str, bucket: BucketTotals) -> String {
    format!(
        "{:<12}{:>9}  ({})\n",
        label,
        format_duration(bucket.seconds),
        sessions_label(bucket.count)
    )
}

/// Formats stats as human-readable text.
pub fn format_stats(stats: &Stats) -> String {
    let mut out = String::new();
    out.push_str(&bucket_line("Today", stats.today));
    out.push_str(&bucket_line("This Week", stats.week));
    out.push_str(&bucket_line("This Month", stats.month));
    out.push('\n');
    out.push_str(&format!(
        "Total time:     {}\n",
        format_duration(stats.total.seconds)
    ));
    out.push_str(&format!("Total sessions: {}\n", stats.total.count));
    out
}

pub fn run<W, Tz>(
    writer: &mut W,
    entries: &[TimeEntry],
    now: &DateTime<Tz>,
    week_start: WeekStart,
    timezone: &str,
    json: bool,
) -> Result<()>
where
    W: Write,
    Tz: TimeZone,
{
    let stats = compute_stats(entries, now, week_start);

    if json {
        let output = StatsJson {
            generated_at: now.with_timezone(&Utc),
            timezone: timezone.to_string(),
            week_start,
            stats,
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&output)?)?;
    } else {
        write!(writer, "{}", format_stats(&stats))?;
    }

    Ok(())
}
