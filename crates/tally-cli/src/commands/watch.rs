//! Watch command: a live elapsed-time display for the running session.

use std::io::Write;
use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tally_core::TimeEntry;
use tally_core::time::{elapsed_seconds, format_elapsed};

use crate::ticker::{REFRESH_INTERVAL, Ticker};

/// Redraws the elapsed time every second until ctrl-c or `ticks` refreshes.
pub fn run<W>(writer: W, active: Option<&TimeEntry>, ticks: Option<u64>) -> Result<()>
where
    W: Write + Send + 'static,
{
    let Some(entry) = active else {
        let mut writer = writer;
        writeln!(writer, "No timer running.")?;
        return Ok(());
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to initialize tokio runtime")?;
    runtime.block_on(watch(
        writer,
        entry.start_time,
        REFRESH_INTERVAL,
        ticks,
        Utc::now,
    ))
}

async fn watch<W, C>(
    writer: W,
    start: DateTime<Utc>,
    period: Duration,
    ticks: Option<u64>,
    clock: C,
) -> Result<()>
where
    W: Write + Send + 'static,
    C: Fn() -> DateTime<Utc> + Send + 'static,
{
    let writer = Arc::new(Mutex::new(writer));
    let tick_writer = Arc::clone(&writer);
    let mut remaining = ticks;

    let mut ticker = Ticker::spawn(period, move || {
        let line = format_elapsed(elapsed_seconds(start, clock()));
        let mut out = tick_writer.lock().unwrap_or_else(PoisonError::into_inner);
        if write!(out, "\r{line}").and_then(|()| out.flush()).is_err() {
            return ControlFlow::Break(());
        }
        if let Some(n) = remaining.as_mut() {
            if *n <= 1 {
                return ControlFlow::Break(());
            }
            *n -= 1;
        }
        ControlFlow::Continue(())
    });

    tokio::select! {
        () = ticker.finished() => {}
        result = tokio::signal::ctrl_c() => {
            result.context("failed to listen for ctrl-c")?;
            tracing::debug!("interrupted");
        }
    }
    drop(ticker);

    let mut out = writer.lock().unwrap_or_else(PoisonError::into_inner);
    writeln!(out)?;
    Ok(())
}
