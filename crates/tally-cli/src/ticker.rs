//! A periodic refresh scoped to the view that owns it.
//!
//! The tick task is aborted when the [`Ticker`] is dropped, so a view that
//! goes away never leaves a timer behind.

use std::ops::ControlFlow;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Refresh interval of the live elapsed display.
pub const REFRESH_INTERVAL: Duration = Duration::from_secs(1);

/// Calls a closure on a fixed interval until it breaks or the ticker drops.
#[derive(Debug)]
pub struct Ticker {
    handle: JoinHandle<()>,
}

impl Ticker {
    /// Spawns the tick task on the current tokio runtime.
    ///
    /// The first tick fires immediately.
    pub fn spawn<F>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() -> ControlFlow<()> + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                if on_tick().is_break() {
                    break;
                }
            }
        });
        Self { handle }
    }

    /// Waits until the closure breaks out of the loop.
    pub async fn finished(&mut self) {
        if let Err(e) = (&mut self.handle).await {
            if e.is_panic() {
                tracing::error!("ticker task panicked");
            }
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
