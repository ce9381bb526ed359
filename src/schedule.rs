//! Periodic background jobs

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, warn};

/// A job that runs every `period` on the tokio runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodicTask {
    name: String,
    period: Duration,
    immediate: bool,
}

impl PeriodicTask {
    /// A task whose first run is one full period after spawning.
    pub fn new(name: impl Into<String>, period: Duration) -> Self {
        Self { name: name.into(), period, immediate: false }
    }

    /// Run the first tick as soon as the task is spawned.
    pub fn immediate(mut self) -> Self {
        self.immediate = true;
        self
    }

    /// Spawn the task.
    ///
    /// Runs never overlap: a run that outlasts the period makes the missed
    /// ticks be skipped. A failed run is logged and the schedule continues.
    pub fn spawn<F, Fut, E>(self, mut job: F) -> JoinHandle<()>
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        tokio::spawn(async move {
            let start = if self.immediate { Instant::now() } else { Instant::now() + self.period };
            let mut ticks = interval_at(start, self.period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticks.tick().await;
                debug!(task = %self.name, "Running periodic task");
                if let Err(e) = job().await {
                    warn!(task = %self.name, error = %e, "Periodic task failed");
                }
            }
        })
    }
}
