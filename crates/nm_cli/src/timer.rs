use std::future::Future;
use std::time::Duration;

use chrono::Utc;
use nm_core::{Error, Result};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{info, warn};

/// A tick more than this late is reported as past due.
const PAST_DUE_TOLERANCE: Duration = Duration::from_secs(1);

/// Fires a job on a fixed interval, one run at a time.
#[derive(Debug, Clone, Copy)]
pub struct TimerTrigger {
    interval: Duration,
    run_on_startup: bool,
}

impl TimerTrigger {
    /// A zero interval is rejected; the ticker cannot be built from it.
    pub fn new(interval: Duration, run_on_startup: bool) -> Result<Self> {
        if interval.is_zero() {
            return Err(Error::Config("timer interval must be non-zero".to_string()));
        }
        Ok(Self {
            interval,
            run_on_startup,
        })
    }

    /// Runs `job` on every tick, forever. A run that overlaps the next tick
    /// delays it rather than running twice.
    pub async fn run<F, Fut>(self, name: &str, mut job: F)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = ()>,
    {
        let first = if self.run_on_startup {
            Instant::now()
        } else {
            Instant::now() + self.interval
        };
        let mut ticker = time::interval_at(first, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(
            timer = name,
            interval = %humantime::format_duration(self.interval),
            run_on_startup = self.run_on_startup,
            "⏰ Timer armed"
        );

        loop {
            let scheduled = ticker.tick().await;
            if is_past_due(scheduled, Instant::now()) {
                warn!(timer = name, "The timer is past due!");
            }

            let started_at = Utc::now();
            let started = Instant::now();
            info!(timer = name, started_at = %started_at.to_rfc3339(), "Timer run started");
            job().await;
            info!(
                timer = name,
                finished_at = %Utc::now().to_rfc3339(),
                duration = %humantime::format_duration(started.elapsed()),
                "Timer run finished"
            );
        }
    }
}

fn is_past_due(scheduled: Instant, now: Instant) -> bool {
    now.saturating_duration_since(scheduled) > PAST_DUE_TOLERANCE
}
