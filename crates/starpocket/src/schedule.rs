use std::ops::ControlFlow;
use std::time::Duration;

use tokio::time::{Interval, MissedTickBehavior, interval};

/// Decides when the next cycle runs
#[async_trait::async_trait]
pub trait Ticker: Send {
    /// Wait for the next tick. `Break` ends the schedule.
    async fn tick(&mut self) -> ControlFlow<()>;
}

/// Fires immediately, then every `period`, forever.
///
/// Ticks missed while a cycle was still running are skipped rather than fired
/// back-to-back, so an overrunning cycle is followed by at most one immediate
/// catch-up cycle.
pub struct IntervalTicker {
    interval: Interval,
}

impl IntervalTicker {
    /// `period` must be non-zero.
    pub fn new(period: Duration) -> Self {
        let mut interval = interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self { interval }
    }

    pub fn period(&self) -> Duration {
        self.interval.period()
    }
}

#[async_trait::async_trait]
impl Ticker for IntervalTicker {
    async fn tick(&mut self) -> ControlFlow<()> {
        self.interval.tick().await;
        ControlFlow::Continue(())
    }
}
