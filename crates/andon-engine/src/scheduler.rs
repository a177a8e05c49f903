//! Fixed-rate evaluation ticks on a tokio interval, independent of ingestion rate.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use andon_core::traits::{Cancellable, CancellationToken};

use crate::engine::AndonEngine;

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Background task running `AndonEngine::evaluate_cancellable` every period.
///
/// A tick that overruns its period makes the scheduler skip the missed ticks rather
/// than burst to catch up.
#[derive(Debug)]
pub struct TickScheduler {
    cancel: CancellationToken,
    shutdown: Arc<Notify>,
    handle: JoinHandle<u64>,
}

impl TickScheduler {
    /// Start ticking. The first tick runs immediately. Must be called inside a tokio runtime.
    pub fn spawn(engine: Arc<AndonEngine>, period: Duration) -> Self {
        let cancel = CancellationToken::new();
        let shutdown = Arc::new(Notify::new());
        let handle = tokio::spawn(run(engine, period.max(MIN_PERIOD), cancel.clone(), shutdown.clone()));
        Self {
            cancel,
            shutdown,
            handle,
        }
    }

    /// Start ticking at the active config's `tick_interval_secs`.
    pub fn from_config(engine: Arc<AndonEngine>) -> Self {
        let period = Duration::from_secs(engine.config().tick_interval_secs);
        Self::spawn(engine, period)
    }

    /// Cancel the running tick, stop the loop, and wait for it. Returns the number of
    /// ticks run.
    pub async fn shutdown(self) -> u64 {
        self.cancel.cancel();
        self.shutdown.notify_one();
        match self.handle.await {
            Ok(ticks) => ticks,
            Err(e) => {
                tracing::error!(error = %e, "tick scheduler task failed");
                0
            }
        }
    }
}

async fn run(
    engine: Arc<AndonEngine>,
    period: Duration,
    cancel: CancellationToken,
    shutdown: Arc<Notify>,
) -> u64 {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut ticks = 0;

    loop {
        tokio::select! {
            _ = shutdown.notified() => break,
            _ = ticker.tick() => {
                if cancel.is_cancelled() {
                    break;
                }
                engine.evaluate_cancellable(engine.now(), &cancel);
                ticks += 1;
            }
        }
    }
    tracing::debug!(ticks, "tick scheduler stopped");
    ticks
}
