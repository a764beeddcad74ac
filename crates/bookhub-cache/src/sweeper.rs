//! Periodic eviction of expired entries.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use bookhub_core::traits::ExpiringStore;

/// Background task that purges every registered store on a fixed interval.
///
/// Correctness never depends on it; readers already treat expired entries
/// as absent. It only bounds memory held by abandoned issuances and by
/// revocations of tokens that have since expired.
#[derive(Debug, Clone)]
pub struct ExpirySweeper {
    /// Stores to sweep.
    targets: Vec<Arc<dyn ExpiringStore>>,
    /// Time between sweeps.
    interval: Duration,
}

impl ExpirySweeper {
    /// Creates a sweeper with no targets.
    pub fn new(interval: Duration) -> Self {
        Self {
            targets: Vec::new(),
            interval,
        }
    }

    /// Adds a store to sweep.
    pub fn with_target(mut self, target: Arc<dyn ExpiringStore>) -> Self {
        self.targets.push(target);
        self
    }

    /// Runs a single sweep over every target. Returns the number of evicted
    /// entries.
    pub fn run_once(&self) -> usize {
        let mut total = 0;
        for target in &self.targets {
            let evicted = target.purge_expired();
            if evicted > 0 {
                debug!(store = target.label(), evicted, "Swept expired entries");
            }
            total += evicted;
        }
        total
    }

    /// Spawns the sweep loop. It stops when `shutdown` flips to `true` or its
    /// sender is dropped.
    pub fn spawn(self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(
                interval_secs = self.interval.as_secs(),
                stores = self.targets.len(),
                "Expiry sweeper started"
            );
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        self.run_once();
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                }
            }

            info!("Expiry sweeper stopped");
        })
    }
}
