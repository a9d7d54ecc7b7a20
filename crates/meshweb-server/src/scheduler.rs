//! Announce Scheduler: periodic re-announce with a configurable interval
//! and an immediate initial announce.

use std::sync::Arc;
use std::time::Duration;

use meshweb_proto::constants::ANNOUNCE_SCHEDULER_TICK_SECS;
use meshweb_proto::{LocalEndpoint, MeshAdapter};
use tokio::sync::watch;
use tokio::time::Instant;

pub struct AnnounceScheduler<A: MeshAdapter> {
    adapter: Arc<A>,
    endpoint: LocalEndpoint,
    display_name: String,
    interval: Duration,
    enabled: watch::Receiver<bool>,
}

impl<A: MeshAdapter + 'static> AnnounceScheduler<A> {
    pub fn new(
        adapter: Arc<A>,
        endpoint: LocalEndpoint,
        display_name: String,
        interval_secs: u64,
        enabled: watch::Receiver<bool>,
    ) -> Self {
        Self {
            adapter,
            endpoint,
            display_name,
            interval: Duration::from_secs(interval_secs),
            enabled,
        }
    }

    /// Runs the scheduler loop until `shutdown` resolves. Issues an
    /// immediate announce on entry, then wakes every
    /// [`ANNOUNCE_SCHEDULER_TICK_SECS`] to check whether the interval has
    /// elapsed. Announce failures are logged and the loop continues —
    /// never fatal.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        self.announce_once().await;
        let mut last_announce = Instant::now();
        let mut ticker = tokio::time::interval(Duration::from_secs(ANNOUNCE_SCHEDULER_TICK_SECS));

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if !*self.enabled.borrow() {
                        continue;
                    }
                    if last_announce.elapsed() >= self.interval {
                        self.announce_once().await;
                        last_announce = Instant::now();
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
    }

    async fn announce_once(&self) {
        if let Err(err) = self.adapter.announce(&self.endpoint, &self.display_name).await {
            tracing::warn!(error = %err, "announce failed, continuing");
        } else {
            tracing::info!(peer = %self.endpoint.hash, "announced");
        }
    }
}
