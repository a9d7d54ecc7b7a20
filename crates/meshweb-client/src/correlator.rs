//! Request Correlator: tracks at most one outstanding request per peer,
//! typed by expected response shape.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use meshweb_proto::DestinationHash;
use tokio::sync::Mutex;

/// The expected response shape for an outstanding request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingKind {
    List,
    Page(String),
    File(String),
}

struct Entry {
    kind: PendingKind,
    issued_at: Instant,
}

/// One pending request per peer — the protocol is request/response per
/// peer, not multiplexed. A new outbound request evicts any prior entry
/// for the same peer.
pub struct RequestCorrelator {
    pending: Mutex<HashMap<DestinationHash, Entry>>,
}

impl RequestCorrelator {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Records a new outstanding request for `peer`, evicting and logging
    /// any prior entry.
    pub async fn begin(&self, peer: DestinationHash, kind: PendingKind) {
        let mut pending = self.pending.lock().await;
        if let Some(previous) = pending.insert(
            peer,
            Entry {
                kind: kind.clone(),
                issued_at: Instant::now(),
            },
        ) {
            tracing::info!(
                peer = %peer,
                previous = ?previous.kind,
                next = ?kind,
                "cancelling prior pending request for peer"
            );
        }
    }

    /// Returns the currently pending kind for `peer`, if any, without
    /// clearing it.
    pub async fn peek(&self, peer: DestinationHash) -> Option<PendingKind> {
        self.pending.lock().await.get(&peer).map(|entry| entry.kind.clone())
    }

    /// Clears the pending entry for `peer` (a response was recognized),
    /// returning what it was so the caller can confirm response shape
    /// matched expectation.
    pub async fn clear(&self, peer: DestinationHash) -> Option<PendingKind> {
        self.pending.lock().await.remove(&peer).map(|entry| entry.kind)
    }

    /// Sweeps entries idle longer than `ttl`, discarding them silently.
    /// Returns the peers that were swept.
    pub async fn sweep_stale(&self, ttl: Duration) -> Vec<DestinationHash> {
        let mut pending = self.pending.lock().await;
        let stale: Vec<DestinationHash> = pending
            .iter()
            .filter(|(_, entry)| entry.issued_at.elapsed() >= ttl)
            .map(|(peer, _)| *peer)
            .collect();
        for peer in &stale {
            pending.remove(peer);
        }
        stale
    }
}

impl Default for RequestCorrelator {
    fn default() -> Self {
        Self::new()
    }
}
