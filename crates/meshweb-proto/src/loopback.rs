//! An in-process [`MeshAdapter`] double with no real transport, used by
//! `meshweb-e2e` (and unit tests elsewhere) to exercise server/client
//! behavior without a Reticulum stack, consumed only through the narrow
//! [`MeshAdapter`] interface.
//!
//! This is deliberately simple: no retransmission, no path-discovery delay,
//! no propagation nodes. It satisfies the [`MeshAdapter`] contract well
//! enough to drive the end-to-end scenarios in `meshweb-e2e`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};

use crate::adapter::{AnnounceEvent, Delivery, LocalEndpoint, MeshAdapter};
use crate::error::MeshError;
use crate::hash::DestinationHash;

#[derive(Default)]
struct Inner {
    deliveries: HashMap<DestinationHash, mpsc::Sender<Delivery>>,
    announce_subscribers: Vec<mpsc::Sender<AnnounceEvent>>,
}

/// Shared in-process "ether" that a set of [`LoopbackMeshAdapter`] handles
/// all talk through. Clone it to hand every role (server, client) its own
/// adapter bound to the same network.
#[derive(Clone)]
pub struct LoopbackNetwork {
    inner: Arc<Mutex<Inner>>,
    next_id: Arc<AtomicU64>,
}

impl LoopbackNetwork {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn adapter(&self) -> LoopbackMeshAdapter {
        LoopbackMeshAdapter {
            network: self.clone(),
        }
    }

    fn fresh_hash(&self) -> DestinationHash {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut bytes = [0u8; 16];
        bytes[8..].copy_from_slice(&id.to_be_bytes());
        DestinationHash::from_bytes(bytes)
    }
}

impl Default for LoopbackNetwork {
    fn default() -> Self {
        Self::new()
    }
}

/// A [`MeshAdapter`] bound to a [`LoopbackNetwork`]. Cheap to clone; all
/// clones of adapters built from the same network see each other's
/// announces and deliveries.
#[derive(Clone)]
pub struct LoopbackMeshAdapter {
    network: LoopbackNetwork,
}

impl LoopbackMeshAdapter {
    /// Convenience constructor for a standalone adapter with its own
    /// private network (most unit tests only need one side).
    pub fn isolated() -> Self {
        LoopbackNetwork::new().adapter()
    }
}

#[async_trait]
impl MeshAdapter for LoopbackMeshAdapter {
    async fn register_endpoint(&self, _display_name: &str) -> Result<LocalEndpoint, MeshError> {
        Ok(LocalEndpoint {
            hash: self.network.fresh_hash(),
        })
    }

    async fn announce(&self, endpoint: &LocalEndpoint, display_name: &str) -> Result<(), MeshError> {
        let mut inner = self.network.inner.lock().await;
        inner.announce_subscribers.retain(|tx| !tx.is_closed());
        for tx in &inner.announce_subscribers {
            let event = AnnounceEvent {
                peer_hash: endpoint.hash,
                app_data: display_name.as_bytes().to_vec(),
            };
            // Best-effort: a full subscriber channel should not fail an
            // announce for every other subscriber.
            let _ = tx.try_send(event);
        }
        Ok(())
    }

    async fn subscribe_announces(&self) -> Result<mpsc::Receiver<AnnounceEvent>, MeshError> {
        let (tx, rx) = mpsc::channel(64);
        let mut inner = self.network.inner.lock().await;
        inner.announce_subscribers.push(tx);
        Ok(rx)
    }

    async fn subscribe_deliveries(
        &self,
        endpoint: &LocalEndpoint,
    ) -> Result<mpsc::Receiver<Delivery>, MeshError> {
        let (tx, rx) = mpsc::channel(64);
        let mut inner = self.network.inner.lock().await;
        inner.deliveries.insert(endpoint.hash, tx);
        Ok(rx)
    }

    async fn send(
        &self,
        endpoint: &LocalEndpoint,
        destination: DestinationHash,
        fields: Vec<u8>,
        content: String,
    ) -> Result<(), MeshError> {
        let inner = self.network.inner.lock().await;
        let tx = inner
            .deliveries
            .get(&destination)
            .ok_or_else(|| MeshError::PathUnreachable(destination.to_string()))?;
        let delivery = Delivery {
            source_hash: endpoint.hash,
            fields,
            content,
        };
        tx.send(delivery)
            .await
            .map_err(|_| MeshError::SendFailed {
                destination: destination.to_string(),
                reason: "receiver dropped".to_string(),
            })
    }

    async fn recall_or_request_path(&self, destination: DestinationHash) -> Result<(), MeshError> {
        let inner = self.network.inner.lock().await;
        if inner.deliveries.contains_key(&destination) {
            Ok(())
        } else {
            Err(MeshError::PathUnreachable(destination.to_string()))
        }
    }
}
