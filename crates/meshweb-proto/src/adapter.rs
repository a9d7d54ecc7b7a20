//! The narrow mesh-substrate contract.
//!
//! meshweb deliberately does not implement LXMF/Reticulum itself. Instead it
//! consumes the substrate through this trait, isolating transport concerns
//! behind a single boundary — here the boundary is the entire substrate,
//! not just the wire codec, because a real Reticulum stack lives outside
//! this workspace entirely.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::MeshError;
use crate::hash::DestinationHash;

/// An announce observed on the mesh, already demultiplexed to the
/// destination hash and raw app-data the caller asked to watch for.
#[derive(Debug, Clone)]
pub struct AnnounceEvent {
    pub peer_hash: DestinationHash,
    pub app_data: Vec<u8>,
}

/// An inbound LXMF delivery addressed to one of our local destinations.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub source_hash: DestinationHash,
    /// Raw msgpack field-map bytes, decoded by [`crate::fields::decode_fields`].
    pub fields: Vec<u8>,
    /// Plaintext message body, used as a command fallback.
    pub content: String,
}

/// A local LXMF destination this process owns, identified by its own
/// destination hash and able to announce under a given display name.
#[derive(Debug, Clone)]
pub struct LocalEndpoint {
    pub hash: DestinationHash,
}

/// The mesh substrate contract every meshweb role (server or client)
/// programs against. A concrete implementation owns identity persistence,
/// path discovery, and LXMF delivery semantics; meshweb only ever sees
/// [`DestinationHash`]es, announce/delivery events, and byte payloads.
///
/// Retransmission policy, propagation-node selection, and identity key
/// management are entirely the adapter's concern and are not modeled here.
#[async_trait]
pub trait MeshAdapter: Send + Sync {
    /// Creates or loads the local identity and registers a destination
    /// announced under `display_name`.
    async fn register_endpoint(&self, display_name: &str) -> Result<LocalEndpoint, MeshError>;

    /// Broadcasts an announce for `endpoint` under the given display name.
    /// Callers are expected to call this on their own schedule (see
    /// `AnnounceScheduler` in `meshweb-server`); the adapter does not
    /// schedule on its own.
    async fn announce(&self, endpoint: &LocalEndpoint, display_name: &str) -> Result<(), MeshError>;

    /// Subscribes to announces from any peer, returning a channel of
    /// [`AnnounceEvent`]s. The receiver end is expected to live for the
    /// process lifetime.
    async fn subscribe_announces(&self) -> Result<mpsc::Receiver<AnnounceEvent>, MeshError>;

    /// Subscribes to inbound deliveries addressed to `endpoint`.
    async fn subscribe_deliveries(
        &self,
        endpoint: &LocalEndpoint,
    ) -> Result<mpsc::Receiver<Delivery>, MeshError>;

    /// Sends a field-map message to `destination` from `endpoint`,
    /// resolving a path first if none is known. `content` is the plaintext
    /// fallback body.
    async fn send(
        &self,
        endpoint: &LocalEndpoint,
        destination: DestinationHash,
        fields: Vec<u8>,
        content: String,
    ) -> Result<(), MeshError>;

    /// Requests path discovery for `destination` without sending, used by
    /// clients probing reachability before a request.
    async fn recall_or_request_path(&self, destination: DestinationHash) -> Result<(), MeshError>;
}
