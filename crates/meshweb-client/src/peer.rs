//! Peer Registry: a persistent map of discovered HTML servers.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use meshweb_proto::persist::{read_json_or, write_json_atomic};
use meshweb_proto::DestinationHash;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

/// A discovered HTML server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Peer {
    pub hash: DestinationHash,
    pub name: String,
    pub pages: Vec<String>,
    pub last_seen: i64,
}

impl Peer {
    pub fn new(hash: DestinationHash, name: String, last_seen: i64) -> Self {
        Self {
            hash,
            name,
            pages: Vec::new(),
            last_seen,
        }
    }
}

/// On-disk shape of `discovered_servers.json`: a map keyed by the hash's
/// hex string, since JSON object keys must be strings and
/// [`DestinationHash`] only round-trips through `serde` as bytes.
#[derive(Default, Serialize, Deserialize)]
struct PersistedRegistry(HashMap<String, Peer>);

/// Persistent map of discovered HTML servers. Invariant: a peer exists in
/// the registry iff its hash is in the known-peers set —
/// enforced here by using the hash itself as the map key, so there is no
/// separate known-set to fall out of sync.
pub struct PeerRegistry {
    path: PathBuf,
    peers: Mutex<HashMap<DestinationHash, Peer>>,
}

impl PeerRegistry {
    /// Loads `discovered_servers.json` from `storage_root`, starting empty
    /// on a missing or malformed file rather than aborting.
    pub fn load(storage_root: &Path) -> Self {
        let path = storage_root.join("discovered_servers.json");
        let persisted: PersistedRegistry = read_json_or(&path, PersistedRegistry::default());
        let peers = persisted
            .0
            .into_values()
            .map(|peer| (peer.hash, peer))
            .collect();
        Self {
            path,
            peers: Mutex::new(peers),
        }
    }

    pub async fn contains(&self, hash: DestinationHash) -> bool {
        self.peers.lock().await.contains_key(&hash)
    }

    /// Inserts or updates `peer` in place, then atomically persists the
    /// whole map. Returns `true` if this is a newly-seen peer.
    pub async fn upsert(&self, peer: Peer) -> bool {
        let mut peers = self.peers.lock().await;
        let is_new = !peers.contains_key(&peer.hash);
        peers.insert(peer.hash, peer);
        self.persist(&peers);
        is_new
    }

    /// Updates only `last_seen` for an already-known peer; a re-announce
    /// refreshes this but emits no event.
    pub async fn touch(&self, hash: DestinationHash, last_seen: i64) {
        let mut peers = self.peers.lock().await;
        if let Some(peer) = peers.get_mut(&hash) {
            peer.last_seen = last_seen;
            self.persist(&peers);
        }
    }

    /// Replaces the pages list for `hash` atomically.
    pub async fn set_pages(&self, hash: DestinationHash, pages: Vec<String>) {
        let mut peers = self.peers.lock().await;
        if let Some(peer) = peers.get_mut(&hash) {
            peer.pages = pages;
            self.persist(&peers);
        }
    }

    pub async fn forget(&self, hash: DestinationHash) {
        let mut peers = self.peers.lock().await;
        peers.remove(&hash);
        self.persist(&peers);
    }

    pub async fn get(&self, hash: DestinationHash) -> Option<Peer> {
        self.peers.lock().await.get(&hash).cloned()
    }

    pub async fn snapshot(&self) -> Vec<Peer> {
        let mut peers: Vec<Peer> = self.peers.lock().await.values().cloned().collect();
        peers.sort_by(|a, b| a.hash.cmp(&b.hash));
        peers
    }

    fn persist(&self, peers: &HashMap<DestinationHash, Peer>) {
        let persisted = PersistedRegistry(
            peers
                .iter()
                .map(|(hash, peer)| (hash.to_string(), peer.clone()))
                .collect(),
        );
        if let Err(err) = write_json_atomic(&self.path, &persisted) {
            tracing::warn!(path = %self.path.display(), error = %err, "failed to persist peer registry");
        }
    }
}
