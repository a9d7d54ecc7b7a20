//! Announce Filter: recognizes HTML-server announces and forwards
//! new/updated peers to the [`crate::peer::PeerRegistry`].

use meshweb_proto::{classify_marker, decode_display_name, strip_marker, AnnounceEvent, DestinationHash, MarkerClass};

use crate::events::{ClientEvent, EventBus};
use crate::peer::{Peer, PeerRegistry};

/// Current local time in whole seconds, used for `Peer::last_seen`.
fn now_unix() -> i64 {
    time::OffsetDateTime::now_utc().unix_timestamp()
}

pub struct AnnounceFilter {
    local: DestinationHash,
    registry: std::sync::Arc<PeerRegistry>,
    events: EventBus,
}

impl AnnounceFilter {
    pub fn new(local: DestinationHash, registry: std::sync::Arc<PeerRegistry>, events: EventBus) -> Self {
        Self {
            local,
            registry,
            events,
        }
    }

    /// Processes one incoming announce. Never panics on malformed app-data
    /// — a decode failure is simply not an HTML-server announce.
    pub async fn handle(&self, event: AnnounceEvent) {
        if event.peer_hash == self.local {
            return;
        }

        let Some(display_name) = decode_display_name(&event.app_data) else {
            return;
        };

        match classify_marker(&display_name) {
            MarkerClass::None => {}
            MarkerClass::Loose => {
                tracing::debug!(peer = %event.peer_hash, name = %display_name, "loose HTML marker match (second-class)");
                self.register(event.peer_hash, &display_name).await;
            }
            MarkerClass::Canonical => {
                self.register(event.peer_hash, &display_name).await;
            }
        }
    }

    async fn register(&self, hash: DestinationHash, display_name: &str) {
        let name = strip_marker(display_name);
        let seen_at = now_unix();

        if self.registry.contains(hash).await {
            self.registry.touch(hash, seen_at).await;
            return;
        }

        self.registry.upsert(Peer::new(hash, name.clone(), seen_at)).await;
        self.events.publish(ClientEvent::ServerDiscovered { hash, name });
    }
}
