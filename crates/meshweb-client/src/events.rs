//! Event Bus: a single in-process broadcaster feeding the local UI shell
//! (out of scope here), modeled on a subscription pattern with the IPC
//! transport stripped out — this is purely in-process.

use meshweb_proto::DestinationHash;
use tokio::sync::broadcast;

/// Capacity of the broadcast channel. Delivery is best-effort: a
/// subscriber that falls behind by more than this many events sees
/// [`broadcast::error::RecvError::Lagged`] and resumes from the next one,
/// it is not handed stale history.
const CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub enum ClientEvent {
    ServerDiscovered {
        hash: DestinationHash,
        name: String,
    },
    PagesUpdated {
        hash: DestinationHash,
        pages: Vec<String>,
    },
    HtmlReceived {
        origin_peer: DestinationHash,
        page: String,
        filename: String,
    },
    FileReceived {
        origin_peer: DestinationHash,
        filename: String,
        size: u64,
    },
}

/// One publisher, many subscribers, no persistence or replay. Cheap to
/// clone: all clones share the same underlying channel.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ClientEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, _rx) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.tx.subscribe()
    }

    /// Best-effort publish: if nobody is subscribed, the event is simply
    /// dropped.
    pub fn publish(&self, event: ClientEvent) {
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
