//! Client runtime: wires the announce filter, request correlator, content
//! cache, and event bus together around a [`MeshAdapter`]. Announces flow
//! through the filter into the peer registry and out to the event bus;
//! outbound requests go from the correlator through the adapter to the
//! mesh; inbound deliveries come back through the adapter and get
//! correlated against the pending request before landing in the cache.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use meshweb_proto::constants::{PENDING_REQUEST_TTL_SECS, SENTINEL_AVAILABLE_PAGES};
use meshweb_proto::{decode_fields, fields, DestinationHash, InboundPayload, LocalEndpoint, MeshAdapter};
use tokio::sync::watch;

use crate::announce_filter::AnnounceFilter;
use crate::bookmarks::BookmarkStore;
use crate::cache::ContentCache;
use crate::correlator::{PendingKind, RequestCorrelator};
use crate::error::ClientError;
use crate::events::{ClientEvent, EventBus};
use crate::history::{HistoryEntry, HistoryKind, HistoryStore};
use crate::list_parser::parse_page_list;
use crate::peer::PeerRegistry;

fn now_unix() -> i64 {
    time::OffsetDateTime::now_utc().unix_timestamp()
}

/// The browser-client role.
pub struct Client {
    storage_root: PathBuf,
    display_name: String,
    pub registry: Arc<PeerRegistry>,
    pub correlator: Arc<RequestCorrelator>,
    pub cache: ContentCache,
    pub history: HistoryStore,
    pub bookmarks: BookmarkStore,
    pub events: EventBus,
}

impl Client {
    pub fn new(storage_root: impl Into<PathBuf>, display_name: impl Into<String>) -> Result<Self, ClientError> {
        let storage_root = storage_root.into();
        std::fs::create_dir_all(&storage_root)?;
        Ok(Self {
            registry: Arc::new(PeerRegistry::load(&storage_root)),
            correlator: Arc::new(RequestCorrelator::new()),
            cache: ContentCache::new(&storage_root)?,
            history: HistoryStore::load(&storage_root),
            bookmarks: BookmarkStore::load(&storage_root),
            events: EventBus::new(),
            display_name: display_name.into(),
            storage_root,
        })
    }

    pub fn storage_root(&self) -> &Path {
        &self.storage_root
    }

    /// Registers the local delivery destination and drains announces and
    /// deliveries until `shutdown` fires. An inbound-delivery loop and a
    /// stale-request sweep run as two tasks over the same adapter.
    pub async fn run<A: MeshAdapter + 'static>(
        &self,
        adapter: Arc<A>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<LocalEndpoint, ClientError> {
        let endpoint = adapter.register_endpoint(&self.display_name).await?;
        tracing::info!(peer = %endpoint.hash, name = %self.display_name, "registered client endpoint");

        let filter = AnnounceFilter::new(endpoint.hash, self.registry.clone(), self.events.clone());
        let mut announces = adapter.subscribe_announces().await?;
        let mut deliveries = adapter.subscribe_deliveries(&endpoint).await?;

        let sweep_correlator = self.correlator.clone();
        let mut sweep_shutdown = shutdown.clone();
        let sweep_handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(10));
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let swept = sweep_correlator
                            .sweep_stale(Duration::from_secs(PENDING_REQUEST_TTL_SECS))
                            .await;
                        for peer in swept {
                            tracing::debug!(peer = %peer, "swept stale pending request");
                        }
                    }
                    _ = sweep_shutdown.changed() => {
                        if *sweep_shutdown.borrow() {
                            break;
                        }
                    }
                }
            }
        });

        loop {
            tokio::select! {
                maybe_announce = announces.recv() => {
                    let Some(announce) = maybe_announce else { break };
                    filter.handle(announce).await;
                }
                maybe_delivery = deliveries.recv() => {
                    let Some(delivery) = maybe_delivery else { break };
                    let payload = decode_fields(&delivery.fields).unwrap_or(InboundPayload::Empty);
                    self.handle_delivery(delivery.source_hash, &payload, &delivery.content).await;
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        sweep_handle.abort();
        Ok(endpoint)
    }

    /// Correlates one inbound delivery against the pending request for its
    /// source peer. Priority order: HTML content, then file attachments,
    /// then the LIST sentinel in plain text, else treated as ancillary
    /// text that does not clear the pending entry.
    async fn handle_delivery(&self, source: DestinationHash, payload: &InboundPayload, content: &str) {
        match payload {
            InboundPayload::HtmlPage { body } => {
                let page_name = page_name_from_body_text(content);
                match self.cache.store_html(source, &page_name, body) {
                    Ok(artifact) => {
                        self.correlator.clear(source).await;
                        self.record_history(source, page_name.clone(), HistoryKind::Page).await;
                        self.events.publish(ClientEvent::HtmlReceived {
                            origin_peer: source,
                            page: page_name,
                            filename: artifact.id,
                        });
                    }
                    Err(err) => {
                        tracing::warn!(peer = %source, error = %err, "failed to cache HTML artifact");
                    }
                }
            }
            InboundPayload::Files { files } => {
                let count = files.len();
                match self.cache.store_files(source, files.clone()) {
                    Ok(artifacts) => {
                        self.correlator.clear(source).await;
                        for artifact in artifacts {
                            let size = match &artifact.payload {
                                crate::cache::ArtifactPayload::Binary { bytes, .. } => bytes.len() as u64,
                                _ => 0,
                            };
                            self.record_history(source, artifact.id.clone(), HistoryKind::File).await;
                            self.events.publish(ClientEvent::FileReceived {
                                origin_peer: source,
                                filename: artifact.id,
                                size,
                            });
                        }
                    }
                    Err(err) => {
                        tracing::warn!(peer = %source, count, error = %err, "failed to cache file attachments");
                    }
                }
            }
            InboundPayload::PageRequest { .. } | InboundPayload::Empty => {
                // The index response is two messages (HTML then this plain
                // text one); the first already cleared whatever was pending,
                // so the sentinel alone — not the correlator state — is what
                // tells us this is the page list.
                if content.contains(SENTINEL_AVAILABLE_PAGES) {
                    let pages = parse_page_list(content);
                    self.registry.set_pages(source, pages.clone()).await;
                    self.correlator.clear(source).await;
                    self.events.publish(ClientEvent::PagesUpdated { hash: source, pages });
                }
                // Anything else is ancillary text (acks, help replies):
                // does not clear the pending entry.
            }
        }
    }

    async fn record_history(&self, peer: DestinationHash, resource_name: String, kind: HistoryKind) {
        let peer_name = self
            .registry
            .get(peer)
            .await
            .map(|p| p.name)
            .unwrap_or_else(|| "Unknown Server".to_string());
        self.history
            .append(HistoryEntry {
                peer,
                peer_name,
                resource_name,
                timestamp: now_unix(),
                kind,
            })
            .await;
    }

    /// Sends the `list` request for `peer`'s page index.
    pub async fn request_list<A: MeshAdapter>(
        &self,
        adapter: &A,
        endpoint: &LocalEndpoint,
        peer: DestinationHash,
    ) -> Result<(), ClientError> {
        self.correlator.begin(peer, PendingKind::List).await;
        adapter.send(endpoint, peer, vec![], "list".to_string()).await?;
        Ok(())
    }

    /// Requests `page_name` from `peer` via the structured
    /// `FIELD_HTML_REQUEST` field.
    pub async fn request_page<A: MeshAdapter>(
        &self,
        adapter: &A,
        endpoint: &LocalEndpoint,
        peer: DestinationHash,
        page_name: &str,
    ) -> Result<(), ClientError> {
        self.correlator
            .begin(peer, PendingKind::Page(page_name.to_string()))
            .await;
        let encoded = fields::encode_page_request(page_name)?;
        adapter
            .send(endpoint, peer, encoded, format!("GET:{page_name}"))
            .await?;
        Ok(())
    }

    /// Requests a non-HTML file from `peer` (same wire shape as
    /// [`Self::request_page`]; the server decides the response shape).
    pub async fn request_file<A: MeshAdapter>(
        &self,
        adapter: &A,
        endpoint: &LocalEndpoint,
        peer: DestinationHash,
        file_name: &str,
    ) -> Result<(), ClientError> {
        self.correlator
            .begin(peer, PendingKind::File(file_name.to_string()))
            .await;
        let encoded = fields::encode_page_request(file_name)?;
        adapter
            .send(endpoint, peer, encoded, format!("GET:{file_name}"))
            .await?;
        Ok(())
    }
}

/// `FIELD_HTML_REQUEST` never comes back from the server on a response —
/// only the plaintext body tells us which page the HTML belongs to
/// (`"Serving: <name>"`, or the index sentinel).
fn page_name_from_body_text(content: &str) -> String {
    if let Some(rest) = content.strip_prefix("Serving:") {
        return rest.trim().to_string();
    }
    if content == "File Index" || content.contains(SENTINEL_AVAILABLE_PAGES) {
        return "index.html".to_string();
    }
    "page.html".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_name_extraction_matches_serving_prefix() {
        assert_eq!(page_name_from_body_text("Serving: about.html"), "about.html");
        assert_eq!(page_name_from_body_text("File Index"), "index.html");
        assert_eq!(page_name_from_body_text("404: x.html"), "page.html");
    }
}
