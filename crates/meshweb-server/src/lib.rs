//! meshweb content-server role: owns a pages directory, a local LXMF
//! destination, and the request/announce loops that serve it.
//!
//! Stability class: stable for the library surface (`Server`, `pages`,
//! `template`, `dispatcher`); `bin/meshweb-server.rs` is the operator-facing
//! CLI built on top of it.

pub mod access_log;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod pages;
pub mod scheduler;
pub mod seed;
pub mod stats;
pub mod template;

use std::path::PathBuf;
use std::sync::Arc;

use meshweb_proto::constants::HTML_MARKER;
use meshweb_proto::{decode_fields, fields, InboundPayload, MeshAdapter};
use tokio::sync::watch;

use access_log::AccessLog;
use config::ServerConfig;
use dispatcher::{DispatchOutcome, Dispatcher};
use error::ServerError;
use pages::PageStore;
use scheduler::AnnounceScheduler;

pub struct Server {
    storage_root: PathBuf,
    config: ServerConfig,
}

impl Server {
    pub fn new(storage_root: impl Into<PathBuf>, config: ServerConfig) -> Self {
        Self {
            storage_root: storage_root.into(),
            config,
        }
    }

    pub fn pages_root(&self) -> PathBuf {
        self.storage_root.join("pages")
    }

    fn display_name(&self) -> String {
        format!("{HTML_MARKER} {}", self.config.server_name)
    }

    /// Runs the server until `shutdown` fires: seeds default pages, opens
    /// the access log, registers and announces the local endpoint, and
    /// drains inbound deliveries through the [`Dispatcher`].
    pub async fn run<A: MeshAdapter + 'static>(
        &self,
        adapter: Arc<A>,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<(), ServerError> {
        seed::seed_default_pages_if_empty(&self.pages_root())?;
        self.config.save(&self.storage_root)?;

        let pages = PageStore::new(self.pages_root());
        let access_log = AccessLog::open(&self.storage_root)?;
        let dispatcher = Dispatcher::new(&pages, &access_log, self.config.server_name.clone());

        let display_name = self.display_name();
        let endpoint = adapter.register_endpoint(&display_name).await?;
        tracing::info!(peer = %endpoint.hash, name = %display_name, "registered delivery destination");

        // The initial announce always fires on registration;
        // `auto_announce_enabled` only governs whether the scheduler keeps
        // re-announcing afterward.
        let (_enabled_tx, enabled_rx) = watch::channel(self.config.auto_announce_enabled);
        let scheduler_shutdown = shutdown.clone();
        let scheduler = AnnounceScheduler::new(
            adapter.clone(),
            endpoint.clone(),
            display_name.clone(),
            self.config.auto_announce_interval,
            enabled_rx,
        );
        let scheduler_handle = tokio::spawn(scheduler.run(scheduler_shutdown));

        let mut deliveries = adapter.subscribe_deliveries(&endpoint).await?;
        loop {
            tokio::select! {
                maybe_delivery = deliveries.recv() => {
                    let Some(delivery) = maybe_delivery else { break };
                    let peer_hex = delivery.source_hash.to_string();
                    let payload = decode_fields(&delivery.fields).unwrap_or(InboundPayload::Empty);
                    let outcome = dispatcher.handle(&peer_hex, &payload, &delivery.content);
                    if let Err(err) = self
                        .respond(adapter.as_ref(), &endpoint, delivery.source_hash, outcome)
                        .await
                    {
                        tracing::warn!(peer = %peer_hex, error = %err, "failed to send response");
                    }
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        scheduler_handle.abort();
        Ok(())
    }

    async fn respond<A: MeshAdapter>(
        &self,
        adapter: &A,
        endpoint: &meshweb_proto::LocalEndpoint,
        destination: meshweb_proto::DestinationHash,
        outcome: DispatchOutcome,
    ) -> Result<(), ServerError> {
        match outcome {
            DispatchOutcome::Index { html, text } => {
                let html_fields = fields::encode_html_content(&html)?;
                adapter
                    .send(endpoint, destination, html_fields, "File Index".to_string())
                    .await?;
                adapter.send(endpoint, destination, vec![], text).await?;
            }
            DispatchOutcome::Page { html, body_text } => {
                let html_fields = fields::encode_html_content(&html)?;
                adapter.send(endpoint, destination, html_fields, body_text).await?;
            }
            DispatchOutcome::File { files, body_text } => {
                let file_fields = fields::encode_file_attachments(&files)?;
                adapter.send(endpoint, destination, file_fields, body_text).await?;
            }
            DispatchOutcome::NotFound { html, body_text } => {
                let html_fields = fields::encode_html_content(&html)?;
                adapter.send(endpoint, destination, html_fields, body_text).await?;
            }
            DispatchOutcome::Ack { text } | DispatchOutcome::Help { text } => {
                adapter.send(endpoint, destination, vec![], text).await?;
            }
        }
        Ok(())
    }
}
