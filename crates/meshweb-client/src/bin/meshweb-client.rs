use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use meshweb_client::Client;
use meshweb_proto::{DestinationHash, LoopbackMeshAdapter, MeshAdapter};
use tokio::sync::watch;

/// Minimal driver for the meshweb browser-client role. The real
/// HTTP/WebSocket UI shell over this client's cache and event stream is
/// out of scope — this binary exists to register an endpoint, listen for
/// announces, and issue one-shot requests.
#[derive(Debug, Parser)]
#[command(name = "meshweb-client", version, about)]
struct Args {
    /// Root directory for identity, cache, bookmarks, and history.
    #[arg(long, default_value = "./meshweb-client-storage")]
    storage: PathBuf,

    /// Display name this client announces under.
    #[arg(long, default_value = "LXMF HTML Browser")]
    name: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List peers discovered so far and exit.
    Peers,
    /// Request the page index from a known peer.
    List { peer: String },
    /// Request a named page or file from a peer.
    Get { peer: String, name: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let client = Client::new(&args.storage, &args.name)?;

    // See the server's `bin/meshweb-server.rs` comment: the real
    // LXMF/Reticulum substrate plugs in behind `MeshAdapter` without any
    // change to `Client` itself.
    let adapter = Arc::new(LoopbackMeshAdapter::isolated());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    match args.command {
        Some(Command::Peers) => {
            for peer in client.registry.snapshot().await {
                println!("{} {} (pages: {})", peer.hash, peer.name, peer.pages.join(", "));
            }
        }
        Some(Command::List { peer }) => {
            let endpoint = adapter.register_endpoint(&args.name).await?;
            let peer_hash: DestinationHash = peer.parse()?;
            client.request_list(adapter.as_ref(), &endpoint, peer_hash).await?;
        }
        Some(Command::Get { peer, name }) => {
            let endpoint = adapter.register_endpoint(&args.name).await?;
            let peer_hash: DestinationHash = peer.parse()?;
            client
                .request_page(adapter.as_ref(), &endpoint, peer_hash, &name)
                .await?;
        }
        None => {
            let ctrl_c = tokio::signal::ctrl_c();
            tokio::pin!(ctrl_c);
            tokio::select! {
                result = client.run(adapter, shutdown_rx) => {
                    result?;
                }
                _ = &mut ctrl_c => {
                    tracing::info!("shutdown requested");
                    let _ = shutdown_tx.send(true);
                }
            }
        }
    }

    Ok(())
}
