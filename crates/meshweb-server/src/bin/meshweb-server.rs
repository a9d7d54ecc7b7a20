use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use meshweb_proto::LoopbackMeshAdapter;
use meshweb_server::config::ServerConfig;
use meshweb_server::stats::Stats;
use meshweb_server::Server;
use tokio::sync::watch;

/// Serves a directory of HTML pages and files to mesh clients.
#[derive(Debug, Parser)]
#[command(name = "meshweb-server", version, about)]
struct Args {
    /// Root directory for identity, config, pages, and the access log.
    #[arg(long, default_value = "./meshweb-server-storage")]
    storage: PathBuf,

    /// Path to the persisted identity key material (defaults under storage).
    #[arg(long)]
    identity: Option<PathBuf>,

    /// Display name advertised in announces (the `[HTML]` marker is added automatically).
    #[arg(long)]
    name: Option<String>,

    /// Re-announce interval in seconds (minimum 60).
    #[arg(long = "announce-interval")]
    announce_interval: Option<u64>,

    /// Disable periodic re-announcing after the initial one.
    #[arg(long)]
    no_auto_announce: bool,

    /// Print server statistics and exit without starting the serve loop.
    #[arg(long)]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    if args.stats {
        let stats = Stats::gather(&args.storage);
        print!("{}", stats.render());
        return Ok(());
    }

    let mut config = ServerConfig::load(&args.storage);
    if let Some(name) = args.name {
        config.server_name = name;
    }
    if let Some(interval) = args.announce_interval {
        config.auto_announce_interval = interval;
        config.clamp_interval();
    }
    if args.no_auto_announce {
        config.auto_announce_enabled = false;
    }

    // The real LXMF/Reticulum substrate is an external collaborator
    // consumed only through `meshweb_proto::MeshAdapter`.
    // `LoopbackMeshAdapter` is the in-repo reference implementation of
    // that contract; swapping in a real substrate crate means providing
    // another `MeshAdapter` impl here, nothing in `Server` changes.
    let adapter = Arc::new(LoopbackMeshAdapter::isolated());
    let server = Server::new(&args.storage, config);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    tokio::select! {
        result = server.run(adapter, shutdown_rx) => {
            result?;
        }
        _ = &mut ctrl_c => {
            tracing::info!("shutdown requested");
            let _ = shutdown_tx.send(true);
        }
    }

    Ok(())
}
