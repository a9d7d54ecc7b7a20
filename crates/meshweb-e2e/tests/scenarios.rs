//! End-to-end scenarios covering discovery, index requests, page and file
//! downloads, not-found handling, and re-announce cadence, with the
//! server and client wired together over a shared [`LoopbackNetwork`]
//! instead of real LXMF/RNS.

use std::sync::Arc;
use std::time::Duration;

use meshweb_client::events::ClientEvent;
use meshweb_client::Client;
use meshweb_proto::{LoopbackMeshAdapter, LoopbackNetwork, MeshAdapter};
use meshweb_server::config::ServerConfig;
use meshweb_server::Server;
use tempfile::TempDir;
use tokio::sync::watch;

struct Harness {
    _server_storage: TempDir,
    client_storage: TempDir,
    server_shutdown: watch::Sender<bool>,
    client_shutdown: watch::Sender<bool>,
    server_task: tokio::task::JoinHandle<()>,
    client_task: tokio::task::JoinHandle<()>,
    client: Arc<Client>,
    client_adapter: Arc<LoopbackMeshAdapter>,
    client_endpoint: meshweb_proto::LocalEndpoint,
}

impl Harness {
    async fn spawn(config: ServerConfig, pages: &[(&str, &[u8])]) -> Self {
        let network = LoopbackNetwork::new();

        let server_storage = tempfile::tempdir().unwrap();
        let pages_root = server_storage.path().join("pages");
        std::fs::create_dir_all(&pages_root).unwrap();
        for (name, bytes) in pages {
            std::fs::write(pages_root.join(name), bytes).unwrap();
        }

        // The client must be subscribed to announces before the server
        // fires its initial one: the loopback network has no replay for
        // late subscribers, and the scheduler's next announce is 1800s
        // (default) away, far outside any test timeout.
        let client_storage = tempfile::tempdir().unwrap();
        let client = Arc::new(Client::new(client_storage.path(), "LXMF HTML Browser").unwrap());
        let client_adapter = Arc::new(network.adapter());
        let client_endpoint = client_adapter.register_endpoint("LXMF HTML Browser").await.unwrap();

        let (client_shutdown, client_shutdown_rx) = watch::channel(false);
        let client_task = {
            let client = client.clone();
            let client_adapter = client_adapter.clone();
            tokio::spawn(async move {
                client.run(client_adapter, client_shutdown_rx).await.unwrap();
            })
        };
        // Let the client's announce loop actually register its
        // subscription before the server starts.
        tokio::time::sleep(Duration::from_millis(50)).await;

        let server = Server::new(server_storage.path(), config);
        let server_adapter = Arc::new(network.adapter());
        let (server_shutdown, server_shutdown_rx) = watch::channel(false);
        let server_task = {
            let server_adapter = server_adapter.clone();
            tokio::spawn(async move {
                server.run(server_adapter, server_shutdown_rx).await.unwrap();
            })
        };

        Self {
            _server_storage: server_storage,
            client_storage,
            server_shutdown,
            client_shutdown,
            server_task,
            client_task,
            client,
            client_adapter,
            client_endpoint,
        }
    }

    async fn shutdown(self) {
        let _ = self.server_shutdown.send(true);
        let _ = self.client_shutdown.send(true);
        let _ = self.server_task.await;
        let _ = self.client_task.await;
    }
}

fn default_pages() -> Vec<(&'static str, &'static [u8])> {
    vec![
        ("about.html", b"<html><head></head><body>about {{page_count}}</body></html>"),
        ("help.html", b"<html><head></head><body>help</body></html>"),
    ]
}

/// Drains events until one matches `pred`, ignoring the rest. The index
/// reply is two messages (HTML then text — see `meshweb_server::Server::respond`),
/// so callers waiting on the text-derived event need to skip the HTML one.
async fn recv_matching<F>(
    events: &mut tokio::sync::broadcast::Receiver<ClientEvent>,
    mut pred: F,
) -> ClientEvent
where
    F: FnMut(&ClientEvent) -> bool,
{
    loop {
        let event = tokio::time::timeout(Duration::from_secs(2), events.recv())
            .await
            .expect("matching event should arrive")
            .unwrap();
        if pred(&event) {
            return event;
        }
    }
}

/// S1. Discovery: a fresh client receives the server's announce, gets
/// exactly one `server_discovered` event with the marker stripped from the
/// name, and the registry holds one peer with empty pages.
#[tokio::test]
async fn s1_discovery() {
    let config = ServerConfig {
        server_name: "Node".to_string(),
        ..ServerConfig::default()
    };
    let mut harness = Harness::spawn(config, &default_pages()).await;

    let mut events = harness.client.events.subscribe();
    let event = tokio::time::timeout(Duration::from_secs(2), events.recv())
        .await
        .expect("discovery event should arrive")
        .unwrap();

    let discovered_hash = match event {
        ClientEvent::ServerDiscovered { hash, name } => {
            assert_eq!(name, "Node");
            hash
        }
        other => panic!("unexpected first event {other:?}"),
    };

    let peers = harness.client.registry.snapshot().await;
    assert_eq!(peers.len(), 1);
    assert_eq!(peers[0].hash, discovered_hash);
    assert!(peers[0].pages.is_empty());

    harness.shutdown().await;
}

/// S2. Index request: `list` produces an HTML index (containing the
/// default server name and both filenames) plus a plain-text index, and
/// the peer's pages become `["about.html", "help.html"]`.
#[tokio::test]
async fn s2_index_request() {
    let mut harness = Harness::spawn(ServerConfig::default(), &default_pages()).await;

    let mut events = harness.client.events.subscribe();
    let discovered = tokio::time::timeout(Duration::from_secs(2), events.recv())
        .await
        .unwrap()
        .unwrap();
    let server_hash = match discovered {
        ClientEvent::ServerDiscovered { hash, .. } => hash,
        other => panic!("unexpected event {other:?}"),
    };

    harness
        .client
        .request_list(harness.client_adapter.as_ref(), &harness.client_endpoint, server_hash)
        .await
        .unwrap();

    // The index reply is two messages: HTML first (produces a
    // `HtmlReceived` for the index page), then the plain-text listing
    // (produces `PagesUpdated`). Skip the former to get to the latter.
    let pages_updated = recv_matching(&mut events, |e| matches!(e, ClientEvent::PagesUpdated { .. })).await;
    match pages_updated {
        ClientEvent::PagesUpdated { hash, pages } => {
            assert_eq!(hash, server_hash);
            assert_eq!(pages, vec!["about.html".to_string(), "help.html".to_string()]);
        }
        other => panic!("unexpected event {other:?}"),
    }

    let peer = harness.client.registry.get(server_hash).await.unwrap();
    assert_eq!(peer.pages, vec!["about.html".to_string(), "help.html".to_string()]);

    harness.shutdown().await;
}

/// S3. HTML page request: the served HTML has its placeholders
/// substituted and is cached with the interceptor injected exactly once.
#[tokio::test]
async fn s3_html_page_request() {
    let mut harness = Harness::spawn(ServerConfig::default(), &default_pages()).await;

    let mut events = harness.client.events.subscribe();
    let discovered = tokio::time::timeout(Duration::from_secs(2), events.recv())
        .await
        .unwrap()
        .unwrap();
    let server_hash = match discovered {
        ClientEvent::ServerDiscovered { hash, .. } => hash,
        other => panic!("unexpected event {other:?}"),
    };

    harness
        .client
        .request_page(
            harness.client_adapter.as_ref(),
            &harness.client_endpoint,
            server_hash,
            "about.html",
        )
        .await
        .unwrap();

    let html_received = tokio::time::timeout(Duration::from_secs(2), events.recv())
        .await
        .unwrap()
        .unwrap();
    let filename = match html_received {
        ClientEvent::HtmlReceived { origin_peer, page, filename } => {
            assert_eq!(origin_peer, server_hash);
            assert_eq!(page, "about.html");
            filename
        }
        other => panic!("unexpected event {other:?}"),
    };

    assert!(filename.ends_with("_about.html"));
    let cached = std::fs::read_to_string(
        harness.client_storage.path().join("html_cache").join(&filename),
    )
    .unwrap();
    assert!(!cached.contains("{{"));
    assert_eq!(cached.matches("LXMF Browser - Link Interceptor").count(), 1);

    harness.shutdown().await;
}

/// S4. Binary download: a non-HTML file is delivered byte-for-byte and
/// cached under its own name, with one `file_received` event.
#[tokio::test]
async fn s4_binary_download() {
    let photo: Vec<u8> = (0..12345u32).map(|b| (b % 256) as u8).collect();
    let pages = vec![
        ("about.html", b"<html><head></head><body>about</body></html>" as &[u8]),
        ("help.html", b"<html><head></head><body>help</body></html>"),
        ("photo.png", photo.as_slice()),
    ];
    let mut harness = Harness::spawn(ServerConfig::default(), &pages).await;

    let mut events = harness.client.events.subscribe();
    let discovered = tokio::time::timeout(Duration::from_secs(2), events.recv())
        .await
        .unwrap()
        .unwrap();
    let server_hash = match discovered {
        ClientEvent::ServerDiscovered { hash, .. } => hash,
        other => panic!("unexpected event {other:?}"),
    };

    harness
        .client
        .request_file(
            harness.client_adapter.as_ref(),
            &harness.client_endpoint,
            server_hash,
            "photo.png",
        )
        .await
        .unwrap();

    let file_received = tokio::time::timeout(Duration::from_secs(2), events.recv())
        .await
        .unwrap()
        .unwrap();
    match file_received {
        ClientEvent::FileReceived { origin_peer, filename, size } => {
            assert_eq!(origin_peer, server_hash);
            assert_eq!(filename, "photo.png");
            assert_eq!(size, 12345);
        }
        other => panic!("unexpected event {other:?}"),
    }

    let cached = std::fs::read(harness.client_storage.path().join("cache").join("photo.png")).unwrap();
    assert_eq!(cached, photo);

    harness.shutdown().await;
}

/// S5. Not found: a missing page produces a 404 and an access-log line
/// ending `FAILED`.
#[tokio::test]
async fn s5_not_found() {
    let server_storage = tempfile::tempdir().unwrap();
    let pages_root = server_storage.path().join("pages");
    std::fs::create_dir_all(&pages_root).unwrap();
    std::fs::write(pages_root.join("about.html"), b"<html></html>").unwrap();

    let network = LoopbackNetwork::new();

    // Subscribe to announces before the server starts: the loopback
    // network has no replay for late subscribers.
    let client_adapter = network.adapter();
    let client_endpoint = client_adapter.register_endpoint("probe").await.unwrap();
    let mut deliveries = client_adapter.subscribe_deliveries(&client_endpoint).await.unwrap();
    let mut announces = client_adapter.subscribe_announces().await.unwrap();

    let server = Server::new(server_storage.path(), ServerConfig::default());
    let server_adapter = Arc::new(network.adapter());
    let (server_shutdown, server_shutdown_rx) = watch::channel(false);
    let server_task = {
        let server_adapter = server_adapter.clone();
        tokio::spawn(async move {
            server.run(server_adapter, server_shutdown_rx).await.unwrap();
        })
    };

    // Find the server's endpoint from its own announce.
    let announce = tokio::time::timeout(Duration::from_secs(2), announces.recv())
        .await
        .unwrap()
        .unwrap();
    let server_hash = announce.peer_hash;

    client_adapter
        .send(&client_endpoint, server_hash, vec![], "GET:missing.html".to_string())
        .await
        .unwrap();

    let response = tokio::time::timeout(Duration::from_secs(2), deliveries.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(response.content, "404: missing.html");

    let log = std::fs::read_to_string(server_storage.path().join("access.log")).unwrap();
    assert!(log.trim_end().ends_with("FAILED"));

    let _ = server_shutdown.send(true);
    let _ = server_task.await;
}

/// S6. Re-announce cadence: with the default 60s interval, a 150s window
/// sees 2-3 announces (initial + periodic). Driven under paused virtual
/// time so the test runs instantly instead of waiting on wall-clock time.
#[tokio::test(start_paused = true)]
async fn s6_reannounce_cadence() {
    let network = LoopbackNetwork::new();
    let adapter = Arc::new(network.adapter());
    let endpoint = adapter.register_endpoint("[HTML] Node").await.unwrap();
    let mut announces = adapter.subscribe_announces().await.unwrap();

    let (_enabled_tx, enabled_rx) = watch::channel(true);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = meshweb_server::scheduler::AnnounceScheduler::new(
        adapter.clone(),
        endpoint,
        "[HTML] Node".to_string(),
        60,
        enabled_rx,
    );
    let handle = tokio::spawn(scheduler.run(shutdown_rx));

    let deadline = tokio::time::Instant::now() + Duration::from_secs(150);
    let mut count = 0;
    loop {
        match tokio::time::timeout_at(deadline, announces.recv()).await {
            Ok(Some(_)) => count += 1,
            _ => break,
        }
    }

    assert!((2..=3).contains(&count), "expected 2-3 announces over 150s, got {count}");

    let _ = shutdown_tx.send(true);
    let _ = handle.await;
}
