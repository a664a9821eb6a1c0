//! Shared utilities for integration tests.

use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::mpsc;

use domain_roots::config::{RootsConfig, RuleConfig};
use domain_roots::routing::{Category, Resolver};
use domain_roots::{HttpServer, Shutdown};

/// Create `root/<rel>` directories, each holding an `index.html` with `body`.
#[allow(dead_code)]
pub fn site(root: &Path, rel: &str, body: &str) -> PathBuf {
    let dir = root.join(rel);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("index.html"), body).unwrap();
    dir
}

/// A rule config publishing only the static category.
#[allow(dead_code)]
pub fn static_rule(pattern: &str, domain: &str, root: &Path) -> RuleConfig {
    RuleConfig {
        pattern: pattern.into(),
        domain: domain.into(),
        root: root.to_path_buf(),
        categories: vec![Category::Static],
        skip_category_segment: false,
        skip_domain_segment: false,
        names: Vec::new(),
    }
}

/// A running server and the handles needed to drive it.
#[allow(dead_code)]
pub struct TestServer {
    pub addr: SocketAddr,
    pub resolver_tx: mpsc::UnboundedSender<Resolver>,
    pub shutdown: Shutdown,
}

/// Start the server on an ephemeral port.
#[allow(dead_code)]
pub async fn start_server(mut config: RootsConfig) -> TestServer {
    config.server.bind_address = "127.0.0.1:0".into();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let (resolver_tx, resolver_updates) = mpsc::unbounded_channel();
    let server = HttpServer::new(config).unwrap();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, resolver_updates, server_shutdown).await;
    });

    // Wait for server to start
    tokio::time::sleep(Duration::from_millis(100)).await;

    TestServer {
        addr,
        resolver_tx,
        shutdown,
    }
}

/// Client that never reuses connections.
#[allow(dead_code)]
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
