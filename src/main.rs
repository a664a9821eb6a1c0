//! Multi-domain static server.
//!
//! # Architecture Overview
//!
//! ```text
//!                              ┌───────────────────────────────────────────────┐
//!                              │                 DOMAIN ROOTS                  │
//!     Client Request           │  ┌─────────┐    ┌──────────────┐              │
//!     ─────────────────────────┼─▶│  http   │───▶│   routing    │              │
//!      Host: cc.example.com    │  │ server  │    │   resolver   │──┐           │
//!                              │  └─────────┘    └──────┬───────┘  │ auto      │
//!                              │                        │          ▼ pattern   │
//!                              │                        │   ┌─────────────┐    │
//!                              │                        │   │  existence  │    │
//!                              │                        │   │    cache    │    │
//!                              │                        ▼   └─────────────┘    │
//!     Client Response          │  ┌─────────┐    ┌──────────────┐              │
//!     ◀────────────────────────┼──│ static  │◀───│  RootPaths   │              │
//!                              │  │ handler │    │ (extensions) │              │
//!                              │  └─────────┘    └──────────────┘              │
//!                              │                                               │
//!                              │   config (+ watcher) · observability · lifecycle
//!                              └───────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use domain_roots::config::{load_config, watcher::ConfigWatcher, RootsConfig};
use domain_roots::observability::{logging, metrics};
use domain_roots::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "domain-roots")]
#[command(about = "Serve static files from per-host directory roots", long_about = None)]
struct Args {
    /// Path to the TOML rules file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured bind address.
    #[arg(short, long)]
    bind: Option<String>,

    /// Reload rules when the config file changes.
    #[arg(long)]
    watch: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => RootsConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.server.bind_address = bind;
    }

    logging::init(&config.observability.log_level);
    tracing::info!("domain-roots v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.server.bind_address,
        rules = config.rules.len(),
        request_timeout_secs = config.server.request_timeout_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // Keep the watcher alive for the lifetime of the server
    let (resolver_updates, _watcher) = match (&args.config, args.watch) {
        (Some(path), true) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (updates, Some(watcher.run()?))
        }
        _ => (mpsc::unbounded_channel().1, None),
    };

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    server.run(listener, resolver_updates, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
