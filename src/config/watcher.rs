//! Configuration file watcher for hot reload.
//!
//! # Responsibilities
//! - Watch the rules file for changes
//! - Coalesce the burst of events a single save produces
//! - Load, validate and compile the new rules off the request path
//!
//! # Design Decisions
//! - Only compiled resolvers are sent; a file that fails to load or
//!   validate is logged and the running rules stay in place
//! - The watch stops when the returned `RecommendedWatcher` is dropped

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::{load_config, ConfigError};
use crate::routing::Resolver;

/// Quiet period after the last file event before reloading.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(250);

/// Load `path` and compile it into a resolver with a fresh existence cache.
pub fn reload(path: &Path) -> Result<Resolver, ConfigError> {
    load_config(path)?
        .build_resolver()
        .map_err(ConfigError::Validation)
}

/// Watches a rules file and publishes a new [`Resolver`] after each change.
pub struct ConfigWatcher {
    path: PathBuf,
    debounce: Duration,
    updates: mpsc::UnboundedSender<Resolver>,
}

impl ConfigWatcher {
    /// Returns the watcher and the receiving end for rebuilt resolvers.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<Resolver>) {
        let (updates, updates_rx) = mpsc::unbounded_channel();
        let watcher = Self {
            path: path.to_path_buf(),
            debounce: DEFAULT_DEBOUNCE,
            updates,
        };
        (watcher, updates_rx)
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Start watching. Must be called from within a tokio runtime.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                    let _ = event_tx.send(());
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = %e, "Config watch error"),
            },
            Config::default(),
        )?;
        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(
            path = %self.path.display(),
            debounce = ?self.debounce,
            "Config watcher started"
        );
        tokio::spawn(self.reload_loop(event_rx));
        Ok(watcher)
    }

    async fn reload_loop(self, mut events: mpsc::UnboundedReceiver<()>) {
        while events.recv().await.is_some() {
            // Wait until the file has been quiet for a full debounce period
            loop {
                match tokio::time::timeout(self.debounce, events.recv()).await {
                    Ok(Some(())) => continue,
                    Ok(None) => return,
                    Err(_) => break,
                }
            }

            match reload(&self.path) {
                Ok(resolver) => {
                    tracing::info!(
                        path = %self.path.display(),
                        rules = resolver.rules().len(),
                        "Config reloaded"
                    );
                    if self.updates.send(resolver).is_err() {
                        return;
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to reload config, keeping current rules");
                }
            }
        }
    }
}
