//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (request ID, tracing, timeout, root resolution)
//! - Serve static files from the resolved static directory
//! - Swap in reloaded rules without restarting
//! - Bind server to listener and shut down gracefully

use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceExt;
use tower_http::{services::ServeDir, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::{ConfigError, RootsConfig};
use crate::http::middleware::{resolve_roots, RootsState};
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::lifecycle::signals::wait_for_shutdown;
use crate::routing::{Resolver, RootPaths};

/// Path of the endpoint reporting the roots resolved for a request.
pub const ROOTS_ENDPOINT: &str = "/_roots";

/// HTTP server serving per-host static roots.
pub struct HttpServer {
    router: Router,
    roots: RootsState,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: RootsConfig) -> Result<Self, ConfigError> {
        let resolver = config.build_resolver().map_err(ConfigError::Validation)?;
        let roots = RootsState::new(resolver);

        tracing::info!(
            rules = config.rules.len(),
            no_match_status = config.no_match_status,
            "Root path rules loaded"
        );

        let router = Self::build_router(&config, roots.clone());
        Ok(Self { router, roots })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RootsConfig, roots: RootsState) -> Router {
        Router::new()
            .route(ROOTS_ENDPOINT, get(roots_handler))
            .fallback(static_handler)
            .layer(middleware::from_fn_with_state(roots, resolve_roots))
            .layer(TimeoutLayer::new(Duration::from_secs(config.server.request_timeout_secs)))
            .layer(TraceLayer::new_for_http())
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Resolvers received on `resolver_updates` replace the active rules;
    /// the server stops when `shutdown` fires or on Ctrl+C.
    pub async fn run(
        self,
        listener: TcpListener,
        mut resolver_updates: mpsc::UnboundedReceiver<Resolver>,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let roots = self.roots.clone();
        let reloader = tokio::spawn(async move {
            while let Some(resolver) = resolver_updates.recv().await {
                let rules = resolver.rules().len();
                roots.replace(resolver);
                tracing::info!(rules, "Root path rules swapped");
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(wait_for_shutdown(shutdown))
            .await?;

        reloader.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Report the directories resolved for this request.
async fn roots_handler(paths: RootPaths) -> Json<RootPaths> {
    Json(paths)
}

/// Serve the request path out of the resolved static directory.
async fn static_handler(paths: RootPaths, request: Request<Body>) -> Response {
    let Some(dir) = paths.static_dir else {
        tracing::debug!(path = %request.uri().path(), "No static directory for request");
        return StatusCode::NOT_FOUND.into_response();
    };

    match ServeDir::new(dir).oneshot(request).await {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}
