//! Root path resolution middleware.
//!
//! Runs the resolver for each request and stores the resulting
//! [`RootPaths`] in the request extensions, where handlers extract it.
//! Several of these layers can be stacked with different resolvers; the
//! first one to match marks the request resolved and the rest step aside.

use std::convert::Infallible;
use std::sync::Arc;

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{header, request::Parts, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::routing::{Resolution, Resolver, RootPaths};

/// State for [`resolve_roots`]: the current resolver, swappable on reload.
#[derive(Clone)]
pub struct RootsState {
    resolver: Arc<ArcSwap<Resolver>>,
}

impl RootsState {
    pub fn new(resolver: Resolver) -> Self {
        Self {
            resolver: Arc::new(ArcSwap::from_pointee(resolver)),
        }
    }

    /// Current resolver.
    pub fn resolver(&self) -> Arc<Resolver> {
        self.resolver.load_full()
    }

    /// Replace the resolver. In-flight requests keep the one they loaded.
    pub fn replace(&self, resolver: Resolver) {
        self.resolver.store(Arc::new(resolver));
    }
}

/// Host the request was addressed to: the `Host` header, else the URI authority.
pub fn request_host<B>(req: &Request<B>) -> Option<&str> {
    req.headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .or_else(|| req.uri().authority().map(|a| a.as_str()))
}

/// Middleware resolving root directories for the request host.
pub async fn resolve_roots(
    State(state): State<RootsState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let mut paths = req.extensions_mut().remove::<RootPaths>().unwrap_or_default();
    let host = request_host(&req).unwrap_or_default().to_string();

    let resolution = state.resolver.load().resolve(&host, &mut paths);
    if let Resolution::Unmatched { status: Some(status) } = resolution {
        return status.into_response();
    }

    req.extensions_mut().insert(paths);
    next.run(req).await
}

impl<S> FromRequestParts<S> for RootPaths
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<RootPaths>().cloned().unwrap_or_default())
    }
}
