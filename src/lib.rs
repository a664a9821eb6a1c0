//! Per-host directory roots for multi-domain web hosting.
//!
//! Resolves the static, content and template directories of a request from
//! its Host header and an ordered list of domain rules, and carries the
//! result through an axum pipeline as [`RootPaths`].

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::schema::RootsConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{Resolution, Resolver, RootPaths, Rule};
