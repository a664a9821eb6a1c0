//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup)
//!     → request.rs (assign x-request-id)
//!     → middleware/roots.rs (resolve Host → RootPaths, or answer no-match status)
//!     → handlers (static files from RootPaths.static_dir, /_roots report)
//!     → Send to client
//! ```

pub mod middleware;
pub mod request;
pub mod server;

pub use middleware::{resolve_roots, RootsState};
pub use request::X_REQUEST_ID;
pub use server::HttpServer;
