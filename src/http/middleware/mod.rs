//! Request middleware.

pub mod roots;

pub use roots::{request_host, resolve_roots, RootsState};
