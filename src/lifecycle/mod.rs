//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Shutdown (shutdown.rs):
//!     Shutdown::trigger() → broadcast to subscribers → server stops accepting → drain → exit
//!
//! Signals (signals.rs):
//!     Ctrl+C or broadcast → graceful shutdown future resolves
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
