//! Host-based directory resolution subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Host header ("cc.example.com:8080")
//!     → resolver.rs (strip port, iterate rules in order)
//!     → matcher.rs (suffix match, extract subdomain prefix)
//!     → rule.rs (compose root/[prefix.]domain/category per enabled category)
//!     → cache.rs (auto pattern only: does the composed dir exist?)
//!     → paths.rs (RootPaths published for downstream handlers)
//!
//! Rule Compilation (at startup):
//!     RuleConfig[]
//!     → Parse pattern tokens, default category names
//!     → Freeze as immutable Resolver
//! ```
//!
//! # Design Decisions
//! - Rules compiled at startup, immutable at runtime
//! - No regex in hot path (suffix matching only)
//! - First match wins (configuration order)
//! - Existence cache is per resolver, never invalidated

pub mod cache;
pub mod matcher;
pub mod paths;
pub mod resolver;
pub mod rule;

pub use cache::{DirProbe, ExistenceCache, FsProbe};
pub use matcher::{match_host, Pattern};
pub use paths::{ContentDir, RootPaths, StaticDir, TemplateDir};
pub use resolver::{strip_port, Resolution, Resolver};
pub use rule::{Categories, Category, Layout, Rule};
