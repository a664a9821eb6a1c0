//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::config::validation::{validate_config, ValidationError};
use crate::routing::{Categories, Category, Layout, Pattern, Resolver, Rule};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RootsConfig {
    /// Status written when no rule matches (0 = let the request through).
    pub no_match_status: u16,

    /// Listener settings.
    pub server: ServerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Rules, checked in order.
    pub rules: Vec<RuleConfig>,
}

impl RootsConfig {
    /// Validate and compile into a resolver with a fresh existence cache.
    pub fn build_resolver(&self) -> Result<Resolver, Vec<ValidationError>> {
        validate_config(self)?;

        let rules = self
            .rules
            .iter()
            .filter_map(RuleConfig::to_rule)
            .collect();

        Ok(Resolver::new(rules, self.no_match()))
    }

    /// The no-match status, `None` when configured as 0.
    pub fn no_match(&self) -> Option<StatusCode> {
        match self.no_match_status {
            0 => None,
            code => StatusCode::from_u16(code).ok(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// One rule as written in the config file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RuleConfig {
    /// Pattern token: "", ".", "*" or "?".
    #[serde(default)]
    pub pattern: String,

    /// Base domain the host is matched against.
    pub domain: String,

    /// Base directory for this rule.
    pub root: PathBuf,

    /// Categories to publish.
    #[serde(default = "default_categories")]
    pub categories: Vec<Category>,

    /// Leave the category name out of composed paths.
    #[serde(default)]
    pub skip_category_segment: bool,

    /// Leave the domain out of composed paths.
    #[serde(default)]
    pub skip_domain_segment: bool,

    /// Category names in static, content, template order (0-3 entries).
    #[serde(default)]
    pub names: Vec<String>,
}

fn default_categories() -> Vec<Category> {
    Category::ALL.to_vec()
}

impl RuleConfig {
    /// Compile into a rule. `None` if the pattern token is unknown.
    pub fn to_rule(&self) -> Option<Rule> {
        let pattern = Pattern::from_token(&self.pattern)?;
        let layout = Layout {
            categories: self.categories.iter().copied().collect::<Categories>(),
            skip_category_segment: self.skip_category_segment,
            skip_domain_segment: self.skip_domain_segment,
        };
        Some(Rule::new(pattern, &self.domain, &self.root, layout, self.names.as_slice()))
    }
}
