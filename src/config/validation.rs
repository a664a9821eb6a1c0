//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject pattern tokens the matcher does not know
//! - Reject rules that could never publish a directory
//! - Validate value ranges (status codes, addresses)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RootsConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use crate::config::schema::RootsConfig;
use crate::routing::Pattern;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("rule {rule}: unknown pattern {token:?}")]
    UnknownPattern { rule: usize, token: String },

    #[error("rule {rule}: domain is empty")]
    EmptyDomain { rule: usize },

    #[error("rule {rule}: no categories selected")]
    NoCategories { rule: usize },

    #[error("rule {rule}: {count} category names given, at most 3 allowed")]
    TooManyNames { rule: usize, count: usize },

    #[error("no_match_status {0} is not a valid HTTP status")]
    InvalidStatus(u16),

    #[error("invalid {field} {value:?}")]
    InvalidAddress { field: &'static str, value: String },
}

/// Check `config` and return every problem found.
pub fn validate_config(config: &RootsConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.no_match_status != 0 && !(100..=999).contains(&config.no_match_status) {
        errors.push(ValidationError::InvalidStatus(config.no_match_status));
    }

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "server.bind_address",
            value: config.server.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    for (rule, rc) in config.rules.iter().enumerate() {
        if Pattern::from_token(&rc.pattern).is_none() {
            errors.push(ValidationError::UnknownPattern {
                rule,
                token: rc.pattern.clone(),
            });
        }
        if rc.domain.is_empty() {
            errors.push(ValidationError::EmptyDomain { rule });
        }
        if rc.categories.is_empty() {
            errors.push(ValidationError::NoCategories { rule });
        }
        if rc.names.len() > 3 {
            errors.push(ValidationError::TooManyNames {
                rule,
                count: rc.names.len(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
