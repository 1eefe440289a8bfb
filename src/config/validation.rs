//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, poll interval > 0)
//! - Check that hosts parse as absolute http(s) URLs
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ClientConfig → Result<(), Vec<ValidationError>>

use std::fmt;

use tracing_subscriber::EnvFilter;
use url::Url;

use crate::config::schema::{BackoffKind, ClientConfig};

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.platform.host) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::new(
            "platform.host",
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(
            "platform.host",
            format!("invalid URL '{}': {}", config.platform.host, e),
        )),
    }

    if !matches!(config.http.node_scheme.as_str(), "http" | "https") {
        errors.push(ValidationError::new(
            "http.node_scheme",
            "must be http or https",
        ));
    }
    if config.http.request_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "http.request_timeout_secs",
            "must be greater than 0",
        ));
    }
    if config.http.connect_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "http.connect_timeout_secs",
            "must be greater than 0",
        ));
    }

    let confirmation = &config.confirmation;
    if confirmation.poll_interval_ms == 0 {
        errors.push(ValidationError::new(
            "confirmation.poll_interval_ms",
            "must be greater than 0",
        ));
    }
    if confirmation.lookup_timeout_ms == 0 {
        errors.push(ValidationError::new(
            "confirmation.lookup_timeout_ms",
            "must be greater than 0",
        ));
    }
    if confirmation.max_rounds == Some(0) {
        errors.push(ValidationError::new(
            "confirmation.max_rounds",
            "must be at least 1 when set",
        ));
    }
    if confirmation.backoff == BackoffKind::Exponential
        && confirmation.max_delay_ms < confirmation.poll_interval_ms
    {
        errors.push(ValidationError::new(
            "confirmation.max_delay_ms",
            "must not be smaller than poll_interval_ms",
        ));
    }

    if let Err(e) = EnvFilter::try_new(&config.observability.log_level) {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("invalid filter: {}", e),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
