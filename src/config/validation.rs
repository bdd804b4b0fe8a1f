//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: CatalogConfig → Result<(), Vec<ValidationError>>

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::{CatalogConfig, ExporterKind};

/// One semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending key, e.g. `server.bind_address`.
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

impl std::error::Error for ValidationError {}

/// Check a parsed configuration for values serde cannot reject.
pub fn validate_config(config: &CatalogConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "server.bind_address",
            format!("'{}' is not a socket address", config.server.bind_address),
        ));
    }
    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::new("server.request_timeout_secs", "must be greater than 0"));
    }

    if config.storage.catalog_path.as_os_str().is_empty() {
        errors.push(ValidationError::new("storage.catalog_path", "must not be empty"));
    }
    if config.storage.io_timeout_ms == 0 {
        errors.push(ValidationError::new("storage.io_timeout_ms", "must be greater than 0"));
    }

    if config.logging.log_path.as_os_str().is_empty() {
        errors.push(ValidationError::new("logging.log_path", "must not be empty"));
    }
    if config.logging.log_path == config.storage.catalog_path {
        errors.push(ValidationError::new(
            "logging.log_path",
            "must differ from storage.catalog_path",
        ));
    }

    let tracing = &config.tracing;
    if tracing.service_name.trim().is_empty() {
        errors.push(ValidationError::new("tracing.service_name", "must not be empty"));
    }
    if tracing.enabled && tracing.exporter == ExporterKind::File {
        if tracing.export_path.as_os_str().is_empty() {
            errors.push(ValidationError::new("tracing.export_path", "required by the file exporter"));
        }
        if tracing.queue_capacity == 0 {
            errors.push(ValidationError::new("tracing.queue_capacity", "must be greater than 0"));
        }
        if tracing.scheduled_delay_ms == 0 {
            errors.push(ValidationError::new("tracing.scheduled_delay_ms", "must be greater than 0"));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
