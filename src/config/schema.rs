//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the service.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::catalog::RequiredFieldPolicy;

/// Root configuration for the catalog service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CatalogConfig {
    /// HTTP listener settings.
    pub server: ServerConfig,

    /// Catalog file settings.
    pub storage: StorageConfig,

    /// Structured log and console log settings.
    pub logging: LoggingConfig,

    /// Span export settings.
    pub tracing: TracingConfig,

    /// Required-field policy for submissions.
    pub validation: ValidationConfig,

    /// Metrics settings.
    pub observability: ObservabilityConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1:5000").
    pub bind_address: String,

    /// Total time allowed per request, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:5000".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Catalog storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file holding the catalog array.
    pub catalog_path: PathBuf,

    /// Upper bound on each load or save, in milliseconds.
    pub io_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            catalog_path: PathBuf::from("course_catalog.json"),
            io_timeout_ms: 5_000,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Append-only JSON Lines file for structured records.
    pub log_path: PathBuf,

    /// Console filter directive (trace, debug, info, warn, error), used when
    /// `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from("app_logs.jsonl"),
            level: "info".to_string(),
        }
    }
}

/// Where finished spans go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExporterKind {
    /// Discard spans.
    None,
    /// Append spans as JSON lines to `export_path`.
    #[default]
    File,
}

/// Span export configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TracingConfig {
    /// Enable span export. When false every span is discarded.
    pub enabled: bool,

    /// Value of the `service.name` attribute on every span.
    pub service_name: String,

    /// Exporter backend.
    pub exporter: ExporterKind,

    /// Output file for the `file` exporter.
    pub export_path: PathBuf,

    /// Spans the batch processor buffers before new ones are dropped.
    pub queue_capacity: usize,

    /// Interval between batch exports, in milliseconds.
    pub scheduled_delay_ms: u64,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            service_name: "course-catalog-service".to_string(),
            exporter: ExporterKind::File,
            export_path: PathBuf::from("spans.jsonl"),
            queue_capacity: 2048,
            scheduled_delay_ms: 1_000,
        }
    }
}

/// Submission validation configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// `minimal` (code and name) or `strict` (all fields).
    pub policy: RequiredFieldPolicy,
}

/// Metrics configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Enable the Prometheus endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
