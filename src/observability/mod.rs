//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Catalog operations produce:
//!     → logging.rs  (one JSON record per event, appended to the log file)
//!     → errors.rs   (process-wide failure counter)
//!     → tracing.rs  (one OpenTelemetry span per operation, attributes + ordered events)
//!     → metrics.rs  (counters)
//!
//! Consumers:
//!     → Log file (JSON Lines) and console (tracing-subscriber)
//!     → export.rs (SDK batch processor → JSON-lines file exporter)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Every component here fails open; none can change an operation's result
//! - Shared state (error counter) is owned explicitly and passed by `Arc`

pub mod errors;
pub mod export;
pub mod logging;
pub mod metrics;
pub mod tracing;

pub use errors::{ErrorCounter, ErrorKind};
pub use export::{provider_from_config, ExportError, JsonFileExporter};
pub use logging::{LogLevel, LogRecord, StructuredLogger};
pub use self::tracing::{ActiveSpan, OperationContext, Tracer, TRACER_NAME};
