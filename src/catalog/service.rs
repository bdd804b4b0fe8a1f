//! Catalog operations.
//!
//! # State Machine
//! ```text
//! Started → Validating → Invalid ─────────────────────────┐
//!                      → Valid → Persisting → Persisted ──┤
//!                                           → StorageFailed┤
//!                                                          ▼
//!                                                      Completed (span closed)
//! ```
//!
//! # Design Decisions
//! - Every public operation opens its span through `Tracer::start_operation`
//!   and closes it through `complete`, whatever branch was taken
//! - A submission with missing fields is rejected before anything is written
//! - A storage failure aborts the operation and is returned to the caller
//! - Lookup misses are user-facing but are not counted as errors

use std::net::IpAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashSet;
use opentelemetry::trace::Status;
use tracing::Instrument;

use crate::catalog::{CatalogError, Course, Validator};
use crate::config::CatalogConfig;
use crate::observability::logging::LogError;
use crate::observability::{
    metrics, ActiveSpan, ErrorCounter, ErrorKind, OperationContext, StructuredLogger, Tracer,
};
use crate::store::CatalogStore;

/// Orchestrates validation, persistence, logging and tracing.
#[derive(Debug)]
pub struct CatalogService {
    store: Arc<CatalogStore>,
    validator: Validator,
    errors: Arc<ErrorCounter>,
    logger: Arc<StructuredLogger>,
    tracer: Tracer,
    catalog_access_count: AtomicU64,
    seen_clients: DashSet<IpAddr>,
}

impl CatalogService {
    pub fn new(
        store: Arc<CatalogStore>,
        validator: Validator,
        errors: Arc<ErrorCounter>,
        logger: Arc<StructuredLogger>,
        tracer: Tracer,
    ) -> Self {
        Self {
            store,
            validator,
            errors,
            logger,
            tracer,
            catalog_access_count: AtomicU64::new(0),
            seen_clients: DashSet::new(),
        }
    }

    /// Build the store, validator and logger from configuration. Spans go
    /// to `tracer`, whose provider the caller built from the same config.
    pub fn from_config(config: &CatalogConfig, tracer: Tracer) -> Result<Self, LogError> {
        let store = CatalogStore::new(
            &config.storage.catalog_path,
            Duration::from_millis(config.storage.io_timeout_ms),
        );
        let logger = StructuredLogger::open(&config.logging.log_path)?;

        Ok(Self::new(
            Arc::new(store),
            Validator::new(config.validation.policy),
            Arc::new(ErrorCounter::new()),
            Arc::new(logger),
            tracer,
        ))
    }

    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    pub fn logger(&self) -> &StructuredLogger {
        &self.logger
    }

    pub fn tracer(&self) -> &Tracer {
        &self.tracer
    }

    /// Current value of the shared error counter.
    pub fn error_count(&self) -> u64 {
        self.errors.current()
    }

    /// Number of times the catalog has been listed since startup.
    pub fn access_count(&self) -> u64 {
        self.catalog_access_count.load(Ordering::Relaxed)
    }

    /// Return the full catalog in insertion order.
    pub async fn list_courses(&self, ctx: &OperationContext) -> Result<Vec<Course>, CatalogError> {
        let span = self.tracer.start_operation("course_catalog", ctx);
        let result = self
            .list_courses_in(&span)
            .instrument(span.tracing_span().clone())
            .await;
        self.complete(span, "list_courses", &result);
        result
    }

    async fn list_courses_in(&self, span: &ActiveSpan) -> Result<Vec<Course>, CatalogError> {
        let access_count = self.catalog_access_count.fetch_add(1, Ordering::Relaxed) + 1;
        span.set_count("catalog.access_count", access_count);

        span.add_event("Loading courses from file");
        let courses = self.load_counted(span).await?;
        span.set_count("course.count", courses.len());

        self.logger.info("Course catalog loaded successfully");
        Ok(courses)
    }

    /// Validate and append a submitted course.
    pub async fn add_course(&self, ctx: &OperationContext, course: Course) -> Result<(), CatalogError> {
        let span = self.tracer.start_operation("add_course", ctx);
        let result = self
            .add_course_in(&span, course)
            .instrument(span.tracing_span().clone())
            .await;
        self.complete(span, "add_course", &result);
        result
    }

    async fn add_course_in(&self, span: &ActiveSpan, course: Course) -> Result<(), CatalogError> {
        span.set_attribute("course.code", course.code.clone());
        span.set_attribute("course.name", course.name.clone());

        span.add_event("Validating course data");
        let missing = self.validator.validate(&course);
        if !missing.is_empty() {
            let err = CatalogError::MissingFields { fields: missing };
            self.record_failure(span, ErrorKind::MissingFields, &err.to_string());
            return Err(err);
        }

        span.add_event("Saving course data to file");
        let (code, name) = (course.code.clone(), course.name.clone());
        match self.store.save(course).await {
            Ok(size) => {
                span.set_count("catalog.size", size);
                self.logger
                    .info(format!("Course '{}' added with code '{}'", name, code));
                Ok(())
            }
            Err(e) => {
                let kind = if e.is_write() {
                    ErrorKind::StorageWrite
                } else {
                    ErrorKind::StorageRead
                };
                let message = format!("Error saving course data: {}", e);
                self.record_failure(span, kind, &message);
                Err(e.into())
            }
        }
    }

    /// Find the first course whose code matches exactly.
    pub async fn get_course(&self, ctx: &OperationContext, code: &str) -> Result<Course, CatalogError> {
        let span = self.tracer.start_operation("course_details", ctx);
        let result = self
            .get_course_in(&span, code)
            .instrument(span.tracing_span().clone())
            .await;
        self.complete(span, "get_course", &result);
        result
    }

    async fn get_course_in(&self, span: &ActiveSpan, code: &str) -> Result<Course, CatalogError> {
        span.add_event("Loading courses from file");
        let courses = self.load_counted(span).await?;
        span.set_count("course.count", courses.len());

        span.add_event(format!("Searching for course with code {}", code));
        match courses.into_iter().find(|c| c.code == code) {
            Some(course) => {
                span.set_attribute("course.code", course.code.clone());
                span.set_attribute("course.name", course.name.clone());
                Ok(course)
            }
            None => {
                let err = CatalogError::NotFound {
                    code: code.to_string(),
                };
                span.add_event(err.to_string());
                Err(err)
            }
        }
    }

    /// Record a landing-page visit. The first visit from each client address
    /// is logged; returns whether this was that first visit.
    pub fn visit_index(&self, ctx: &OperationContext) -> bool {
        let span = self.tracer.start_operation("index", ctx);
        let first_visit = match ctx.client_ip {
            Some(ip) if self.seen_clients.insert(ip) => {
                self.logger.info(format!("User IP: {}", ip));
                true
            }
            _ => false,
        };
        span.set_attribute("client.first_visit", first_visit);
        self.complete(span, "index", &Ok::<_, CatalogError>(()));
        first_visit
    }

    /// A span with no catalog work behind it, for checking the trace pipeline.
    pub fn manual_trace(&self, ctx: &OperationContext) {
        let span = self.tracer.start_operation("manual-span", ctx);
        span.add_event("Processing request");
        self.complete(span, "manual_trace", &Ok::<_, CatalogError>(()));
    }

    async fn load_counted(&self, span: &ActiveSpan) -> Result<Vec<Course>, CatalogError> {
        match self.store.load().await {
            Ok(courses) => Ok(courses),
            Err(e) => {
                let message = format!("Error loading course data: {}", e);
                self.record_failure(span, ErrorKind::StorageRead, &message);
                Err(e.into())
            }
        }
    }

    /// Count, log and annotate one failure.
    fn record_failure(&self, span: &ActiveSpan, kind: ErrorKind, message: &str) -> u64 {
        let count = self.errors.increment(kind);
        self.logger.error(message);
        span.set_attribute("error.type", kind.as_str());
        span.set_count("error.count", count);
        span.add_event(message.to_string());
        count
    }

    fn complete<T>(&self, span: ActiveSpan, operation: &'static str, result: &Result<T, CatalogError>) {
        let outcome = match result {
            Ok(_) => "succeeded",
            Err(CatalogError::MissingFields { .. }) => "invalid",
            Err(CatalogError::Storage(_)) => "storage_failed",
            Err(CatalogError::NotFound { .. }) => "not_found",
        };
        span.set_attribute("operation.outcome", outcome);
        span.set_status(if result.is_ok() {
            Status::Ok
        } else {
            Status::error(outcome)
        });
        metrics::record_operation(operation, outcome);
        span.end();
    }
}
