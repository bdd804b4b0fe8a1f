//! Distributed tracing support.
//!
//! # Responsibilities
//! - Open one OpenTelemetry span per catalog operation
//! - Attach HTTP request context uniformly (method, URL, client address)
//! - Collect attributes and ordered events while the operation runs
//! - End the span exactly once and leave export to the SDK's span processor
//!
//! # Design Decisions
//! - [`ActiveSpan`] is an RAII handle: dropping it ends the span, so every
//!   exit path (early return, `?`, panic unwind) reaches the processor
//! - Export fails open; the provider's processor owns queueing, batching and
//!   export deadlines
//! - Each span is mirrored by a `tracing` span so console logs correlate

use std::borrow::Cow;
use std::fmt;
use std::net::IpAddr;
use std::sync::{Mutex, PoisonError};

use opentelemetry::trace::{Span as _, SpanBuilder, SpanKind, Status, Tracer as _, TracerProvider as _};
use opentelemetry::{KeyValue, Value};
use opentelemetry_sdk::trace::{SdkTracer, SdkTracerProvider, Span};

/// Instrumentation scope name for catalog spans.
pub const TRACER_NAME: &str = "course-catalog";

/// Request metadata an operation was triggered with.
///
/// Callers outside the HTTP layer use [`OperationContext::internal`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationContext {
    pub method: Option<String>,
    pub url: Option<String>,
    pub client_ip: Option<IpAddr>,
    pub request_id: Option<String>,
}

impl OperationContext {
    pub fn internal() -> Self {
        Self::default()
    }

    pub fn is_http(&self) -> bool {
        self.method.is_some()
    }

    fn attributes(&self) -> Vec<KeyValue> {
        let mut attributes = Vec::with_capacity(4);
        if let Some(method) = &self.method {
            attributes.push(KeyValue::new("http.method", method.clone()));
        }
        if let Some(url) = &self.url {
            attributes.push(KeyValue::new("http.url", url.clone()));
        }
        if let Some(ip) = self.client_ip {
            attributes.push(KeyValue::new("http.client_ip", ip.to_string()));
        }
        if let Some(request_id) = &self.request_id {
            attributes.push(KeyValue::new("http.request_id", request_id.clone()));
        }
        attributes
    }
}

/// Opens catalog spans on an SDK tracer provider.
#[derive(Clone)]
pub struct Tracer {
    provider: SdkTracerProvider,
    tracer: SdkTracer,
}

impl fmt::Debug for Tracer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tracer")
            .field("scope", &TRACER_NAME)
            .finish_non_exhaustive()
    }
}

impl Tracer {
    pub fn new(provider: SdkTracerProvider) -> Self {
        let tracer = provider.tracer(TRACER_NAME);
        Self { provider, tracer }
    }

    pub fn provider(&self) -> &SdkTracerProvider {
        &self.provider
    }

    /// Flush queued spans and stop the provider's processors.
    pub fn shutdown(&self) {
        if let Err(e) = self.provider.shutdown() {
            ::tracing::warn!(error = %e, "Tracer provider shutdown failed");
        }
    }

    /// Open a span. It stays open until the handle is ended or dropped.
    pub fn start_span(&self, name: &'static str, kind: SpanKind) -> ActiveSpan {
        self.open(name, self.tracer.span_builder(name).with_kind(kind))
    }

    /// Open the span for one catalog operation, tagged with whatever request
    /// context is known.
    pub fn start_operation(&self, name: &'static str, ctx: &OperationContext) -> ActiveSpan {
        let kind = if ctx.is_http() {
            SpanKind::Server
        } else {
            SpanKind::Internal
        };
        let builder = self
            .tracer
            .span_builder(name)
            .with_kind(kind)
            .with_attributes(ctx.attributes());
        self.open(name, builder)
    }

    fn open(&self, name: &'static str, builder: SpanBuilder) -> ActiveSpan {
        let span = builder.start(&self.tracer);
        let context = span.span_context();
        let mirror = ::tracing::info_span!(
            "span",
            otel.name = name,
            trace_id = %context.trace_id(),
            span_id = %context.span_id(),
        );

        ActiveSpan {
            span: Mutex::new(span),
            mirror,
        }
    }
}

/// Handle to an open span.
pub struct ActiveSpan {
    span: Mutex<Span>,
    mirror: ::tracing::Span,
}

impl fmt::Debug for ActiveSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveSpan")
            .field("mirror", &self.mirror)
            .finish_non_exhaustive()
    }
}

impl ActiveSpan {
    fn with_span(&self, f: impl FnOnce(&mut Span)) {
        let mut span = self.span.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut span);
    }

    /// Set an attribute. A later value for the same key wins.
    pub fn set_attribute(&self, key: &'static str, value: impl Into<Value>) {
        let attribute = KeyValue::new(key, value);
        self.with_span(|s| s.set_attribute(attribute));
    }

    /// Record a count, saturating at `i64::MAX`.
    pub fn set_count(&self, key: &'static str, value: impl TryInto<i64>) {
        self.set_attribute(key, value.try_into().unwrap_or(i64::MAX));
    }

    /// Append a timestamped event.
    pub fn add_event(&self, message: impl Into<Cow<'static, str>>) {
        let message = message.into();
        {
            let _entered = self.mirror.enter();
            ::tracing::debug!(event = %message, "span event");
        }
        self.with_span(|s| s.add_event(message, Vec::new()));
    }

    pub fn set_status(&self, status: Status) {
        self.with_span(|s| s.set_status(status));
    }

    /// The mirrored `tracing` span, for instrumenting futures.
    pub fn tracing_span(&self) -> &::tracing::Span {
        &self.mirror
    }

    /// End the span now.
    pub fn end(self) {
        // Drop does the work.
    }
}

impl Drop for ActiveSpan {
    fn drop(&mut self) {
        // The SDK ignores every end after the first.
        self.with_span(|s| s.end());
    }
}
