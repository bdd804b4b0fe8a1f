//! Span export.
//!
//! Catalog spans are recorded by the OpenTelemetry SDK. This module builds the
//! tracer provider from the `[tracing]` section and supplies the one exporter
//! the service ships with: [`JsonFileExporter`], which appends each finished
//! span to a file as a JSON line. Queueing, batching and export deadlines are
//! left to the SDK's batch span processor.

use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use opentelemetry::trace::{SpanId, Status};
use opentelemetry::Value;
use opentelemetry_sdk::error::{OTelSdkError, OTelSdkResult};
use opentelemetry_sdk::trace::{
    BatchConfigBuilder, BatchSpanProcessor, Sampler, SdkTracerProvider, SpanData, SpanExporter,
};
use opentelemetry_sdk::Resource;
use serde::Serialize;
use thiserror::Error;

use crate::config::{ExporterKind, TracingConfig};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("span export I/O error: {0}")]
    Io(#[from] io::Error),
}

/// One exported span, as written to the export file.
#[derive(Debug, Serialize)]
struct SpanLine<'a> {
    service_name: &'a str,
    trace_id: String,
    span_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_span_id: Option<String>,
    name: &'a str,
    kind: String,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    attributes: BTreeMap<&'a str, serde_json::Value>,
    events: Vec<EventLine<'a>>,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    status_message: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct EventLine<'a> {
    name: &'a str,
    timestamp: DateTime<Utc>,
}

fn json_value(value: &Value) -> serde_json::Value {
    match value {
        Value::Bool(v) => serde_json::Value::from(*v),
        Value::I64(v) => serde_json::Value::from(*v),
        Value::F64(v) => serde_json::Value::from(*v),
        other => serde_json::Value::from(other.as_str().into_owned()),
    }
}

impl<'a> SpanLine<'a> {
    fn new(service_name: &'a str, span: &'a SpanData) -> Self {
        let (status, status_message) = match &span.status {
            Status::Ok => ("ok", None),
            Status::Error { description } => ("error", Some(&**description)),
            _ => ("unset", None),
        };
        let context = &span.span_context;

        Self {
            service_name,
            trace_id: context.trace_id().to_string(),
            span_id: context.span_id().to_string(),
            parent_span_id: (span.parent_span_id != SpanId::INVALID)
                .then(|| span.parent_span_id.to_string()),
            name: &span.name,
            kind: format!("{:?}", span.span_kind).to_lowercase(),
            start_time: span.start_time.into(),
            end_time: span.end_time.into(),
            attributes: span
                .attributes
                .iter()
                .map(|kv| (kv.key.as_str(), json_value(&kv.value)))
                .collect(),
            events: span
                .events
                .events
                .iter()
                .map(|e| EventLine {
                    name: &e.name,
                    timestamp: e.timestamp.into(),
                })
                .collect(),
            status,
            status_message,
        }
    }
}

/// Appends each exported span as one JSON line to a file.
#[derive(Debug)]
pub struct JsonFileExporter {
    path: PathBuf,
    service_name: String,
    file: Mutex<File>,
}

impl JsonFileExporter {
    pub fn open(path: impl Into<PathBuf>, service_name: impl Into<String>) -> Result<Self, ExportError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            service_name: service_name.into(),
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_batch(&self, batch: &[SpanData]) -> OTelSdkResult {
        let mut lines = Vec::new();
        for span in batch {
            serde_json::to_writer(&mut lines, &SpanLine::new(&self.service_name, span))
                .map_err(|e| OTelSdkError::InternalFailure(e.to_string()))?;
            lines.push(b'\n');
        }

        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        file.write_all(&lines)
            .and_then(|()| file.flush())
            .map_err(|e| {
                tracing::warn!(path = %self.path.display(), error = %e, "Span export failed");
                OTelSdkError::InternalFailure(e.to_string())
            })
    }
}

impl SpanExporter for JsonFileExporter {
    fn export(&self, batch: Vec<SpanData>) -> impl std::future::Future<Output = OTelSdkResult> + Send {
        std::future::ready(self.write_batch(&batch))
    }
}

/// Build the tracer provider described by the `[tracing]` section.
///
/// A disabled section samples nothing. The `none` exporter records spans
/// without exporting them. The `file` exporter sits behind a batch processor
/// with a queue of `queue_capacity` spans, flushed every `scheduled_delay_ms`.
pub fn provider_from_config(config: &TracingConfig) -> Result<SdkTracerProvider, ExportError> {
    let resource = Resource::builder()
        .with_service_name(config.service_name.clone())
        .build();
    let builder = SdkTracerProvider::builder().with_resource(resource);

    if !config.enabled {
        return Ok(builder.with_sampler(Sampler::AlwaysOff).build());
    }

    match config.exporter {
        ExporterKind::None => Ok(builder.build()),
        ExporterKind::File => {
            let exporter = JsonFileExporter::open(&config.export_path, &config.service_name)?;
            tracing::info!(path = %exporter.path().display(), "Exporting spans to file");

            let batch_config = BatchConfigBuilder::default()
                .with_max_queue_size(config.queue_capacity)
                .with_scheduled_delay(Duration::from_millis(config.scheduled_delay_ms))
                .build();
            let processor = BatchSpanProcessor::builder(exporter)
                .with_batch_config(batch_config)
                .build();
            Ok(builder.with_span_processor(processor).build())
        }
    }
}
