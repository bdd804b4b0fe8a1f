//! Course catalog service
//!
//! A small web application that lets users browse a catalog of courses,
//! view one course, and submit new ones.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http (router, request ID, timeout)
//!                        │
//!                        ▼
//!                     catalog::CatalogService ──▶ Validator
//!                        │        │
//!                        │        └──────────────▶ store::CatalogStore ──▶ catalog JSON file
//!                        ▼
//!                     observability
//!                        ├─ StructuredLogger ──▶ log file (JSON lines)
//!                        ├─ ErrorCounter ──────▶ metrics
//!                        └─ Tracer ────────────▶ OpenTelemetry SDK ──▶ span file
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use opentelemetry::trace::TracerProvider as _;
use tokio::net::TcpListener;
use tracing::Level;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use course_catalog::config::load_or_default;
use course_catalog::http::{shutdown_signal, HttpServer};
use course_catalog::observability::{metrics, provider_from_config, Tracer};
use course_catalog::CatalogService;

#[derive(Parser)]
#[command(name = "course-catalog")]
#[command(about = "Course catalog web service", long_about = None)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the bind address from the configuration
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let mut config = load_or_default(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.server.bind_address = bind;
    }

    let provider = provider_from_config(&config.tracing)?;

    // Request spans from the HTTP layer are exported alongside catalog spans.
    let request_spans = tracing_opentelemetry::layer()
        .with_tracer(provider.tracer("tower-http"))
        .with_filter(Targets::new().with_target("tower_http", Level::INFO));

    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "course_catalog={},catalog={},tower_http=info",
                    config.logging.level, config.logging.level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(request_spans)
        .init();

    tracing::info!("course-catalog v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.server.bind_address,
        catalog_path = %config.storage.catalog_path.display(),
        log_path = %config.logging.log_path.display(),
        required_fields = ?config.validation.policy,
        request_timeout_secs = config.server.request_timeout_secs,
        span_exporter = ?config.tracing.exporter,
        span_export_path = %config.tracing.export_path.display(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let service = Arc::new(CatalogService::from_config(&config, Tracer::new(provider))?);

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(&config, service.clone());
    server.run(listener, shutdown_signal()).await?;

    service.tracer().shutdown();

    tracing::info!("Shutdown complete");
    Ok(())
}
