//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use opentelemetry_sdk::trace::{InMemorySpanExporter, SdkTracerProvider, SpanData};
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use course_catalog::catalog::{RequiredFieldPolicy, Validator};
use course_catalog::config::CatalogConfig;
use course_catalog::http::HttpServer;
use course_catalog::observability::{ErrorCounter, StructuredLogger, Tracer};
use course_catalog::store::CatalogStore;
use course_catalog::CatalogService;

/// A running catalog server backed by a temporary directory.
pub struct TestServer {
    pub addr: SocketAddr,
    pub service: Arc<CatalogService>,
    pub spans: InMemorySpanExporter,
    pub dir: TempDir,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.dir.path().join("course_catalog.json")
    }

    pub fn log_path(&self) -> PathBuf {
        self.dir.path().join("app_logs.jsonl")
    }

    /// Spans ended so far, in the order they ended.
    pub fn finished_spans(&self) -> Vec<SpanData> {
        self.spans.get_finished_spans().unwrap()
    }
}

/// Last value recorded for `key` on `span`, rendered as a string.
pub fn attribute(span: &SpanData, key: &str) -> Option<String> {
    span.attributes
        .iter()
        .rev()
        .find(|kv| kv.key.as_str() == key)
        .map(|kv| kv.value.as_str().into_owned())
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// Start a server on an ephemeral port with the given field policy.
pub async fn start_server(policy: RequiredFieldPolicy) -> TestServer {
    start_server_with_store(policy, |path| CatalogStore::new(path, Duration::from_secs(5))).await
}

/// Start a server whose store is built by `store` from the catalog path.
pub async fn start_server_with_store(
    policy: RequiredFieldPolicy,
    store: impl FnOnce(&Path) -> CatalogStore,
) -> TestServer {
    let dir = tempfile::tempdir().unwrap();
    let spans = InMemorySpanExporter::default();
    let provider = SdkTracerProvider::builder()
        .with_simple_exporter(spans.clone())
        .build();

    let service = Arc::new(CatalogService::new(
        Arc::new(store(&dir.path().join("course_catalog.json"))),
        Validator::new(policy),
        Arc::new(ErrorCounter::new()),
        Arc::new(StructuredLogger::open(dir.path().join("app_logs.jsonl")).unwrap()),
        Tracer::new(provider),
    ));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(&CatalogConfig::default(), service.clone());
    let (tx, rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        let _ = server
            .run(listener, async {
                let _ = rx.await;
            })
            .await;
    });

    TestServer {
        addr,
        service,
        spans,
        dir,
        shutdown: Some(tx),
    }
}

/// A client that reports redirects instead of following them.
pub fn no_redirect_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

/// URL-encode form fields for an `application/x-www-form-urlencoded` body.
pub fn form_body(fields: &[(&str, &str)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(fields)
        .finish()
}
