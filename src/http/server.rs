//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with the page and API handlers
//! - Wire up middleware (request ID, tracing, timeout)
//! - Bind the server to a listener and serve until shutdown

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};
use tracing::Level;

use crate::catalog::CatalogService;
use crate::config::CatalogConfig;
use crate::http::{api, pages};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<CatalogService>,
}

/// HTTP server for the course catalog.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(config: &CatalogConfig, service: Arc<CatalogService>) -> Self {
        let state = AppState { service };
        let router = Self::build_router(config, state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &CatalogConfig, state: AppState) -> Router {
        Router::new()
            .route("/", get(pages::index))
            .route("/catalog", get(pages::catalog))
            .route(
                "/add_course",
                get(pages::add_course_form).post(pages::add_course),
            )
            .route("/course/{code}", get(pages::course_details))
            .route("/manual-trace", get(pages::manual_trace))
            .route("/auto-instrumented", get(pages::auto_instrumented))
            .route(
                "/api/courses",
                get(api::list_courses).post(api::add_course),
            )
            .route("/api/courses/{code}", get(api::get_course))
            .route("/api/status", get(api::status))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(
                        TraceLayer::new_for_http()
                            .make_span_with(DefaultMakeSpan::new().level(Level::INFO)),
                    )
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.server.request_timeout_secs,
                    ))),
            )
    }

    /// The router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` resolves.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Wait for shutdown signal (Ctrl+C).
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{RequiredFieldPolicy, Validator};
    use crate::observability::tracing::testing::{attribute, finished, memory_tracer};
    use crate::observability::{ErrorCounter, StructuredLogger, Tracer};
    use crate::store::CatalogStore;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn server(dir: &std::path::Path, tracer: Tracer) -> HttpServer {
        let service = CatalogService::new(
            Arc::new(CatalogStore::new(
                dir.join("course_catalog.json"),
                Duration::from_secs(5),
            )),
            Validator::new(RequiredFieldPolicy::Minimal),
            Arc::new(ErrorCounter::new()),
            Arc::new(StructuredLogger::open(dir.join("app_logs.jsonl")).unwrap()),
            tracer,
        );
        HttpServer::new(&CatalogConfig::default(), Arc::new(service))
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), 1 << 20)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_request_id_is_set_and_propagated() {
        let dir = tempfile::tempdir().unwrap();
        let (tracer, exporter) = memory_tracer();
        let router = server(dir.path(), tracer).router();

        let response = router
            .clone()
            .oneshot(Request::get("/manual-trace").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let request_id = response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .unwrap();
        assert_eq!(body_text(response).await, "Manual trace recorded!");

        let spans = finished(&exporter);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].name, "manual-span");
        assert_eq!(attribute(&spans[0], "http.request_id"), Some(request_id));
    }

    #[tokio::test]
    async fn test_form_submission_redirects_to_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let router = server(dir.path(), memory_tracer().0).router();

        let response = router
            .clone()
            .oneshot(
                Request::post("/add_course")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body(Body::from("code=CS101&name=Intro+to+CS"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response.headers()["location"].to_str().unwrap().to_string();
        assert!(location.starts_with("/catalog?"));

        let response = router
            .oneshot(Request::get(location.as_str()).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let html = body_text(response).await;
        assert!(html.contains("Course &#x27;Intro to CS&#x27; added successfully!"));
        assert!(html.contains("CS101"));
    }

    #[tokio::test]
    async fn test_missing_fields_rerenders_form() {
        let dir = tempfile::tempdir().unwrap();
        let router = server(dir.path(), memory_tracer().0).router();

        let response = router
            .oneshot(
                Request::post("/add_course")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body(Body::from("code=CS101&instructor=Dr.+Smith"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let html = body_text(response).await;
        assert!(html.contains("Missing required fields: name"));
        assert!(html.contains("value=\"Dr. Smith\""));
    }

    #[tokio::test]
    async fn test_unknown_course_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let router = server(dir.path(), memory_tracer().0).router();

        let response = router
            .oneshot(Request::get("/course/CS999").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body_text(response).await.contains("No course found with code &#x27;CS999&#x27;."));
    }

    #[tokio::test]
    async fn test_auto_instrumented_records_no_catalog_span() {
        let dir = tempfile::tempdir().unwrap();
        let (tracer, exporter) = memory_tracer();
        let router = server(dir.path(), tracer).router();

        let response = router
            .oneshot(Request::get("/auto-instrumented").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(finished(&exporter).is_empty());
    }

    #[tokio::test]
    async fn test_catalog_links_encode_reserved_characters() {
        let dir = tempfile::tempdir().unwrap();
        let router = server(dir.path(), memory_tracer().0).router();

        let response = router
            .clone()
            .oneshot(
                Request::post("/add_course")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body(Body::from("code=CS+101%23a%3Fb&name=Odd+Code"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let response = router
            .clone()
            .oneshot(Request::get("/catalog").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let html = body_text(response).await;
        let href = "/course/CS%20101%23a%3Fb";
        assert!(html.contains(&format!("href=\"{}\"", href)), "{}", html);

        let response = router
            .oneshot(Request::get(href).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains("Odd Code"));
    }
}
