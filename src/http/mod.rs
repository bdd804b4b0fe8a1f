//! HTTP surface of the catalog.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, tracing, timeout)
//!     → context.rs (OperationContext from method, URL, peer, request ID)
//!     → pages.rs / api.rs (call CatalogService)
//!     → error.rs (CatalogError → status code)
//!     → views.rs (HTML) or JSON
//! ```

pub mod api;
pub mod context;
pub mod error;
pub mod pages;
pub mod server;
pub mod views;

pub use api::StatusReport;
pub use context::X_REQUEST_ID;
pub use error::ApiError;
pub use server::{shutdown_signal, AppState, HttpServer};
