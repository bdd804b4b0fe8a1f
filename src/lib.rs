//! Course catalog service library

pub mod catalog;
pub mod config;
pub mod http;
pub mod observability;
pub mod store;

pub use catalog::{CatalogError, CatalogService, Course};
pub use config::CatalogConfig;
pub use http::HttpServer;
