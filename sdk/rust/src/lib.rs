//! Client for the course catalog JSON API.

mod client;

pub use client::{CatalogClient, Course, StatusReport};
