//! Catalog domain subsystem.
//!
//! # Data Flow
//! ```text
//! route layer
//!     → service.rs (open span, orchestrate, close span)
//!     → validation.rs (required-field policy)
//!     → store (load / append)
//!     → observability (log record, error counter, span events)
//! ```

pub mod course;
pub mod error;
pub mod service;
pub mod validation;

pub use course::Course;
pub use error::CatalogError;
pub use service::CatalogService;
pub use validation::{RequiredFieldPolicy, Validator};
