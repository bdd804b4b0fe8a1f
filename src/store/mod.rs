//! Catalog storage subsystem.
//!
//! # Data Flow
//! ```text
//! load():  blocking worker: catalog file → serde_json → Vec<Course>   (missing file → empty)
//! save():  lock → blocking worker [read → push → temp file → fsync → rename → unlock]
//! ```
//!
//! # Design Decisions
//! - The whole collection is rewritten on every append
//! - Saves are serialized; loads are lock-free and see the old or new file
//! - The caller's wait is bounded by a timeout; an abandoned rewrite keeps
//!   the lock until it finishes

pub mod file;

pub use file::{CatalogStore, StorageError};
