//! Process-wide failure accounting.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::observability::metrics;

/// Category of a counted failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A submission lacked required fields.
    MissingFields,
    /// Persisting the catalog failed.
    StorageWrite,
    /// Reading the catalog failed.
    StorageRead,
}

impl ErrorKind {
    /// Value recorded in the `error.type` span attribute.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::MissingFields => "MissingFields",
            ErrorKind::StorageWrite => "FileWriteError",
            ErrorKind::StorageRead => "FileReadError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Monotonic count of validation and storage failures.
///
/// One counter covers every kind; the kind only labels the exported metric.
/// There is no decrement or reset.
#[derive(Debug, Default)]
pub struct ErrorCounter {
    total: AtomicU64,
}

impl ErrorCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one failure and return the new total.
    pub fn increment(&self, kind: ErrorKind) -> u64 {
        let total = self.total.fetch_add(1, Ordering::SeqCst) + 1;
        metrics::record_error(kind);
        total
    }

    pub fn current(&self) -> u64 {
        self.total.load(Ordering::SeqCst)
    }
}
