//! Catalog operation errors.

use thiserror::Error;

use crate::store::StorageError;

/// Failure of a catalog operation, as reported to the route layer.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The submission lacked required fields. Nothing was persisted.
    #[error("Missing required fields: {}", fields.join(", "))]
    MissingFields { fields: Vec<&'static str> },

    /// Reading or writing the catalog failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// No course has the requested code.
    #[error("No course found with code '{code}'.")]
    NotFound { code: String },
}

impl CatalogError {
    /// Whether the message is meant for the end user rather than operators.
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, CatalogError::Storage(_))
    }
}
