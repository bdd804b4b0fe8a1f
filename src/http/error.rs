//! Mapping of catalog errors onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;

use crate::catalog::CatalogError;

const STORAGE_UNAVAILABLE: &str = "The course catalog is temporarily unavailable.";

pub fn status_for(err: &CatalogError) -> StatusCode {
    match err {
        CatalogError::MissingFields { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        CatalogError::NotFound { .. } => StatusCode::NOT_FOUND,
        CatalogError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Message safe to show to the client. Storage details stay in the logs.
pub fn public_message(err: &CatalogError) -> String {
    if err.is_user_facing() {
        err.to_string()
    } else {
        STORAGE_UNAVAILABLE.to_string()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    missing_fields: Vec<&'static str>,
}

/// JSON error response for the `/api` routes.
#[derive(Debug)]
pub struct ApiError(pub CatalogError);

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let missing_fields = match &self.0 {
            CatalogError::MissingFields { fields } => fields.clone(),
            _ => Vec::new(),
        };
        let body = ErrorBody {
            error: public_message(&self.0),
            missing_fields,
        };
        (status_for(&self.0), Json(body)).into_response()
    }
}
