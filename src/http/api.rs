//! JSON API handlers under `/api`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};

use crate::catalog::{Course, RequiredFieldPolicy};
use crate::http::error::ApiError;
use crate::http::server::AppState;
use crate::observability::OperationContext;

/// Service status report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusReport {
    pub version: String,
    pub status: String,
    pub error_count: u64,
    pub catalog_access_count: u64,
    pub required_fields: RequiredFieldPolicy,
}

pub async fn list_courses(
    State(state): State<AppState>,
    ctx: OperationContext,
) -> Result<Json<Vec<Course>>, ApiError> {
    Ok(Json(state.service.list_courses(&ctx).await?))
}

pub async fn add_course(
    State(state): State<AppState>,
    ctx: OperationContext,
    Json(course): Json<Course>,
) -> Result<(StatusCode, Json<Course>), ApiError> {
    state.service.add_course(&ctx, course.clone()).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

pub async fn get_course(
    State(state): State<AppState>,
    ctx: OperationContext,
    Path(code): Path<String>,
) -> Result<Json<Course>, ApiError> {
    Ok(Json(state.service.get_course(&ctx, &code).await?))
}

pub async fn status(State(state): State<AppState>) -> Json<StatusReport> {
    Json(StatusReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "operational".to_string(),
        error_count: state.service.error_count(),
        catalog_access_count: state.service.access_count(),
        required_fields: state.service.validator().policy(),
    })
}
