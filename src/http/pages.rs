//! HTML page handlers.

use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;
use url::form_urlencoded;

use crate::catalog::{CatalogError, Course};
use crate::http::error::{public_message, status_for};
use crate::http::server::AppState;
use crate::http::views::{self, Flash, FlashLevel};
use crate::observability::OperationContext;

/// Flash message carried across a redirect in the query string.
#[derive(Debug, Default, Deserialize)]
pub struct FlashQuery {
    notice: Option<String>,
    level: Option<String>,
}

impl FlashQuery {
    fn flash(self) -> Option<Flash> {
        let message = self.notice.filter(|m| !m.is_empty())?;
        Some(Flash {
            level: FlashLevel::parse(self.level.as_deref().unwrap_or_default()),
            message,
        })
    }
}

fn redirect_with_flash(path: &str, level: FlashLevel, message: &str) -> Redirect {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("level", level.as_str())
        .append_pair("notice", message)
        .finish();
    Redirect::to(&format!("{}?{}", path, query))
}

fn error_page(err: &CatalogError) -> Response {
    let flash = Flash {
        level: FlashLevel::Error,
        message: public_message(err),
    };
    (status_for(err), Html(views::message("Error", &flash))).into_response()
}

pub async fn index(State(state): State<AppState>, ctx: OperationContext) -> Html<String> {
    state.service.visit_index(&ctx);
    Html(views::index())
}

pub async fn catalog(
    State(state): State<AppState>,
    ctx: OperationContext,
    Query(query): Query<FlashQuery>,
) -> Response {
    match state.service.list_courses(&ctx).await {
        Ok(courses) => Html(views::catalog(&courses, query.flash().as_ref())).into_response(),
        Err(e) => error_page(&e),
    }
}

pub async fn add_course_form() -> Html<String> {
    Html(views::add_course_form(&Course::default(), None))
}

pub async fn add_course(
    State(state): State<AppState>,
    ctx: OperationContext,
    Form(course): Form<Course>,
) -> Response {
    let name = course.name.clone();
    let retained = course.clone();

    match state.service.add_course(&ctx, course).await {
        Ok(()) => redirect_with_flash(
            "/catalog",
            FlashLevel::Success,
            &format!("Course '{}' added successfully!", name),
        )
        .into_response(),
        Err(e @ CatalogError::MissingFields { .. }) => {
            let flash = Flash {
                level: FlashLevel::Error,
                message: e.to_string(),
            };
            (
                status_for(&e),
                Html(views::add_course_form(&retained, Some(&flash))),
            )
                .into_response()
        }
        Err(e) => error_page(&e),
    }
}

pub async fn course_details(
    State(state): State<AppState>,
    ctx: OperationContext,
    Path(code): Path<String>,
) -> Response {
    match state.service.get_course(&ctx, &code).await {
        Ok(course) => Html(views::course_details(&course)).into_response(),
        Err(e) => error_page(&e),
    }
}

pub async fn manual_trace(State(state): State<AppState>, ctx: OperationContext) -> &'static str {
    state.service.manual_trace(&ctx);
    "Manual trace recorded!"
}

/// Traced only by the request layer, never by the catalog tracer.
pub async fn auto_instrumented() -> &'static str {
    tracing::info!("Serving auto-instrumented route");
    "This route is auto-instrumented!"
}
