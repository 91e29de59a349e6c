use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Local;
use serde::Deserialize;
use serde_json::json;

use super::domain::{TestId, TestRecordDraft, TestRecordUpdate};
use super::repository::{RepositoryError, TestRepository};
use super::service::{PrioritizationService, PrioritizationServiceError};
use crate::workflows::tabular::CodecError;

/// Router builder exposing the test catalog, CSV exchange and reports.
pub fn prioritization_router<R>(service: Arc<PrioritizationService<R>>) -> Router
where
    R: TestRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/tests",
            get(list_handler::<R>).post(create_handler::<R>),
        )
        .route("/api/v1/tests/import", post(import_handler::<R>))
        .route("/api/v1/tests/export", get(export_handler::<R>))
        .route(
            "/api/v1/tests/:test_id",
            get(fetch_handler::<R>)
                .put(update_handler::<R>)
                .delete(delete_handler::<R>),
        )
        .route("/api/v1/report", get(report_handler::<R>))
        .route("/api/v1/report/html", get(report_html_handler::<R>))
        .route("/api/v1/report/text", get(report_text_handler::<R>))
        .route("/api/v1/report/markdown", get(report_markdown_handler::<R>))
        .route("/api/v1/report/matrix", get(matrix_handler::<R>))
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ImportParams {
    #[serde(default)]
    replace: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MatrixParams {
    x: String,
    y: String,
}

pub(crate) async fn list_handler<R>(
    State(service): State<Arc<PrioritizationService<R>>>,
) -> Response
where
    R: TestRepository + 'static,
{
    match service.ranked() {
        Ok(ranked) => (StatusCode::OK, axum::Json(ranked)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_handler<R>(
    State(service): State<Arc<PrioritizationService<R>>>,
    axum::Json(draft): axum::Json<TestRecordDraft>,
) -> Response
where
    R: TestRepository + 'static,
{
    match service.add(draft) {
        Ok(scored) => (StatusCode::CREATED, axum::Json(scored)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn fetch_handler<R>(
    State(service): State<Arc<PrioritizationService<R>>>,
    Path(test_id): Path<u64>,
) -> Response
where
    R: TestRepository + 'static,
{
    match service.get(TestId(test_id)) {
        Ok(scored) => (StatusCode::OK, axum::Json(scored)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn update_handler<R>(
    State(service): State<Arc<PrioritizationService<R>>>,
    Path(test_id): Path<u64>,
    axum::Json(update): axum::Json<TestRecordUpdate>,
) -> Response
where
    R: TestRepository + 'static,
{
    match service.edit(TestId(test_id), &update) {
        Ok(scored) => (StatusCode::OK, axum::Json(scored)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn delete_handler<R>(
    State(service): State<Arc<PrioritizationService<R>>>,
    Path(test_id): Path<u64>,
) -> Response
where
    R: TestRepository + 'static,
{
    match service.delete(TestId(test_id)) {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn report_handler<R>(
    State(service): State<Arc<PrioritizationService<R>>>,
) -> Response
where
    R: TestRepository + 'static,
{
    match service.report() {
        Ok(report) => (StatusCode::OK, axum::Json(report.summary())).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn report_html_handler<R>(
    State(service): State<Arc<PrioritizationService<R>>>,
) -> Response
where
    R: TestRepository + 'static,
{
    match service.report_html(Local::now().naive_local()) {
        Ok(html) => (StatusCode::OK, Html(html)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn report_text_handler<R>(
    State(service): State<Arc<PrioritizationService<R>>>,
) -> Response
where
    R: TestRepository + 'static,
{
    match service.report_text(Local::now().naive_local()) {
        Ok(text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            text,
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn report_markdown_handler<R>(
    State(service): State<Arc<PrioritizationService<R>>>,
) -> Response
where
    R: TestRepository + 'static,
{
    match service.report_markdown(Local::now().naive_local()) {
        Ok(markdown) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/markdown; charset=utf-8")],
            markdown,
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn matrix_handler<R>(
    State(service): State<Arc<PrioritizationService<R>>>,
    Query(params): Query<MatrixParams>,
) -> Response
where
    R: TestRepository + 'static,
{
    match service.matrix(&params.x, &params.y) {
        Ok(matrix) => (StatusCode::OK, axum::Json(matrix)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn import_handler<R>(
    State(service): State<Arc<PrioritizationService<R>>>,
    Query(params): Query<ImportParams>,
    body: String,
) -> Response
where
    R: TestRepository + 'static,
{
    match service.import_csv(body.as_bytes(), params.replace) {
        Ok(imported) => (
            StatusCode::OK,
            axum::Json(json!({ "imported": imported, "replace": params.replace })),
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn export_handler<R>(
    State(service): State<Arc<PrioritizationService<R>>>,
) -> Response
where
    R: TestRepository + 'static,
{
    let mut buffer = Vec::new();
    match service.export_csv(&mut buffer) {
        Ok(_) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"test-priorities.csv\"",
                ),
            ],
            buffer,
        )
            .into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: PrioritizationServiceError) -> Response {
    let status = match &error {
        PrioritizationServiceError::InvalidDraft(_) | PrioritizationServiceError::Scoring(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        PrioritizationServiceError::Codec(CodecError::Io(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        PrioritizationServiceError::Codec(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PrioritizationServiceError::Repository(RepositoryError::NotFound(_)) => {
            StatusCode::NOT_FOUND
        }
        PrioritizationServiceError::Repository(RepositoryError::Conflict(_)) => StatusCode::CONFLICT,
        PrioritizationServiceError::Repository(RepositoryError::Rejected(_)) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        PrioritizationServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        PrioritizationServiceError::Matrix(_) => StatusCode::BAD_REQUEST,
    };

    let payload = match &error {
        PrioritizationServiceError::Codec(codec) => json!({
            "error": error.to_string(),
            "problems": codec
                .problems()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>(),
        }),
        _ => json!({ "error": error.to_string() }),
    };

    (status, axum::Json(payload)).into_response()
}
