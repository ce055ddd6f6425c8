use axum::extract::{Path, Query, State};
use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::browser::{
    ClassBrowser, DELETE_FAILED_MESSAGE, DeleteOutcome, LOAD_FAILED_MESSAGE, delete_prompt,
};
use crate::dialog::{Notice, RecordingNotifier};
use crate::navigation::{RecordingNavigator, Route};
use crate::roster::RosterEditor;
use crate::{AppState, error::ApiError, models::ClassRecord, models::StudentEntry};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateClassRequest {
    #[schema(example = "Mathematics 101")]
    pub name: String,
    #[serde(default)]
    pub students: Vec<StudentEntry>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateClassResponse {
    pub id: String,
    pub name: String,
    pub total_students: usize,
    /// Indices of roster rows left out because a field was blank.
    pub dropped_rows: Vec<usize>,
    pub notice: Notice,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NoticeResponse {
    pub notice: Notice,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectResponse {
    #[schema(example = "/attendance/q8ZbN3vXyT1kLmP0aBcD")]
    pub route: String,
    pub class_id: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    pub name: Option<String>,
    #[serde(default)]
    pub confirm: bool,
}

fn issued_notice(notifier: &RecordingNotifier) -> Result<Notice, ApiError> {
    notifier
        .last_notice()
        .ok_or_else(|| ApiError::Internal("workflow finished without a notice".into()))
}

#[utoipa::path(get, path = "/", tag = "classes")]
pub async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "Classroom Attendance API",
        "endpoints": {
            "/classes": "List (GET) or create (POST) classes",
            "/classes/{id}": "Delete a class (DELETE, requires confirm=true)",
            "/classes/{id}/select": "Open a class in the attendance view (POST)"
        }
    }))
}

#[utoipa::path(get, path = "/healthz/live", tag = "classes")]
pub async fn healthz_live() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

#[utoipa::path(get, path = "/healthz/ready", tag = "classes")]
pub async fn healthz_ready() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

#[utoipa::path(
    get,
    path = "/classes",
    responses(
        (status = 200, description = "Every class in the collection", body = [ClassRecord]),
        (status = 403, description = "Database rules rejected the read"),
        (status = 503, description = "Database unavailable")
    ),
    tag = "classes"
)]
pub async fn list_classes(
    State(state): State<AppState>,
) -> Result<Json<Vec<ClassRecord>>, ApiError> {
    let notifier = RecordingNotifier::default();
    let mut browser = ClassBrowser::new();
    browser
        .refresh(state.repository.as_ref(), &notifier)
        .await
        .map_err(|err| ApiError::from_repository(&err, LOAD_FAILED_MESSAGE))?;
    Ok(Json(browser.classes().to_vec()))
}

#[utoipa::path(
    post,
    path = "/classes",
    request_body = CreateClassRequest,
    responses(
        (status = 201, description = "Class created", body = CreateClassResponse),
        (status = 422, description = "Empty class name or no complete student row"),
        (status = 403, description = "Database rules rejected the write"),
        (status = 503, description = "Database unavailable"),
        (status = 502, description = "Database returned another error")
    ),
    tag = "classes"
)]
pub async fn create_class(
    State(state): State<AppState>,
    Json(body): Json<CreateClassRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let notifier = RecordingNotifier::default();
    let navigator = RecordingNavigator::new();
    let mut editor = RosterEditor::with_form(body.name, body.students);

    let created = editor
        .submit(state.repository.as_ref(), &notifier, &navigator)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateClassResponse {
            id: created.id,
            name: created.name,
            total_students: created.total_students,
            dropped_rows: created.dropped_rows,
            notice: issued_notice(&notifier)?,
        }),
    ))
}

#[utoipa::path(
    delete,
    path = "/classes/{id}",
    params(
        ("id" = String, Path, description = "Class document id"),
        ("name" = Option<String>, Query, description = "Class name shown in the prompt"),
        ("confirm" = Option<bool>, Query, description = "Must be true to actually delete")
    ),
    responses(
        (status = 200, description = "Class deleted", body = NoticeResponse),
        (status = 428, description = "Deletion not confirmed; body is the prompt"),
        (status = 403, description = "Database rules rejected the delete"),
        (status = 503, description = "Database unavailable")
    ),
    tag = "classes"
)]
pub async fn delete_class(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<NoticeResponse>, ApiError> {
    let name = query.name.unwrap_or_else(|| id.clone());
    let notifier = RecordingNotifier::answering(query.confirm);
    let mut browser = ClassBrowser::new();

    match browser
        .delete_class(&id, &name, state.repository.as_ref(), &notifier)
        .await
    {
        DeleteOutcome::Cancelled => Err(ApiError::PreconditionRequired(delete_prompt(&name).text)),
        DeleteOutcome::Deleted => Ok(Json(NoticeResponse {
            notice: issued_notice(&notifier)?,
        })),
        DeleteOutcome::Failed(err) => Err(ApiError::from_repository(&err, DELETE_FAILED_MESSAGE)),
    }
}

#[utoipa::path(
    post,
    path = "/classes/{id}/select",
    params(("id" = String, Path, description = "Class document id")),
    responses(
        (status = 200, description = "Where the client should go next", body = SelectResponse)
    ),
    tag = "classes"
)]
pub async fn select_class(Path(id): Path<String>) -> Json<SelectResponse> {
    let navigator = RecordingNavigator::new();
    let mut browser = ClassBrowser::new();
    browser.select_class(&id, &navigator);

    let route = navigator.current().unwrap_or(Route::Attendance {
        class_id: id.clone(),
    });
    Json(SelectResponse {
        route: route.path(),
        class_id: id,
    })
}
