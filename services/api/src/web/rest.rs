//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the document and task endpoints and the
//! master definition for the OpenAPI specification.

use crate::web::{
    account, calendar,
    protocol::{
        CyclePriorityResponse, DeleteResponse, MutationResponse, SelectionPayload,
        SetDueDateRequest, SetPriorityRequest, SubmitResponse,
    },
    state::AppState,
};
use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use scando_core::{
    history::{self, DocumentProgress},
    study_plan, AnalysisMode, Document, DocumentId, Priority, TaskId, Upload,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, warn};
use utoipa::OpenApi;
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        list_documents_handler,
        submit_document_handler,
        get_document_handler,
        source_file_handler,
        delete_document_handler,
        clear_documents_handler,
        document_progress_handler,
        document_categories_handler,
        study_plan_handler,
        toggle_task_handler,
        set_priority_handler,
        cycle_priority_handler,
        set_due_date_handler,
        get_selection_handler,
        set_selection_handler,
        history_handler,
        calendar::today_handler,
        calendar::date_handler,
        calendar::month_handler,
        account::subscription_handler,
        account::checkout_handler,
        account::checkout_return_handler,
        account::activate_subscription_handler,
        account::notification_settings_handler,
        account::due_today_handler,
    ),
    components(
        schemas(
            SubmitResponse,
            MutationResponse,
            CyclePriorityResponse,
            DeleteResponse,
            SetPriorityRequest,
            SetDueDateRequest,
            SelectionPayload,
            crate::web::protocol::SubscriptionResponse,
            crate::web::protocol::CheckoutResponse,
            crate::web::protocol::NotificationSettingsRequest,
            crate::web::protocol::NotificationSettingsResponse,
            crate::web::protocol::DueTodayResponse,
        )
    ),
    tags(
        (name = "ScanDo API", description = "Scan documents into tasks, then plan them on a calendar.")
    )
)]
pub struct ApiDoc;

type HandlerError = (StatusCode, String);

//=========================================================================================
// Helpers
//=========================================================================================

fn not_found(what: &str, id: impl std::fmt::Display) -> HandlerError {
    (StatusCode::NOT_FOUND, format!("{} {} not found", what, id))
}

fn serialization_failed(e: serde_json::Error) -> HandlerError {
    error!("Failed to serialize response: {:?}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Failed to serialize response".to_string(),
    )
}

/// Serializes a view borrowed from the store while the store lock is held.
async fn read_view(
    app_state: &AppState,
    f: impl FnOnce(&scando_core::DocumentStore) -> Option<serde_json::Result<serde_json::Value>>,
) -> Result<Option<Json<serde_json::Value>>, HandlerError> {
    match app_state.organizer.read(f).await {
        Some(Ok(value)) => Ok(Some(Json(value))),
        Some(Err(e)) => Err(serialization_failed(e)),
        None => Ok(None),
    }
}

fn guess_mime_type(file_name: &str) -> String {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
    .to_string()
}

fn is_supported_mime_type(mime_type: &str) -> bool {
    mime_type.starts_with("image/") || mime_type == "application/pdf"
}

//=========================================================================================
// Document Handlers
//=========================================================================================

/// List every document, most recent submission first.
#[utoipa::path(
    get,
    path = "/documents",
    responses((status = 200, description = "All documents, newest submission first"))
)]
pub async fn list_documents_handler(State(app_state): State<Arc<AppState>>) -> Json<Vec<Document>> {
    Json(app_state.organizer.documents().await)
}

/// Scan a new document.
///
/// Accepts a multipart/form-data request with a `file` part (image or PDF)
/// and an optional `mode` part (`fast` or `deep`). Returns as soon as the
/// placeholder exists; the analysis completes in the background.
#[utoipa::path(
    post,
    path = "/documents",
    request_body(content_type = "multipart/form-data", description = "The file to scan and an optional analysis mode."),
    responses(
        (status = 202, description = "Scan accepted", body = SubmitResponse),
        (status = 400, description = "Missing file or invalid mode"),
        (status = 402, description = "Deep analysis requires an active subscription"),
        (status = 415, description = "Unsupported file type")
    )
)]
pub async fn submit_document_handler(
    State(app_state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, HandlerError> {
    let mut upload = None;
    let mut mode = AnalysisMode::Fast;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            format!("Failed to read multipart data: {}", e),
        )
    })? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("mode") => {
                let text = field.text().await.map_err(|e| {
                    (StatusCode::BAD_REQUEST, format!("Failed to read mode: {}", e))
                })?;
                mode = text
                    .parse::<AnalysisMode>()
                    .map_err(|e| (StatusCode::BAD_REQUEST, e))?;
            }
            Some("file") => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let mime_type = field
                    .content_type()
                    .map(str::to_string)
                    .filter(|mime| mime != "application/octet-stream")
                    .unwrap_or_else(|| guess_mime_type(&file_name));
                let data = field.bytes().await.map_err(|e| {
                    (
                        StatusCode::BAD_REQUEST,
                        format!("Failed to read file bytes: {}", e),
                    )
                })?;
                upload = Some(Upload::new(file_name, mime_type, data.to_vec()));
            }
            other => warn!("Ignoring unexpected multipart field {:?}", other),
        }
    }

    let upload = upload.ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            "Multipart form must include a file".to_string(),
        )
    })?;
    if upload.bytes.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Uploaded file is empty".to_string()));
    }
    if !is_supported_mime_type(&upload.mime_type) {
        return Err((
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            format!("Unsupported file type '{}'; upload an image or PDF", upload.mime_type),
        ));
    }
    if !app_state.organizer.can_use(mode).await {
        return Err((
            StatusCode::PAYMENT_REQUIRED,
            "Deep analysis requires an active subscription".to_string(),
        ));
    }

    let submission = app_state.organizer.submit(upload, mode).await;
    let response = SubmitResponse {
        document_id: submission.document_id.as_uuid(),
        status: "processing".to_string(),
    };
    Ok((StatusCode::ACCEPTED, Json(response)))
}

/// Fetch one document.
#[utoipa::path(
    get,
    path = "/documents/{id}",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (status = 200, description = "The document"),
        (status = 404, description = "No such document")
    )
)]
pub async fn get_document_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Document>, HandlerError> {
    app_state
        .organizer
        .document(DocumentId::from(id))
        .await
        .map(Json)
        .ok_or_else(|| not_found("Document", id))
}

/// Download the file a document was scanned from.
#[utoipa::path(
    get,
    path = "/documents/{id}/file",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (status = 200, description = "The uploaded file, with its original content type"),
        (status = 404, description = "No such document, or its file is gone")
    )
)]
pub async fn source_file_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HandlerError> {
    let file = app_state
        .organizer
        .source_file(DocumentId::from(id))
        .await
        .map_err(|e| {
            error!("Failed to read the file of document {}: {}", id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to read the stored file".to_string(),
            )
        })?
        .ok_or_else(|| not_found("File for document", id))?;
    Ok(([(header::CONTENT_TYPE, file.mime_type)], file.bytes))
}

/// Delete a document and all of its tasks.
#[utoipa::path(
    delete,
    path = "/documents/{id}",
    params(("id" = Uuid, Path, description = "Document id")),
    responses((status = 200, description = "Deletion outcome", body = DeleteResponse))
)]
pub async fn delete_document_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Json<DeleteResponse> {
    let outcome = app_state.organizer.delete_document(DocumentId::from(id)).await;
    Json(DeleteResponse {
        removed: outcome.removed,
        selection_cleared: outcome.selection_cleared,
    })
}

/// Delete every document.
#[utoipa::path(
    delete,
    path = "/documents",
    responses((status = 204, description = "All data cleared"))
)]
pub async fn clear_documents_handler(State(app_state): State<Arc<AppState>>) -> StatusCode {
    app_state.organizer.clear_all().await;
    StatusCode::NO_CONTENT
}

/// Completion counts for one document.
#[utoipa::path(
    get,
    path = "/documents/{id}/progress",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (status = 200, description = "Completed and total task counts"),
        (status = 404, description = "No such document")
    )
)]
pub async fn document_progress_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<DocumentProgress>, HandlerError> {
    app_state
        .organizer
        .read(|store| store.document(DocumentId::from(id)).map(DocumentProgress::of))
        .await
        .map(Json)
        .ok_or_else(|| not_found("Document", id))
}

/// A document's tasks grouped by category.
#[utoipa::path(
    get,
    path = "/documents/{id}/categories",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (status = 200, description = "Category groups in first-appearance order"),
        (status = 404, description = "No such document")
    )
)]
pub async fn document_categories_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, HandlerError> {
    read_view(&app_state, |store| {
        store
            .document(DocumentId::from(id))
            .map(|doc| serde_json::to_value(history::tasks_by_category(doc)))
    })
    .await?
    .ok_or_else(|| not_found("Document", id))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StudyPlanView<'a> {
    plan: &'a scando_core::StudyPlan,
    estimated_completion: Option<chrono::NaiveDate>,
    today: Option<&'a scando_core::StudyDay>,
}

/// The study plan of a deep-analyzed document.
#[utoipa::path(
    get,
    path = "/documents/{id}/study-plan",
    params(("id" = Uuid, Path, description = "Document id")),
    responses(
        (status = 200, description = "The plan with its estimated completion date"),
        (status = 404, description = "No such document, or it has no study plan")
    )
)]
pub async fn study_plan_handler(
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, HandlerError> {
    let today = chrono::Local::now().date_naive();
    read_view(&app_state, |store| {
        let plan = store
            .document(DocumentId::from(id))
            .and_then(|doc| doc.study_plan.as_ref())?;
        Some(serde_json::to_value(StudyPlanView {
            plan,
            estimated_completion: study_plan::estimated_completion(plan, today),
            today: study_plan::schedule_for_date(plan, today, today),
        }))
    })
    .await?
    .ok_or_else(|| not_found("Study plan for document", id))
}

//=========================================================================================
// Task Handlers
//=========================================================================================

/// Flip a task's completion flag.
#[utoipa::path(
    post,
    path = "/documents/{id}/tasks/{task_id}/toggle",
    params(
        ("id" = Uuid, Path, description = "Document id"),
        ("task_id" = String, Path, description = "Task id within the document")
    ),
    responses((status = 200, description = "Whether a task was toggled", body = MutationResponse))
)]
pub async fn toggle_task_handler(
    State(app_state): State<Arc<AppState>>,
    Path((id, task_id)): Path<(Uuid, String)>,
) -> Json<MutationResponse> {
    let applied = app_state
        .organizer
        .toggle_task_completion(DocumentId::from(id), &TaskId::from(task_id))
        .await;
    Json(MutationResponse { applied })
}

/// Overwrite a task's priority.
#[utoipa::path(
    put,
    path = "/documents/{id}/tasks/{task_id}/priority",
    params(
        ("id" = Uuid, Path, description = "Document id"),
        ("task_id" = String, Path, description = "Task id within the document")
    ),
    request_body = SetPriorityRequest,
    responses(
        (status = 200, description = "Whether a task was updated", body = MutationResponse),
        (status = 400, description = "Unknown priority value")
    )
)]
pub async fn set_priority_handler(
    State(app_state): State<Arc<AppState>>,
    Path((id, task_id)): Path<(Uuid, String)>,
    Json(request): Json<SetPriorityRequest>,
) -> Result<Json<MutationResponse>, HandlerError> {
    let priority = request
        .priority
        .parse::<Priority>()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    let applied = app_state
        .organizer
        .set_task_priority(DocumentId::from(id), &TaskId::from(task_id), priority)
        .await;
    Ok(Json(MutationResponse { applied }))
}

/// Advance a task's priority: High, Medium, Low, then High again.
#[utoipa::path(
    post,
    path = "/documents/{id}/tasks/{task_id}/priority/cycle",
    params(
        ("id" = Uuid, Path, description = "Document id"),
        ("task_id" = String, Path, description = "Task id within the document")
    ),
    responses((status = 200, description = "The new priority, if a task matched", body = CyclePriorityResponse))
)]
pub async fn cycle_priority_handler(
    State(app_state): State<Arc<AppState>>,
    Path((id, task_id)): Path<(Uuid, String)>,
) -> Json<CyclePriorityResponse> {
    let priority = app_state
        .organizer
        .cycle_task_priority(DocumentId::from(id), &TaskId::from(task_id))
        .await;
    Json(CyclePriorityResponse {
        applied: priority.is_some(),
        priority: priority.map(|p| p.to_string()),
    })
}

/// Set or clear a task's due date.
#[utoipa::path(
    put,
    path = "/documents/{id}/tasks/{task_id}/due-date",
    params(
        ("id" = Uuid, Path, description = "Document id"),
        ("task_id" = String, Path, description = "Task id within the document")
    ),
    request_body = SetDueDateRequest,
    responses((status = 200, description = "Whether a task was updated", body = MutationResponse))
)]
pub async fn set_due_date_handler(
    State(app_state): State<Arc<AppState>>,
    Path((id, task_id)): Path<(Uuid, String)>,
    Json(request): Json<SetDueDateRequest>,
) -> Json<MutationResponse> {
    let applied = app_state
        .organizer
        .set_task_due_date(DocumentId::from(id), &TaskId::from(task_id), request.due_date)
        .await;
    Json(MutationResponse { applied })
}

//=========================================================================================
// Selection and History Handlers
//=========================================================================================

/// The currently selected document.
#[utoipa::path(
    get,
    path = "/selection",
    responses((status = 200, description = "The selection", body = SelectionPayload))
)]
pub async fn get_selection_handler(State(app_state): State<Arc<AppState>>) -> Json<SelectionPayload> {
    let document_id = app_state.organizer.selected().await.map(|id| id.as_uuid());
    Json(SelectionPayload { document_id })
}

/// Select a document, or clear the selection with a null id.
#[utoipa::path(
    put,
    path = "/selection",
    request_body = SelectionPayload,
    responses((status = 200, description = "Whether the selection changed", body = MutationResponse))
)]
pub async fn set_selection_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<SelectionPayload>,
) -> Json<MutationResponse> {
    let applied = match request.document_id {
        Some(id) => app_state.organizer.select(DocumentId::from(id)).await,
        None => {
            app_state.organizer.clear_selection().await;
            true
        }
    };
    Json(MutationResponse { applied })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HistoryEntry<'a> {
    #[serde(flatten)]
    document: &'a Document,
    progress: DocumentProgress,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HistoryView<'a> {
    fully_completed: usize,
    documents: Vec<HistoryEntry<'a>>,
}

/// The archive: documents by creation time, newest first, with progress.
#[utoipa::path(
    get,
    path = "/history",
    responses((status = 200, description = "Archived documents with progress"))
)]
pub async fn history_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, HandlerError> {
    app_state
        .organizer
        .read(|store| {
            let documents = store.documents();
            serde_json::to_value(HistoryView {
                fully_completed: history::fully_completed_count(documents),
                documents: history::history(documents)
                    .into_iter()
                    .map(|document| HistoryEntry {
                        document,
                        progress: DocumentProgress::of(document),
                    })
                    .collect(),
            })
        })
        .await
        .map(Json)
        .map_err(serialization_failed)
}
