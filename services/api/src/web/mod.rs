pub mod account;
pub mod calendar;
pub mod protocol;
pub mod rest;
pub mod state;

use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

pub use rest::ApiDoc;
pub use state::AppState;

/// Every ScanDo route, without middleware.
pub fn router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/documents",
            get(rest::list_documents_handler)
                .post(rest::submit_document_handler)
                .delete(rest::clear_documents_handler),
        )
        .route(
            "/documents/{id}",
            get(rest::get_document_handler).delete(rest::delete_document_handler),
        )
        .route("/documents/{id}/file", get(rest::source_file_handler))
        .route("/documents/{id}/progress", get(rest::document_progress_handler))
        .route("/documents/{id}/categories", get(rest::document_categories_handler))
        .route("/documents/{id}/study-plan", get(rest::study_plan_handler))
        .route(
            "/documents/{id}/tasks/{task_id}/toggle",
            post(rest::toggle_task_handler),
        )
        .route(
            "/documents/{id}/tasks/{task_id}/priority",
            put(rest::set_priority_handler),
        )
        .route(
            "/documents/{id}/tasks/{task_id}/priority/cycle",
            post(rest::cycle_priority_handler),
        )
        .route(
            "/documents/{id}/tasks/{task_id}/due-date",
            put(rest::set_due_date_handler),
        )
        .route(
            "/selection",
            get(rest::get_selection_handler).put(rest::set_selection_handler),
        )
        .route("/history", get(rest::history_handler))
        .route("/calendar/today", get(calendar::today_handler))
        .route("/calendar/{date}", get(calendar::date_handler))
        .route("/calendar/{year}/{month}", get(calendar::month_handler))
        .route("/subscription", get(account::subscription_handler))
        .route("/subscription/checkout", post(account::checkout_handler))
        .route("/subscription/return", get(account::checkout_return_handler))
        .route("/subscription/activate", post(account::activate_subscription_handler))
        .route("/settings/notifications", put(account::notification_settings_handler))
        .route("/notifications/due-today", post(account::due_today_handler))
        .with_state(app_state)
}
