//! services/api/src/web/account.rs
//!
//! Subscription and notification endpoints.

use crate::web::{
    protocol::{
        CheckoutResponse, DueTodayResponse, NotificationSettingsRequest,
        NotificationSettingsResponse, SubscriptionResponse,
    },
    state::AppState,
};
use axum::{
    extract::{RawQuery, State},
    http::StatusCode,
    response::Json,
};
use scando_core::PortError;
use std::sync::Arc;
use tracing::{error, info};

fn notification_failed(e: PortError) -> (StatusCode, String) {
    error!("Failed to send notification: {:?}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Failed to send notification".to_string(),
    )
}

/// Whether the Pro subscription is active.
#[utoipa::path(
    get,
    path = "/subscription",
    responses((status = 200, description = "Subscription status", body = SubscriptionResponse))
)]
pub async fn subscription_handler(State(app_state): State<Arc<AppState>>) -> Json<SubscriptionResponse> {
    Json(SubscriptionResponse {
        active: app_state.organizer.is_subscribed().await,
    })
}

/// Where to send the user to pay for a subscription.
#[utoipa::path(
    post,
    path = "/subscription/checkout",
    responses((status = 200, description = "Hosted checkout link", body = CheckoutResponse))
)]
pub async fn checkout_handler(State(app_state): State<Arc<AppState>>) -> Json<CheckoutResponse> {
    Json(CheckoutResponse {
        checkout_url: app_state.config.checkout_url.clone(),
    })
}

/// The checkout provider redirects here. `success=true` or `payment=success`
/// in the query activates the subscription.
#[utoipa::path(
    get,
    path = "/subscription/return",
    responses((status = 200, description = "Subscription status after the return", body = SubscriptionResponse))
)]
pub async fn checkout_return_handler(
    State(app_state): State<Arc<AppState>>,
    RawQuery(query): RawQuery,
) -> Json<SubscriptionResponse> {
    let query = query.unwrap_or_default();
    if app_state.organizer.handle_checkout_return(&query).await {
        info!("Subscription activated from checkout return.");
    }
    Json(SubscriptionResponse {
        active: app_state.organizer.is_subscribed().await,
    })
}

/// Activate the subscription directly.
#[utoipa::path(
    post,
    path = "/subscription/activate",
    responses((status = 200, description = "Subscription status", body = SubscriptionResponse))
)]
pub async fn activate_subscription_handler(
    State(app_state): State<Arc<AppState>>,
) -> Json<SubscriptionResponse> {
    app_state.organizer.activate_subscription().await;
    Json(SubscriptionResponse { active: true })
}

/// Turn due-today reminders on or off.
#[utoipa::path(
    put,
    path = "/settings/notifications",
    request_body = NotificationSettingsRequest,
    responses((status = 200, description = "The stored setting", body = NotificationSettingsResponse))
)]
pub async fn notification_settings_handler(
    State(app_state): State<Arc<AppState>>,
    Json(request): Json<NotificationSettingsRequest>,
) -> Result<Json<NotificationSettingsResponse>, (StatusCode, String)> {
    app_state
        .organizer
        .set_notifications_enabled(request.enabled)
        .await
        .map_err(notification_failed)?;
    Ok(Json(NotificationSettingsResponse {
        enabled: app_state.organizer.notifications_enabled().await,
    }))
}

/// Count today's tasks and send a reminder if notifications are on.
#[utoipa::path(
    post,
    path = "/notifications/due-today",
    responses((status = 200, description = "How many tasks are due today", body = DueTodayResponse))
)]
pub async fn due_today_handler(
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<DueTodayResponse>, (StatusCode, String)> {
    let today = chrono::Local::now().date_naive();
    let due_today = app_state
        .organizer
        .notify_due_today(today)
        .await
        .map_err(notification_failed)?;
    Ok(Json(DueTodayResponse {
        date: today,
        due_today,
        notifications_enabled: app_state.organizer.notifications_enabled().await,
    }))
}
