//! services/api/src/web/protocol.rs
//!
//! Request and response payloads of the REST API that are not core types.
//! Core types (documents, tasks, agenda entries) are serialized as they are.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Sent once a scan has been accepted and its placeholder created.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub document_id: Uuid,
    pub status: String,
}

/// Result of a mutation; `applied` is false when the ids matched nothing.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MutationResponse {
    pub applied: bool,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CyclePriorityResponse {
    pub applied: bool,
    #[schema(value_type = Option<String>, example = "Medium")]
    pub priority: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub removed: bool,
    pub selection_cleared: bool,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetPriorityRequest {
    /// One of `High`, `Medium`, `Low`.
    #[schema(example = "High")]
    pub priority: String,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetDueDateRequest {
    /// `YYYY-MM-DD`, or null to remove the due date.
    pub due_date: Option<NaiveDate>,
}

#[derive(Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectionPayload {
    /// The selected document, or null for no selection.
    pub document_id: Option<Uuid>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionResponse {
    pub active: bool,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub checkout_url: String,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettingsRequest {
    pub enabled: bool,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettingsResponse {
    pub enabled: bool,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DueTodayResponse {
    pub date: NaiveDate,
    pub due_today: usize,
    pub notifications_enabled: bool,
}
