//! Handlers for the `/notifications` resource.
//!
//! Handlers pass the resolved [`Caller`] straight to the access layer, which
//! owns every authentication and ownership decision. Collection endpoints
//! accept an optional `user_id` query parameter naming the target user; it
//! defaults to the caller. Unparseable paths, query strings and bodies are
//! answered with the JSON `BAD_REQUEST` error body.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use backoffice_access::NotificationList;
use backoffice_core::notification::NotificationFilters;
use backoffice_core::types::{DbId, Timestamp, UserId};
use backoffice_db::models::notification::{
    CreateNotification, CreateNotificationBatch, Notification, NotificationPreference,
    UpdatePreference,
};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::middleware::auth::Caller;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query / response types
// ---------------------------------------------------------------------------

/// Maximum page size for notification listing.
const MAX_LIMIT: i64 = 100;

/// Query parameters for `GET /notifications`.
#[derive(Debug, Default, Deserialize)]
pub struct NotificationQuery {
    pub user_id: Option<UserId>,
    /// `true` for read only, `false` for unread only.
    pub read: Option<bool>,
    #[serde(rename = "type")]
    pub notification_type: Option<String>,
    pub related_entity_type: Option<String>,
    pub created_after: Option<Timestamp>,
    pub created_before: Option<Timestamp>,
    /// Page size, capped at 100. Omitted returns the whole set.
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl NotificationQuery {
    fn filters(self) -> NotificationFilters {
        NotificationFilters {
            read: self.read,
            notification_type: self.notification_type,
            related_entity_type: self.related_entity_type,
            created_after: self.created_after,
            created_before: self.created_before,
            limit: self.limit.map(|l| l.min(MAX_LIMIT)),
            offset: self.offset,
        }
    }
}

/// Optional target user for per-user endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct TargetQuery {
    pub user_id: Option<UserId>,
}

#[derive(Debug, Serialize)]
pub struct MarkedRead {
    pub marked_read: u64,
}

#[derive(Debug, Serialize)]
pub struct UnreadCount {
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct PreferenceEnabled {
    pub notification_type: String,
    pub enabled: bool,
}

/// The requested target user, or the caller when none was named.
///
/// An anonymous caller with no named target gets an empty target; the access
/// layer rejects the call as unauthenticated before the target matters.
fn target_user(caller: &Caller, requested: Option<UserId>) -> UserId {
    requested
        .or_else(|| caller.user_id().map(str::to_owned))
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

/// GET /api/v1/notifications
pub async fn list_notifications(
    caller: Caller,
    State(state): State<AppState>,
    params: Result<Query<NotificationQuery>, QueryRejection>,
) -> AppResult<Json<DataResponse<NotificationList>>> {
    let Query(params) = params?;
    let user_id = target_user(&caller, params.user_id.clone());
    let list = state
        .notifications
        .get_user_notifications(caller.principal(), &user_id, &params.filters())
        .await?;
    Ok(Json(DataResponse { data: list }))
}

/// POST /api/v1/notifications
///
/// Create a notification for the `user_id` in the body. Returns 201.
pub async fn create_notification(
    caller: Caller,
    State(state): State<AppState>,
    input: Result<Json<CreateNotification>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = input?;
    let created = state
        .notifications
        .create_notification(caller.principal(), &input)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

/// POST /api/v1/notifications/batch
///
/// Create the same notification for every listed user, all or nothing.
pub async fn create_notification_batch(
    caller: Caller,
    State(state): State<AppState>,
    input: Result<Json<CreateNotificationBatch>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(input) = input?;
    let created = state
        .notifications
        .create_notifications_for_users(caller.principal(), &input)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

/// POST /api/v1/notifications/read-all
pub async fn mark_all_read(
    caller: Caller,
    State(state): State<AppState>,
    target: Result<Query<TargetQuery>, QueryRejection>,
) -> AppResult<Json<DataResponse<MarkedRead>>> {
    let Query(target) = target?;
    let user_id = target_user(&caller, target.user_id);
    let marked_read = state
        .notifications
        .mark_all_as_read(caller.principal(), &user_id)
        .await?;
    Ok(Json(DataResponse {
        data: MarkedRead { marked_read },
    }))
}

/// GET /api/v1/notifications/unread-count
pub async fn unread_count(
    caller: Caller,
    State(state): State<AppState>,
    target: Result<Query<TargetQuery>, QueryRejection>,
) -> AppResult<Json<DataResponse<UnreadCount>>> {
    let Query(target) = target?;
    let user_id = target_user(&caller, target.user_id);
    let count = state
        .notifications
        .get_unread_count(caller.principal(), &user_id)
        .await?;
    Ok(Json(DataResponse {
        data: UnreadCount { count },
    }))
}

/// GET /api/v1/notifications/{id}
pub async fn get_notification(
    caller: Caller,
    State(state): State<AppState>,
    id: Result<Path<DbId>, PathRejection>,
    target: Result<Query<TargetQuery>, QueryRejection>,
) -> AppResult<Json<DataResponse<Notification>>> {
    let Path(id) = id?;
    let Query(target) = target?;
    let user_id = target_user(&caller, target.user_id);
    let notification = state
        .notifications
        .get_notification(caller.principal(), id, &user_id)
        .await?;
    Ok(Json(DataResponse { data: notification }))
}

/// POST /api/v1/notifications/{id}/read
///
/// Returns the notification; repeating the call keeps the first `read_at`.
pub async fn mark_read(
    caller: Caller,
    State(state): State<AppState>,
    id: Result<Path<DbId>, PathRejection>,
    target: Result<Query<TargetQuery>, QueryRejection>,
) -> AppResult<Json<DataResponse<Notification>>> {
    let Path(id) = id?;
    let Query(target) = target?;
    let user_id = target_user(&caller, target.user_id);
    let notification = state
        .notifications
        .mark_as_read(caller.principal(), id, &user_id)
        .await?;
    Ok(Json(DataResponse { data: notification }))
}

/// DELETE /api/v1/notifications/{id}
///
/// Soft delete. Returns 204, also when the row was already deleted.
pub async fn delete_notification(
    caller: Caller,
    State(state): State<AppState>,
    id: Result<Path<DbId>, PathRejection>,
    target: Result<Query<TargetQuery>, QueryRejection>,
) -> AppResult<StatusCode> {
    let Path(id) = id?;
    let Query(target) = target?;
    let user_id = target_user(&caller, target.user_id);
    state
        .notifications
        .delete_notification(caller.principal(), id, &user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Preferences
// ---------------------------------------------------------------------------

/// GET /api/v1/notifications/preferences
pub async fn get_preferences(
    caller: Caller,
    State(state): State<AppState>,
    target: Result<Query<TargetQuery>, QueryRejection>,
) -> AppResult<Json<DataResponse<Vec<NotificationPreference>>>> {
    let Query(target) = target?;
    let user_id = target_user(&caller, target.user_id);
    let prefs = state
        .notifications
        .get_notification_preferences(caller.principal(), &user_id)
        .await?;
    Ok(Json(DataResponse { data: prefs }))
}

/// PUT /api/v1/notifications/preferences/{notification_type}
///
/// Create or partially update the preference; omitted fields are kept.
pub async fn update_preference(
    caller: Caller,
    State(state): State<AppState>,
    notification_type: Result<Path<String>, PathRejection>,
    target: Result<Query<TargetQuery>, QueryRejection>,
    input: Result<Json<UpdatePreference>, JsonRejection>,
) -> AppResult<Json<DataResponse<NotificationPreference>>> {
    let Path(notification_type) = notification_type?;
    let Query(target) = target?;
    let Json(input) = input?;
    let user_id = target_user(&caller, target.user_id);
    let pref = state
        .notifications
        .update_notification_preference(caller.principal(), &user_id, &notification_type, &input)
        .await?;
    Ok(Json(DataResponse { data: pref }))
}

/// GET /api/v1/notifications/preferences/{notification_type}/enabled
pub async fn preference_enabled(
    caller: Caller,
    State(state): State<AppState>,
    notification_type: Result<Path<String>, PathRejection>,
    target: Result<Query<TargetQuery>, QueryRejection>,
) -> AppResult<Json<DataResponse<PreferenceEnabled>>> {
    let Path(notification_type) = notification_type?;
    let Query(target) = target?;
    let user_id = target_user(&caller, target.user_id);
    let enabled = state
        .notifications
        .is_notification_enabled(caller.principal(), &user_id, &notification_type)
        .await?;
    Ok(Json(DataResponse {
        data: PreferenceEnabled {
            notification_type,
            enabled,
        },
    }))
}
