pub mod health;
pub mod notification;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /notifications                                   list, create
/// /notifications/batch                             create for many users
/// /notifications/read-all                          mark all read
/// /notifications/unread-count                      unread count
/// /notifications/{id}                              get, soft delete
/// /notifications/{id}/read                         mark read
/// /notifications/preferences                       list preferences
/// /notifications/preferences/{type}                upsert preference
/// /notifications/preferences/{type}/enabled        effective enabled flag
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/notifications", notification::router())
}
