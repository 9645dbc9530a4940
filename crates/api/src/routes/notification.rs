//! Route definitions for the `/notifications` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::notification;
use crate::state::AppState;

/// Routes mounted at `/notifications`.
///
/// ```text
/// GET    /                               -> list_notifications
/// POST   /                               -> create_notification
/// POST   /batch                          -> create_notification_batch
/// POST   /read-all                       -> mark_all_read
/// GET    /unread-count                   -> unread_count
/// GET    /{id}                           -> get_notification
/// DELETE /{id}                           -> delete_notification
/// POST   /{id}/read                      -> mark_read
///
/// GET    /preferences                    -> get_preferences
/// PUT    /preferences/{type}             -> update_preference
/// GET    /preferences/{type}/enabled     -> preference_enabled
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(notification::list_notifications).post(notification::create_notification),
        )
        .route("/batch", post(notification::create_notification_batch))
        .route("/read-all", post(notification::mark_all_read))
        .route("/unread-count", get(notification::unread_count))
        .route(
            "/{id}",
            get(notification::get_notification).delete(notification::delete_notification),
        )
        .route("/{id}/read", post(notification::mark_read))
        .route("/preferences", get(notification::get_preferences))
        .route(
            "/preferences/{notification_type}",
            put(notification::update_preference),
        )
        .route(
            "/preferences/{notification_type}/enabled",
            get(notification::preference_enabled),
        )
}
