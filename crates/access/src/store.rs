//! The storage seam between the access layer and the backing store.
//!
//! Implementations execute exactly the predicate sets they are given; they
//! never add or drop scoping on their own.

use async_trait::async_trait;
use backoffice_core::error::CoreError;
use backoffice_core::notification::NotificationColumn;
use backoffice_core::predicate::PredicateSet;
use backoffice_core::preference::PreferenceColumn;
use backoffice_core::query::{OrderBy, Page};
use backoffice_core::types::UserId;
use backoffice_db::models::notification::{
    CreateNotification, Notification, NotificationList, NotificationPayload,
    NotificationPreference, UpdatePreference,
};

/// Failures raised by a [`NotificationStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// PostgreSQL `unique_violation` SQLSTATE.
const UNIQUE_VIOLATION: &str = "23505";

/// Map store failures onto the domain taxonomy.
///
/// - Unique violations on `uq_` constraints become [`CoreError::Conflict`].
/// - Everything else becomes [`CoreError::Internal`] and is logged here, since
///   the sanitized message that reaches the client drops the detail.
impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match &err {
            StoreError::UniqueViolation { constraint } => {
                return CoreError::Conflict(format!(
                    "Duplicate value violates unique constraint: {constraint}"
                ));
            }
            StoreError::Database(sqlx::Error::Database(db_err))
                if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) =>
            {
                let constraint = db_err.constraint().unwrap_or("unknown");
                if constraint.starts_with("uq_") {
                    return CoreError::Conflict(format!(
                        "Duplicate value violates unique constraint: {constraint}"
                    ));
                }
            }
            _ => {}
        }
        tracing::error!(error = %err, "Store error");
        CoreError::Internal(err.to_string())
    }
}

/// Backing store for notifications and notification preferences.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Confirm the store is reachable.
    async fn ping(&self) -> StoreResult<()>;

    async fn insert_notification(&self, input: &CreateNotification) -> StoreResult<Notification>;

    /// Insert one row per user, all or nothing.
    async fn insert_notifications(
        &self,
        user_ids: &[UserId],
        payload: &NotificationPayload,
    ) -> StoreResult<Vec<Notification>>;

    async fn find_notification(
        &self,
        filters: &PredicateSet<NotificationColumn>,
    ) -> StoreResult<Option<Notification>>;

    /// One page of `filters` with the unpaginated size of `filters` and the
    /// size of `unread`, all read from one consistent snapshot.
    async fn list_notifications(
        &self,
        filters: &PredicateSet<NotificationColumn>,
        unread: &PredicateSet<NotificationColumn>,
        order: &[OrderBy<NotificationColumn>],
        page: Page,
    ) -> StoreResult<NotificationList>;

    async fn count_notifications(
        &self,
        filters: &PredicateSet<NotificationColumn>,
    ) -> StoreResult<i64>;

    /// Set `read_at` if unset on the matching row; `None` when nothing matched.
    async fn mark_read(
        &self,
        filters: &PredicateSet<NotificationColumn>,
    ) -> StoreResult<Option<Notification>>;

    /// Set `read_at` on every matching row, returning how many were updated.
    async fn mark_all_read(&self, filters: &PredicateSet<NotificationColumn>)
        -> StoreResult<u64>;

    /// Set `deleted_at` if unset; `true` when a matching row exists.
    async fn soft_delete(&self, filters: &PredicateSet<NotificationColumn>) -> StoreResult<bool>;

    async fn list_preferences(
        &self,
        filters: &PredicateSet<PreferenceColumn>,
    ) -> StoreResult<Vec<NotificationPreference>>;

    async fn find_preference(
        &self,
        filters: &PredicateSet<PreferenceColumn>,
    ) -> StoreResult<Option<NotificationPreference>>;

    /// Insert or partially update the `(user_id, notification_type)` row.
    async fn upsert_preference(
        &self,
        user_id: &str,
        notification_type: &str,
        input: &UpdatePreference,
    ) -> StoreResult<NotificationPreference>;
}
