//! PostgreSQL implementation of [`NotificationStore`].

use async_trait::async_trait;
use backoffice_core::notification::NotificationColumn;
use backoffice_core::predicate::PredicateSet;
use backoffice_core::preference::PreferenceColumn;
use backoffice_core::query::{OrderBy, Page};
use backoffice_core::types::UserId;
use backoffice_db::models::notification::{
    CreateNotification, Notification, NotificationList, NotificationPayload,
    NotificationPreference, UpdatePreference,
};
use backoffice_db::repositories::{NotificationPreferenceRepo, NotificationRepo};
use backoffice_db::DbPool;

use crate::store::{NotificationStore, StoreResult};

/// Store backed by the `notifications` and `notification_preferences` tables.
#[derive(Clone)]
pub struct PgNotificationStore {
    pool: DbPool,
}

impl PgNotificationStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationStore for PgNotificationStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(backoffice_db::health_check(&self.pool).await?)
    }

    async fn insert_notification(&self, input: &CreateNotification) -> StoreResult<Notification> {
        Ok(NotificationRepo::create(&self.pool, input).await?)
    }

    async fn insert_notifications(
        &self,
        user_ids: &[UserId],
        payload: &NotificationPayload,
    ) -> StoreResult<Vec<Notification>> {
        Ok(NotificationRepo::create_for_users(&self.pool, user_ids, payload).await?)
    }

    async fn find_notification(
        &self,
        filters: &PredicateSet<NotificationColumn>,
    ) -> StoreResult<Option<Notification>> {
        Ok(NotificationRepo::find(&self.pool, filters).await?)
    }

    async fn list_notifications(
        &self,
        filters: &PredicateSet<NotificationColumn>,
        unread: &PredicateSet<NotificationColumn>,
        order: &[OrderBy<NotificationColumn>],
        page: Page,
    ) -> StoreResult<NotificationList> {
        Ok(NotificationRepo::list_with_counts(&self.pool, filters, unread, order, page).await?)
    }

    async fn count_notifications(
        &self,
        filters: &PredicateSet<NotificationColumn>,
    ) -> StoreResult<i64> {
        Ok(NotificationRepo::count(&self.pool, filters).await?)
    }

    async fn mark_read(
        &self,
        filters: &PredicateSet<NotificationColumn>,
    ) -> StoreResult<Option<Notification>> {
        Ok(NotificationRepo::mark_read(&self.pool, filters).await?)
    }

    async fn mark_all_read(
        &self,
        filters: &PredicateSet<NotificationColumn>,
    ) -> StoreResult<u64> {
        Ok(NotificationRepo::mark_all_read(&self.pool, filters).await?)
    }

    async fn soft_delete(&self, filters: &PredicateSet<NotificationColumn>) -> StoreResult<bool> {
        Ok(NotificationRepo::soft_delete(&self.pool, filters).await?)
    }

    async fn list_preferences(
        &self,
        filters: &PredicateSet<PreferenceColumn>,
    ) -> StoreResult<Vec<NotificationPreference>> {
        Ok(NotificationPreferenceRepo::list(&self.pool, filters).await?)
    }

    async fn find_preference(
        &self,
        filters: &PredicateSet<PreferenceColumn>,
    ) -> StoreResult<Option<NotificationPreference>> {
        Ok(NotificationPreferenceRepo::find(&self.pool, filters).await?)
    }

    async fn upsert_preference(
        &self,
        user_id: &str,
        notification_type: &str,
        input: &UpdatePreference,
    ) -> StoreResult<NotificationPreference> {
        Ok(NotificationPreferenceRepo::upsert(&self.pool, user_id, notification_type, input).await?)
    }
}
