//! Access-layer operations over notifications.
//!
//! Each operation takes the caller's identity explicitly and starts by
//! demanding it, so an unauthenticated call never reaches the store.
//! Reads and writes go through predicate sets from
//! [`backoffice_core::notification`], which always carry the owner and
//! not-deleted predicates.

use std::sync::Arc;

use backoffice_core::error::CoreError;
use backoffice_core::guard::{assert_ownership, ensure_row_owner};
use backoffice_core::notification::{
    self, build_filters, by_id, by_id_any_state, default_order, unread_filters,
    validate_type_key, NotificationColumn, NotificationFilters,
};
use backoffice_core::predicate::PredicateSet;
use backoffice_core::principal::{require, Principal};
use backoffice_core::types::DbId;
use backoffice_db::models::notification::{
    CreateNotification, CreateNotificationBatch, Notification, NotificationList,
};
use validator::Validate;

use crate::store::NotificationStore;

/// Authorization-enforcing entry point for notification and preference data.
#[derive(Clone)]
pub struct NotificationService {
    pub(crate) store: Arc<dyn NotificationStore>,
}

impl NotificationService {
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        Self { store }
    }

    /// Whether the backing store answers. Not authenticated.
    pub async fn health_check(&self) -> bool {
        match self.store.ping().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Notification store health check failed");
                false
            }
        }
    }

    /// List `user_id`'s active notifications matching `filters`, newest first.
    pub async fn get_user_notifications(
        &self,
        identity: Option<&Principal>,
        user_id: &str,
        filters: &NotificationFilters,
    ) -> Result<NotificationList, CoreError> {
        let principal = require(identity)?;
        assert_ownership(principal, user_id)?;

        let page = filters.page();
        page.validate()?;
        if let Some(key) = &filters.notification_type {
            validate_type_key(key).map_err(|e| CoreError::Validation(e.to_string()))?;
        }

        let set = build_filters(filters, principal.user_id());
        let list = self
            .store
            .list_notifications(
                &set,
                &unread_filters(principal.user_id()),
                &default_order(),
                page,
            )
            .await?;

        tracing::debug!(
            user_id = principal.user_id(),
            returned = list.notifications.len(),
            total = list.total,
            unread_count = list.unread_count,
            "Listed notifications"
        );
        Ok(list)
    }

    /// Fetch one active notification owned by `user_id`.
    pub async fn get_notification(
        &self,
        identity: Option<&Principal>,
        id: DbId,
        user_id: &str,
    ) -> Result<Notification, CoreError> {
        let principal = require(identity)?;
        assert_ownership(principal, user_id)?;

        let filters = by_id(principal.user_id(), id);
        self.find_owned(principal, &filters, id).await
    }

    /// Create a notification for `input.user_id`.
    ///
    /// Any authenticated caller may notify any user; no ownership check.
    pub async fn create_notification(
        &self,
        identity: Option<&Principal>,
        input: &CreateNotification,
    ) -> Result<Notification, CoreError> {
        let principal = require(identity)?;
        input.validate()?;

        let created = self.store.insert_notification(input).await?;
        tracing::info!(
            id = created.id,
            sender = principal.user_id(),
            recipient = %created.user_id,
            notification_type = %created.notification_type,
            "Notification created"
        );
        Ok(created)
    }

    /// Create the same notification for every user in `input.user_ids`.
    ///
    /// All rows are created or none are.
    pub async fn create_notifications_for_users(
        &self,
        identity: Option<&Principal>,
        input: &CreateNotificationBatch,
    ) -> Result<Vec<Notification>, CoreError> {
        let principal = require(identity)?;
        input.validate()?;

        let created = self
            .store
            .insert_notifications(&input.user_ids, &input.payload)
            .await?;
        tracing::info!(
            sender = principal.user_id(),
            recipients = created.len(),
            notification_type = %input.payload.notification_type,
            "Notification batch created"
        );
        Ok(created)
    }

    /// Mark one notification read. Already-read rows keep their `read_at`.
    pub async fn mark_as_read(
        &self,
        identity: Option<&Principal>,
        id: DbId,
        user_id: &str,
    ) -> Result<Notification, CoreError> {
        let principal = require(identity)?;
        assert_ownership(principal, user_id)?;

        let filters = by_id(principal.user_id(), id);
        self.find_owned(principal, &filters, id).await?;
        let row = self
            .store
            .mark_read(&filters)
            .await?
            .ok_or(CoreError::NotFound {
                entity: notification::ENTITY,
                id,
            })?;
        tracing::debug!(id, user_id = principal.user_id(), "Notification marked read");
        Ok(row)
    }

    /// Mark every unread active notification of `user_id` read.
    ///
    /// Returns how many rows changed; zero when there was nothing unread.
    pub async fn mark_all_as_read(
        &self,
        identity: Option<&Principal>,
        user_id: &str,
    ) -> Result<u64, CoreError> {
        let principal = require(identity)?;
        assert_ownership(principal, user_id)?;

        let affected = self
            .store
            .mark_all_read(&unread_filters(principal.user_id()))
            .await?;
        tracing::info!(user_id = principal.user_id(), affected, "Marked all notifications read");
        Ok(affected)
    }

    /// Count `user_id`'s unread active notifications.
    ///
    /// Uses the same predicate builder as the unread branch of
    /// [`Self::get_user_notifications`], so the two always agree.
    pub async fn get_unread_count(
        &self,
        identity: Option<&Principal>,
        user_id: &str,
    ) -> Result<i64, CoreError> {
        let principal = require(identity)?;
        assert_ownership(principal, user_id)?;

        Ok(self
            .store
            .count_notifications(&unread_filters(principal.user_id()))
            .await?)
    }

    /// Soft-delete one notification. Deleting an already deleted row is a
    /// no-op; a row that never existed for this owner is `NotFound`.
    pub async fn delete_notification(
        &self,
        identity: Option<&Principal>,
        id: DbId,
        user_id: &str,
    ) -> Result<(), CoreError> {
        let principal = require(identity)?;
        assert_ownership(principal, user_id)?;

        let filters = by_id_any_state(principal.user_id(), id);
        self.find_owned(principal, &filters, id).await?;
        let found = self.store.soft_delete(&filters).await?;
        if !found {
            return Err(CoreError::NotFound {
                entity: notification::ENTITY,
                id,
            });
        }
        tracing::info!(id, user_id = principal.user_id(), "Notification deleted");
        Ok(())
    }

    /// Fetch the row matching `filters` and confirm it belongs to the caller
    /// before anything is returned or written.
    async fn find_owned(
        &self,
        principal: &Principal,
        filters: &PredicateSet<NotificationColumn>,
        id: DbId,
    ) -> Result<Notification, CoreError> {
        let row = self
            .store
            .find_notification(filters)
            .await?
            .ok_or(CoreError::NotFound {
                entity: notification::ENTITY,
                id,
            })?;
        ensure_row_owner(principal, &row.user_id, notification::ENTITY, id)?;
        Ok(row)
    }
}
