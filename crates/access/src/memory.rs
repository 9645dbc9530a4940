//! In-process [`NotificationStore`].
//!
//! Rows are filtered with [`PredicateSet::matches`], the same predicate sets
//! the PostgreSQL store renders to SQL. Used by tests and local tooling; the
//! `fail_*` switches inject storage failures.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use backoffice_core::notification::NotificationColumn;
use backoffice_core::predicate::PredicateSet;
use backoffice_core::preference::{
    PreferenceColumn, DEFAULT_EMAIL_ENABLED, DEFAULT_ENABLED, DEFAULT_PUSH_ENABLED,
    UNIQUE_USER_TYPE_CONSTRAINT,
};
use backoffice_core::query::{compare_rows, OrderBy, Page};
use backoffice_core::types::{DbId, UserId};
use backoffice_db::models::notification::{
    CreateNotification, Notification, NotificationList, NotificationPayload,
    NotificationPreference, UpdatePreference,
};
use chrono::Utc;

use crate::store::{NotificationStore, StoreError, StoreResult};

#[derive(Default)]
struct State {
    notifications: Vec<Notification>,
    preferences: Vec<NotificationPreference>,
    last_notification_id: DbId,
    last_preference_id: DbId,
    /// Fail the next batch insert after staging this many rows.
    fail_batch_after: Option<usize>,
    /// Fail the next preference upsert with a unique violation.
    conflict_next_upsert: bool,
    unavailable: bool,
}

/// Thread-safe in-memory store. Clones share the same state.
#[derive(Clone, Default)]
pub struct MemoryNotificationStore {
    state: Arc<Mutex<State>>,
}

impl MemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next batch insert fail after `rows` rows have been staged.
    /// Nothing from that batch is committed.
    pub fn fail_batch_after(&self, rows: usize) {
        if let Ok(mut state) = self.state.lock() {
            state.fail_batch_after = Some(rows);
        }
    }

    /// Make the next preference upsert fail as if a concurrent writer had
    /// inserted the same `(user_id, notification_type)` row first.
    pub fn fail_next_upsert_with_conflict(&self) {
        if let Ok(mut state) = self.state.lock() {
            state.conflict_next_upsert = true;
        }
    }

    /// Make every operation fail until switched back.
    pub fn set_unavailable(&self, unavailable: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.unavailable = unavailable;
        }
    }

    /// Unscoped read of a notification by id, soft-deleted rows included.
    pub fn raw_notification(&self, id: DbId) -> Option<Notification> {
        let state = self.state.lock().ok()?;
        state.notifications.iter().find(|n| n.id == id).cloned()
    }

    /// Every stored notification, unscoped.
    pub fn raw_notifications(&self) -> Vec<Notification> {
        self.state
            .lock()
            .map(|state| state.notifications.clone())
            .unwrap_or_default()
    }

    /// Every stored preference, unscoped.
    pub fn raw_preferences(&self) -> Vec<NotificationPreference> {
        self.state
            .lock()
            .map(|state| state.preferences.clone())
            .unwrap_or_default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, State>> {
        let state = self
            .state
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store poisoned".into()))?;
        if state.unavailable {
            return Err(StoreError::Unavailable("memory store offline".into()));
        }
        Ok(state)
    }
}

impl State {
    fn build_notification(&mut self, user_id: &str, payload: &NotificationPayload) -> Notification {
        self.last_notification_id += 1;
        Notification {
            id: self.last_notification_id,
            user_id: user_id.to_string(),
            notification_type: payload.notification_type.clone(),
            title: payload.title.clone(),
            message: payload.message.clone(),
            related_entity_type: payload.related_entity_type.clone(),
            related_entity_id: payload.related_entity_id,
            read_at: None,
            action_url: payload.action_url.clone(),
            metadata: payload.metadata.clone(),
            created_at: Utc::now(),
            deleted_at: None,
        }
    }

    fn count(&self, filters: &PredicateSet<NotificationColumn>) -> i64 {
        self.notifications
            .iter()
            .filter(|n| filters.matches(*n))
            .count() as i64
    }

    fn matching<'a>(
        &'a mut self,
        filters: &'a PredicateSet<NotificationColumn>,
    ) -> impl Iterator<Item = &'a mut Notification> + 'a {
        self.notifications.iter_mut().filter(|n| filters.matches(&**n))
    }
}

#[async_trait]
impl NotificationStore for MemoryNotificationStore {
    async fn ping(&self) -> StoreResult<()> {
        self.lock().map(|_| ())
    }

    async fn insert_notification(&self, input: &CreateNotification) -> StoreResult<Notification> {
        let mut state = self.lock()?;
        let row = state.build_notification(&input.user_id, &input.payload);
        state.notifications.push(row.clone());
        Ok(row)
    }

    async fn insert_notifications(
        &self,
        user_ids: &[UserId],
        payload: &NotificationPayload,
    ) -> StoreResult<Vec<Notification>> {
        let mut state = self.lock()?;
        let fail_after = state.fail_batch_after.take();
        let first_id = state.last_notification_id;

        let mut staged = Vec::with_capacity(user_ids.len());
        for (i, user_id) in user_ids.iter().enumerate() {
            if fail_after == Some(i) {
                state.last_notification_id = first_id;
                return Err(StoreError::Unavailable(format!(
                    "injected failure after {i} of {} rows",
                    user_ids.len()
                )));
            }
            staged.push(state.build_notification(user_id, payload));
        }

        state.notifications.extend(staged.iter().cloned());
        Ok(staged)
    }

    async fn find_notification(
        &self,
        filters: &PredicateSet<NotificationColumn>,
    ) -> StoreResult<Option<Notification>> {
        let mut state = self.lock()?;
        let row = state.matching(filters).next().map(|n| n.clone());
        Ok(row)
    }

    async fn list_notifications(
        &self,
        filters: &PredicateSet<NotificationColumn>,
        unread: &PredicateSet<NotificationColumn>,
        order: &[OrderBy<NotificationColumn>],
        page: Page,
    ) -> StoreResult<NotificationList> {
        // One guard for all three reads.
        let state = self.lock()?;
        let mut rows: Vec<Notification> = state
            .notifications
            .iter()
            .filter(|n| filters.matches(*n))
            .cloned()
            .collect();
        rows.sort_by(|a, b| compare_rows(order, a, b));
        let total = rows.len() as i64;
        Ok(NotificationList {
            notifications: page.apply(rows),
            total,
            unread_count: state.count(unread),
        })
    }

    async fn count_notifications(
        &self,
        filters: &PredicateSet<NotificationColumn>,
    ) -> StoreResult<i64> {
        Ok(self.lock()?.count(filters))
    }

    async fn mark_read(
        &self,
        filters: &PredicateSet<NotificationColumn>,
    ) -> StoreResult<Option<Notification>> {
        let mut state = self.lock()?;
        let now = Utc::now();
        let row = state.matching(filters).next().map(|n| {
            n.read_at.get_or_insert(now);
            n.clone()
        });
        Ok(row)
    }

    async fn mark_all_read(
        &self,
        filters: &PredicateSet<NotificationColumn>,
    ) -> StoreResult<u64> {
        let mut state = self.lock()?;
        let now = Utc::now();
        let mut affected = 0;
        for n in state.matching(filters) {
            n.read_at = Some(now);
            affected += 1;
        }
        Ok(affected)
    }

    async fn soft_delete(&self, filters: &PredicateSet<NotificationColumn>) -> StoreResult<bool> {
        let mut state = self.lock()?;
        let now = Utc::now();
        let mut found = false;
        for n in state.matching(filters) {
            n.deleted_at.get_or_insert(now);
            found = true;
        }
        Ok(found)
    }

    async fn list_preferences(
        &self,
        filters: &PredicateSet<PreferenceColumn>,
    ) -> StoreResult<Vec<NotificationPreference>> {
        let state = self.lock()?;
        let mut rows: Vec<NotificationPreference> = state
            .preferences
            .iter()
            .filter(|p| filters.matches(*p))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.notification_type.cmp(&b.notification_type));
        Ok(rows)
    }

    async fn find_preference(
        &self,
        filters: &PredicateSet<PreferenceColumn>,
    ) -> StoreResult<Option<NotificationPreference>> {
        let state = self.lock()?;
        Ok(state
            .preferences
            .iter()
            .find(|p| filters.matches(*p))
            .cloned())
    }

    async fn upsert_preference(
        &self,
        user_id: &str,
        notification_type: &str,
        input: &UpdatePreference,
    ) -> StoreResult<NotificationPreference> {
        let mut state = self.lock()?;
        if std::mem::take(&mut state.conflict_next_upsert) {
            return Err(StoreError::UniqueViolation {
                constraint: UNIQUE_USER_TYPE_CONSTRAINT.to_string(),
            });
        }

        let now = Utc::now();
        if let Some(existing) = state
            .preferences
            .iter_mut()
            .find(|p| p.user_id == user_id && p.notification_type == notification_type)
        {
            existing.enabled = input.enabled.unwrap_or(existing.enabled);
            existing.email_enabled = input.email_enabled.unwrap_or(existing.email_enabled);
            existing.push_enabled = input.push_enabled.unwrap_or(existing.push_enabled);
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        state.last_preference_id += 1;
        let row = NotificationPreference {
            id: state.last_preference_id,
            user_id: user_id.to_string(),
            notification_type: notification_type.to_string(),
            enabled: input.enabled.unwrap_or(DEFAULT_ENABLED),
            email_enabled: input.email_enabled.unwrap_or(DEFAULT_EMAIL_ENABLED),
            push_enabled: input.push_enabled.unwrap_or(DEFAULT_PUSH_ENABLED),
            created_at: now,
            updated_at: now,
        };
        state.preferences.push(row.clone());
        Ok(row)
    }
}
