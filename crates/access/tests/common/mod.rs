#![allow(dead_code)]

use std::sync::Arc;

use backoffice_access::{MemoryNotificationStore, NotificationService};
use backoffice_core::principal::Principal;
use backoffice_db::models::notification::{
    CreateNotification, CreateNotificationBatch, Notification, NotificationPayload,
};

/// A service over a fresh memory store, plus a handle on the store for
/// fault injection and unscoped inspection.
pub fn service() -> (NotificationService, MemoryNotificationStore) {
    let store = MemoryNotificationStore::new();
    let service = NotificationService::new(Arc::new(store.clone()));
    (service, store)
}

pub fn principal(user_id: &str) -> Principal {
    Principal::new(user_id)
}

pub fn payload(notification_type: &str, title: &str) -> NotificationPayload {
    NotificationPayload {
        notification_type: notification_type.to_string(),
        title: title.to_string(),
        message: format!("{title} body"),
        related_entity_type: None,
        related_entity_id: None,
        action_url: None,
        metadata: None,
    }
}

pub fn new_notification(user_id: &str, title: &str) -> CreateNotification {
    CreateNotification {
        user_id: user_id.to_string(),
        payload: payload("ticket.assigned", title),
    }
}

pub fn new_batch(user_ids: &[&str], title: &str) -> CreateNotificationBatch {
    CreateNotificationBatch {
        user_ids: user_ids.iter().map(|u| u.to_string()).collect(),
        payload: payload("system.announcement", title),
    }
}

/// Create a notification for `user_id`, sent by `system`.
pub async fn seed(service: &NotificationService, user_id: &str, title: &str) -> Notification {
    service
        .create_notification(Some(&principal("system")), &new_notification(user_id, title))
        .await
        .expect("seed notification")
}
