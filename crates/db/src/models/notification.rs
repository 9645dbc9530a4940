//! Notification entity models and DTOs.

use backoffice_core::notification::{
    validate_action_url, validate_not_blank, validate_recipients, validate_related_entity,
    validate_type_key, NotificationColumn,
};
use backoffice_core::predicate::{ColumnValues, Value};
use backoffice_core::preference::PreferenceColumn;
use backoffice_core::types::{DbId, Timestamp, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

/// A row from the `notifications` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Notification {
    pub id: DbId,
    pub user_id: UserId,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub related_entity_type: Option<String>,
    pub related_entity_id: Option<DbId>,
    pub read_at: Option<Timestamp>,
    pub action_url: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: Timestamp,
    pub deleted_at: Option<Timestamp>,
}

impl ColumnValues<NotificationColumn> for Notification {
    fn column_value(&self, column: NotificationColumn) -> Option<Value> {
        match column {
            NotificationColumn::Id => Some(self.id.into()),
            NotificationColumn::UserId => Some(self.user_id.as_str().into()),
            NotificationColumn::NotificationType => Some(self.notification_type.as_str().into()),
            NotificationColumn::RelatedEntityType => {
                self.related_entity_type.as_deref().map(Value::from)
            }
            NotificationColumn::RelatedEntityId => self.related_entity_id.map(Value::from),
            NotificationColumn::ReadAt => self.read_at.map(Value::from),
            NotificationColumn::CreatedAt => Some(self.created_at.into()),
            NotificationColumn::DeletedAt => self.deleted_at.map(Value::from),
        }
    }
}

/// Fields shared by single and batch creates.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Validate)]
#[validate(schema(function = "validate_payload_related_entity"))]
pub struct NotificationPayload {
    #[validate(custom(function = "validate_type_key"))]
    pub notification_type: String,
    #[validate(length(min = 1, max = 255), custom(function = "validate_not_blank"))]
    pub title: String,
    #[validate(length(min = 1, max = 5000), custom(function = "validate_not_blank"))]
    pub message: String,
    #[serde(default)]
    #[validate(custom(function = "validate_type_key"))]
    pub related_entity_type: Option<String>,
    #[serde(default)]
    pub related_entity_id: Option<DbId>,
    #[serde(default)]
    #[validate(custom(function = "validate_action_url"))]
    pub action_url: Option<String>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

fn validate_payload_related_entity(payload: &NotificationPayload) -> Result<(), ValidationError> {
    validate_related_entity(
        payload.related_entity_type.as_deref(),
        payload.related_entity_id,
    )
}

/// DTO for creating a notification for one target user.
///
/// The target need not be the caller: system and batch senders create
/// notifications on behalf of other users.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Validate)]
pub struct CreateNotification {
    #[validate(length(min = 1, max = 255), custom(function = "validate_not_blank"))]
    pub user_id: UserId,
    #[serde(flatten)]
    #[validate(nested)]
    pub payload: NotificationPayload,
}

/// DTO for creating the same notification for several users at once.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Validate)]
pub struct CreateNotificationBatch {
    #[validate(custom(function = "validate_recipients"))]
    pub user_ids: Vec<UserId>,
    #[serde(flatten)]
    #[validate(nested)]
    pub payload: NotificationPayload,
}

/// One page of a user's notifications plus the aggregates computed over the
/// same owner scope and the same snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationList {
    pub notifications: Vec<Notification>,
    /// Size of the filtered set before pagination.
    pub total: i64,
    /// Unread count over the owner's whole active set, ignoring filters.
    pub unread_count: i64,
}

/// A row from the `notification_preferences` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct NotificationPreference {
    pub id: DbId,
    pub user_id: UserId,
    pub notification_type: String,
    pub enabled: bool,
    pub email_enabled: bool,
    pub push_enabled: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ColumnValues<PreferenceColumn> for NotificationPreference {
    fn column_value(&self, column: PreferenceColumn) -> Option<Value> {
        match column {
            PreferenceColumn::UserId => Some(self.user_id.as_str().into()),
            PreferenceColumn::NotificationType => Some(self.notification_type.as_str().into()),
        }
    }
}

/// DTO for updating a notification preference. Omitted fields keep their
/// stored value, or take the default when the row is created.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct UpdatePreference {
    pub enabled: Option<bool>,
    pub email_enabled: Option<bool>,
    pub push_enabled: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> NotificationPayload {
        NotificationPayload {
            notification_type: "ticket.assigned".into(),
            title: "Ticket assigned".into(),
            message: "You have a new ticket".into(),
            related_entity_type: Some("ticket".into()),
            related_entity_id: Some(42),
            action_url: Some("/tickets/42".into()),
            metadata: None,
        }
    }

    #[test]
    fn valid_payload_passes() {
        assert!(payload().validate().is_ok());
    }

    #[test]
    fn blank_title_is_rejected() {
        let mut p = payload();
        p.title = String::new();
        assert!(p.validate().is_err());
    }

    #[test]
    fn whitespace_only_text_is_rejected() {
        let mut p = payload();
        p.title = "   ".into();
        assert!(p.validate().is_err());

        let mut p = payload();
        p.message = "\n\t".into();
        assert!(p.validate().is_err());

        let create = CreateNotification {
            user_id: " ".into(),
            payload: payload(),
        };
        assert!(create.validate().is_err());
    }

    #[test]
    fn half_related_entity_pair_is_rejected() {
        let mut p = payload();
        p.related_entity_id = None;
        assert!(p.validate().is_err());
    }

    #[test]
    fn create_validates_nested_payload_and_target() {
        let create = CreateNotification {
            user_id: String::new(),
            payload: payload(),
        };
        assert!(create.validate().is_err());

        let mut bad_payload = payload();
        bad_payload.notification_type = "Not A Key".into();
        let create = CreateNotification {
            user_id: "u1".into(),
            payload: bad_payload,
        };
        assert!(create.validate().is_err());
    }

    #[test]
    fn create_deserializes_flattened_payload() {
        let create: CreateNotification = serde_json::from_value(serde_json::json!({
            "user_id": "u1",
            "notification_type": "hr.leave_approved",
            "title": "Leave approved",
            "message": "Enjoy your time off",
        }))
        .unwrap();
        assert_eq!(create.user_id, "u1");
        assert_eq!(create.payload.related_entity_type, None);
        assert!(create.validate().is_ok());
    }

    #[test]
    fn batch_rejects_duplicate_recipients() {
        let batch = CreateNotificationBatch {
            user_ids: vec!["u1".into(), "u1".into()],
            payload: payload(),
        };
        assert!(batch.validate().is_err());
    }
}
