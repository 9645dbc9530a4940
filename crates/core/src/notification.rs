//! Notification domain rules: columns, filter criteria and input limits.
//!
//! The list path and the unread-count path both obtain their predicates from
//! [`build_filters`]; [`unread_filters`] is nothing more than `build_filters`
//! with `read = false`, so the two cannot drift apart.

use std::borrow::Cow;

use validator::ValidationError;

use crate::predicate::{Predicate, PredicateSet, ScopedColumns, Value};
use crate::query::{OrderBy, Page};
use crate::types::{DbId, Timestamp};

/// Entity name used in `NotFound` errors and log fields.
pub const ENTITY: &str = "Notification";

/// Maximum length of an action URL.
pub const MAX_ACTION_URL_LEN: u64 = 2048;

/// Maximum length of a category key (notification type, entity type).
pub const MAX_TYPE_KEY_LEN: usize = 100;

/// Maximum number of recipients in one batch create.
pub const MAX_BATCH_RECIPIENTS: usize = 1000;

/// Columns of the `notifications` table usable in predicates and ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationColumn {
    Id,
    UserId,
    NotificationType,
    RelatedEntityType,
    RelatedEntityId,
    ReadAt,
    CreatedAt,
    DeletedAt,
}

impl ScopedColumns for NotificationColumn {
    const OWNER: Self = NotificationColumn::UserId;
    const DELETED_AT: Option<Self> = Some(NotificationColumn::DeletedAt);

    fn name(self) -> &'static str {
        match self {
            NotificationColumn::Id => "id",
            NotificationColumn::UserId => "user_id",
            NotificationColumn::NotificationType => "notification_type",
            NotificationColumn::RelatedEntityType => "related_entity_type",
            NotificationColumn::RelatedEntityId => "related_entity_id",
            NotificationColumn::ReadAt => "read_at",
            NotificationColumn::CreatedAt => "created_at",
            NotificationColumn::DeletedAt => "deleted_at",
        }
    }
}

/// Caller-supplied list criteria. Every field is optional and additive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationFilters {
    /// `Some(true)` for read only, `Some(false)` for unread only.
    pub read: Option<bool>,
    pub notification_type: Option<String>,
    pub related_entity_type: Option<String>,
    /// Inclusive lower bound on `created_at`.
    pub created_after: Option<Timestamp>,
    /// Exclusive upper bound on `created_at`.
    pub created_before: Option<Timestamp>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl NotificationFilters {
    /// The criteria of the unread branch.
    pub fn unread() -> Self {
        Self {
            read: Some(false),
            ..Self::default()
        }
    }

    pub fn page(&self) -> Page {
        Page {
            limit: self.limit,
            offset: self.offset,
        }
    }
}

/// Build the predicate set for a list or count over `caller_id`'s
/// notifications.
///
/// The owner and not-deleted predicates are always present; criteria are
/// appended only when set. Pagination is not part of the predicate set.
pub fn build_filters(
    criteria: &NotificationFilters,
    caller_id: &str,
) -> PredicateSet<NotificationColumn> {
    let mut set = PredicateSet::owned_by(caller_id);

    match criteria.read {
        Some(true) => set = set.and(Predicate::IsNotNull(NotificationColumn::ReadAt)),
        Some(false) => set = set.and(Predicate::IsNull(NotificationColumn::ReadAt)),
        None => {}
    }

    if let Some(notification_type) = &criteria.notification_type {
        set = set.and(Predicate::eq(
            NotificationColumn::NotificationType,
            notification_type.as_str(),
        ));
    }

    if let Some(entity_type) = &criteria.related_entity_type {
        set = set.and(Predicate::eq(
            NotificationColumn::RelatedEntityType,
            entity_type.as_str(),
        ));
    }

    if criteria.created_after.is_some() || criteria.created_before.is_some() {
        set = set.and(Predicate::Range {
            column: NotificationColumn::CreatedAt,
            from: criteria.created_after.map(Value::from),
            to: criteria.created_before.map(Value::from),
        });
    }

    set
}

/// Predicates of the unread branch, shared by the list path and the
/// unread-count aggregation.
pub fn unread_filters(user_id: &str) -> PredicateSet<NotificationColumn> {
    build_filters(&NotificationFilters::unread(), user_id)
}

/// A single active notification, scoped to its owner.
pub fn by_id(owner_id: &str, id: DbId) -> PredicateSet<NotificationColumn> {
    PredicateSet::owned_by(owner_id).and(Predicate::eq(NotificationColumn::Id, id))
}

/// A single notification of the owner in any state, soft-deleted included.
pub fn by_id_any_state(owner_id: &str, id: DbId) -> PredicateSet<NotificationColumn> {
    PredicateSet::any_state(owner_id).and(Predicate::eq(NotificationColumn::Id, id))
}

/// Newest first, ties broken by id so pagination is stable.
pub fn default_order() -> [OrderBy<NotificationColumn>; 2] {
    [
        OrderBy::desc(NotificationColumn::CreatedAt),
        OrderBy::desc(NotificationColumn::Id),
    ]
}

/// Returns `true` if `key` is a well-formed category key: 1 to
/// [`MAX_TYPE_KEY_LEN`] characters of `[a-z0-9_.-]`.
pub fn is_valid_type_key(key: &str) -> bool {
    !key.is_empty()
        && key.len() <= MAX_TYPE_KEY_LEN
        && key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '.' | '-'))
}

/// `validator` adapter for [`is_valid_type_key`].
pub fn validate_type_key(key: &str) -> Result<(), ValidationError> {
    if is_valid_type_key(key) {
        Ok(())
    } else {
        Err(ValidationError::new("type_key").with_message(Cow::Borrowed(
            "must be 1-100 characters of lowercase letters, digits, '_', '.' or '-'",
        )))
    }
}

/// Text must contain something other than whitespace.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new("blank").with_message(Cow::Borrowed("must not be blank")))
    } else {
        Ok(())
    }
}

/// The related-entity pair is all or nothing.
pub fn validate_related_entity<T>(
    entity_type: Option<&str>,
    entity_id: Option<T>,
) -> Result<(), ValidationError> {
    match (entity_type, entity_id) {
        (Some(_), Some(_)) | (None, None) => Ok(()),
        _ => Err(ValidationError::new("related_entity").with_message(Cow::Borrowed(
            "related_entity_type and related_entity_id must be provided together",
        ))),
    }
}

/// Action URLs are either application-relative paths (`/tickets/42`) or
/// absolute `http(s)` URLs, without whitespace.
pub fn validate_action_url(url: &str) -> Result<(), ValidationError> {
    let relative = url.starts_with('/') && !url.starts_with("//");
    let absolute = url.starts_with("https://") || url.starts_with("http://");
    let well_formed = (relative || absolute)
        && url.len() as u64 <= MAX_ACTION_URL_LEN
        && !url.chars().any(char::is_whitespace);
    if well_formed {
        Ok(())
    } else {
        Err(ValidationError::new("action_url").with_message(Cow::Borrowed(
            "must be a relative path or an http(s) URL",
        )))
    }
}

/// Batch recipients: at least one, at most [`MAX_BATCH_RECIPIENTS`], no blank
/// and no repeated identifiers.
pub fn validate_recipients(user_ids: &[String]) -> Result<(), ValidationError> {
    let reason = if user_ids.is_empty() {
        Some("at least one recipient is required")
    } else if user_ids.len() > MAX_BATCH_RECIPIENTS {
        Some("too many recipients in one batch")
    } else if user_ids.iter().any(|id| id.trim().is_empty()) {
        Some("recipient ids must not be blank")
    } else {
        let mut seen = std::collections::HashSet::with_capacity(user_ids.len());
        (!user_ids.iter().all(|id| seen.insert(id.as_str())))
            .then_some("recipient ids must be unique")
    };
    match reason {
        Some(message) => {
            Err(ValidationError::new("recipients").with_message(Cow::Borrowed(message)))
        }
        None => Ok(()),
    }
}
