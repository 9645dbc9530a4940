//! Notification preference defaults and columns.
//!
//! A missing preference row is a valid state: it resolves to the defaults
//! below, never to an error.

use crate::predicate::{Predicate, PredicateSet, ScopedColumns};

/// Entity name used in errors and log fields.
pub const ENTITY: &str = "NotificationPreference";

/// Delivery is enabled unless the user has opted out.
pub const DEFAULT_ENABLED: bool = true;

/// Email delivery is opt-in.
pub const DEFAULT_EMAIL_ENABLED: bool = false;

/// Push delivery is opt-in.
pub const DEFAULT_PUSH_ENABLED: bool = false;

/// Name of the `(user_id, notification_type)` uniqueness constraint.
pub const UNIQUE_USER_TYPE_CONSTRAINT: &str = "uq_notification_preferences_user_type";

/// Columns of the `notification_preferences` table. Preferences are never
/// soft-deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreferenceColumn {
    UserId,
    NotificationType,
}

impl ScopedColumns for PreferenceColumn {
    const OWNER: Self = PreferenceColumn::UserId;
    const DELETED_AT: Option<Self> = None;

    fn name(self) -> &'static str {
        match self {
            PreferenceColumn::UserId => "user_id",
            PreferenceColumn::NotificationType => "notification_type",
        }
    }
}

/// Predicates for a user's preferences, optionally narrowed to one type.
pub fn preference_filters(
    user_id: &str,
    notification_type: Option<&str>,
) -> PredicateSet<PreferenceColumn> {
    let set = PredicateSet::owned_by(user_id);
    match notification_type {
        Some(key) => set.and(Predicate::eq(PreferenceColumn::NotificationType, key)),
        None => set,
    }
}

/// Resolve the effective `enabled` flag for a possibly-missing row.
pub fn resolve_enabled(stored: Option<bool>) -> bool {
    stored.unwrap_or(DEFAULT_ENABLED)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_row_resolves_to_enabled() {
        assert!(resolve_enabled(None));
    }

    #[test]
    fn stored_flag_wins() {
        assert!(!resolve_enabled(Some(false)));
        assert!(resolve_enabled(Some(true)));
    }

    #[test]
    fn preference_filters_have_no_deleted_predicate() {
        let set = preference_filters("u1", Some("ticket.assigned"));
        assert_eq!(
            set.predicates(),
            vec![
                Predicate::eq(PreferenceColumn::UserId, "u1"),
                Predicate::eq(PreferenceColumn::NotificationType, "ticket.assigned"),
            ]
        );
    }

    #[test]
    fn channel_defaults_are_opt_in() {
        assert!(DEFAULT_ENABLED);
        assert!(!DEFAULT_EMAIL_ENABLED);
        assert!(!DEFAULT_PUSH_ENABLED);
    }
}
