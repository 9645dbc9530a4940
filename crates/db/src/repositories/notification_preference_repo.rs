//! Repository for the `notification_preferences` table.

use backoffice_core::preference::{
    PreferenceColumn, DEFAULT_EMAIL_ENABLED, DEFAULT_ENABLED, DEFAULT_PUSH_ENABLED,
};
use backoffice_core::predicate::PredicateSet;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::models::notification::{NotificationPreference, UpdatePreference};
use crate::sql::push_where;

/// Column list for `notification_preferences` queries.
const PREF_COLUMNS: &str = "id, user_id, notification_type, enabled, email_enabled, \
    push_enabled, created_at, updated_at";

/// Provides CRUD operations for notification preferences.
pub struct NotificationPreferenceRepo;

impl NotificationPreferenceRepo {
    /// List preferences matching `filters`, ordered by type.
    pub async fn list(
        pool: &PgPool,
        filters: &PredicateSet<PreferenceColumn>,
    ) -> Result<Vec<NotificationPreference>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {PREF_COLUMNS} FROM notification_preferences"
        ));
        push_where(&mut qb, filters);
        qb.push(" ORDER BY notification_type");
        qb.build_query_as::<NotificationPreference>()
            .fetch_all(pool)
            .await
    }

    /// Fetch the single preference matching `filters`, if any.
    pub async fn find(
        pool: &PgPool,
        filters: &PredicateSet<PreferenceColumn>,
    ) -> Result<Option<NotificationPreference>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {PREF_COLUMNS} FROM notification_preferences"
        ));
        push_where(&mut qb, filters);
        qb.build_query_as::<NotificationPreference>()
            .fetch_optional(pool)
            .await
    }

    /// Insert or partially update the preference for `(user_id, notification_type)`.
    ///
    /// A single `INSERT ... ON CONFLICT ... DO UPDATE` statement, so the
    /// uniqueness constraint is the only arbiter between concurrent writers.
    /// Inserts take the explicit defaults for omitted fields; updates keep the
    /// stored value for omitted fields (`COALESCE`) and refresh `updated_at`.
    pub async fn upsert(
        pool: &PgPool,
        user_id: &str,
        notification_type: &str,
        input: &UpdatePreference,
    ) -> Result<NotificationPreference, sqlx::Error> {
        let query = format!(
            "INSERT INTO notification_preferences AS np \
                (user_id, notification_type, enabled, email_enabled, push_enabled) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT ON CONSTRAINT uq_notification_preferences_user_type DO UPDATE SET \
                enabled = COALESCE($6, np.enabled), \
                email_enabled = COALESCE($7, np.email_enabled), \
                push_enabled = COALESCE($8, np.push_enabled), \
                updated_at = NOW() \
             RETURNING {PREF_COLUMNS}"
        );
        sqlx::query_as::<_, NotificationPreference>(&query)
            .bind(user_id)
            .bind(notification_type)
            .bind(input.enabled.unwrap_or(DEFAULT_ENABLED))
            .bind(input.email_enabled.unwrap_or(DEFAULT_EMAIL_ENABLED))
            .bind(input.push_enabled.unwrap_or(DEFAULT_PUSH_ENABLED))
            .bind(input.enabled)
            .bind(input.email_enabled)
            .bind(input.push_enabled)
            .fetch_one(pool)
            .await
    }
}
