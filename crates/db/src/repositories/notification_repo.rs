//! Repository for the `notifications` table.
//!
//! Every read and update takes a [`PredicateSet`] built by the access layer;
//! the repository never decides on its own which rows are visible.

use backoffice_core::notification::NotificationColumn;
use backoffice_core::predicate::PredicateSet;
use backoffice_core::query::{OrderBy, Page};
use backoffice_core::types::UserId;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::models::notification::{
    CreateNotification, Notification, NotificationList, NotificationPayload,
};
use crate::sql::{push_order, push_page, push_where};

/// Column list for `notifications` queries.
const COLUMNS: &str = "id, user_id, notification_type, title, message, \
    related_entity_type, related_entity_id, read_at, action_url, metadata, \
    created_at, deleted_at";

/// Provides scoped CRUD operations for notifications.
pub struct NotificationRepo;

impl NotificationRepo {
    /// Insert a notification for `input.user_id`, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateNotification,
    ) -> Result<Notification, sqlx::Error> {
        let p = &input.payload;
        let query = format!(
            "INSERT INTO notifications \
                (user_id, notification_type, title, message, related_entity_type, \
                 related_entity_id, action_url, metadata) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Notification>(&query)
            .bind(&input.user_id)
            .bind(&p.notification_type)
            .bind(&p.title)
            .bind(&p.message)
            .bind(&p.related_entity_type)
            .bind(p.related_entity_id)
            .bind(&p.action_url)
            .bind(&p.metadata)
            .fetch_one(pool)
            .await
    }

    /// Insert one notification per user from a shared payload.
    ///
    /// Runs inside a transaction: either every row is created or none is.
    /// Rows are returned in the order of `user_ids`.
    pub async fn create_for_users(
        pool: &PgPool,
        user_ids: &[UserId],
        payload: &NotificationPayload,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let query = format!(
            "INSERT INTO notifications \
                (user_id, notification_type, title, message, related_entity_type, \
                 related_entity_id, action_url, metadata) \
             SELECT t.user_id, $2, $3, $4, $5, $6, $7, $8 \
             FROM UNNEST($1::text[]) WITH ORDINALITY AS t(user_id, ord) \
             ORDER BY t.ord \
             RETURNING {COLUMNS}"
        );

        let mut tx = pool.begin().await?;
        let mut rows = sqlx::query_as::<_, Notification>(&query)
            .bind(user_ids)
            .bind(&payload.notification_type)
            .bind(&payload.title)
            .bind(&payload.message)
            .bind(&payload.related_entity_type)
            .bind(payload.related_entity_id)
            .bind(&payload.action_url)
            .bind(&payload.metadata)
            .fetch_all(&mut *tx)
            .await?;
        tx.commit().await?;

        // BIGSERIAL ids follow the ORDER BY of the insert.
        rows.sort_by_key(|n| n.id);
        Ok(rows)
    }

    /// Fetch the first row matching `filters`.
    pub async fn find(
        pool: &PgPool,
        filters: &PredicateSet<NotificationColumn>,
    ) -> Result<Option<Notification>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM notifications"));
        push_where(&mut qb, filters);
        qb.push(" LIMIT 1");
        qb.build_query_as::<Notification>()
            .fetch_optional(pool)
            .await
    }

    /// Count rows matching `filters`. Never paginated.
    pub async fn count(
        pool: &PgPool,
        filters: &PredicateSet<NotificationColumn>,
    ) -> Result<i64, sqlx::Error> {
        count_query(filters)
            .build_query_scalar::<i64>()
            .fetch_one(pool)
            .await
    }

    /// List one page of `filters` in the given order, with the unpaginated
    /// size of `filters` and the size of `unread`.
    ///
    /// The three reads share one REPEATABLE READ transaction, so they see the
    /// same snapshot.
    pub async fn list_with_counts(
        pool: &PgPool,
        filters: &PredicateSet<NotificationColumn>,
        unread: &PredicateSet<NotificationColumn>,
        order: &[OrderBy<NotificationColumn>],
        page: Page,
    ) -> Result<NotificationList, sqlx::Error> {
        let mut tx = pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let notifications = list_query(filters, order, page)
            .build_query_as::<Notification>()
            .fetch_all(&mut *tx)
            .await?;
        let total = count_query(filters)
            .build_query_scalar::<i64>()
            .fetch_one(&mut *tx)
            .await?;
        let unread_count = count_query(unread)
            .build_query_scalar::<i64>()
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(NotificationList {
            notifications,
            total,
            unread_count,
        })
    }

    /// Set `read_at` on the row matching `filters` if it is still unread.
    ///
    /// Returns the row (already-read rows come back unchanged), or `None`
    /// when nothing matched.
    pub async fn mark_read(
        pool: &PgPool,
        filters: &PredicateSet<NotificationColumn>,
    ) -> Result<Option<Notification>, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "UPDATE notifications SET read_at = COALESCE(read_at, NOW())",
        );
        push_where(&mut qb, filters);
        qb.push(format!(" RETURNING {COLUMNS}"));
        qb.build_query_as::<Notification>()
            .fetch_optional(pool)
            .await
    }

    /// Set `read_at = NOW()` on every row matching `filters`.
    ///
    /// Callers pass the unread predicate set, so rows that are already read
    /// are not touched. Returns the number of rows updated.
    pub async fn mark_all_read(
        pool: &PgPool,
        filters: &PredicateSet<NotificationColumn>,
    ) -> Result<u64, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE notifications SET read_at = NOW()");
        push_where(&mut qb, filters);
        let result = qb.build().execute(pool).await?;
        Ok(result.rows_affected())
    }

    /// Set `deleted_at` on the row matching `filters` unless already set.
    ///
    /// Returns `true` if a matching row exists (deleted now or before).
    pub async fn soft_delete(
        pool: &PgPool,
        filters: &PredicateSet<NotificationColumn>,
    ) -> Result<bool, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "UPDATE notifications SET deleted_at = COALESCE(deleted_at, NOW())",
        );
        push_where(&mut qb, filters);
        let result = qb.build().execute(pool).await?;
        Ok(result.rows_affected() > 0)
    }
}

fn list_query(
    filters: &PredicateSet<NotificationColumn>,
    order: &[OrderBy<NotificationColumn>],
    page: Page,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT {COLUMNS} FROM notifications"));
    push_where(&mut qb, filters);
    push_order(&mut qb, order);
    push_page(&mut qb, page);
    qb
}

fn count_query(filters: &PredicateSet<NotificationColumn>) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM notifications");
    push_where(&mut qb, filters);
    qb
}
