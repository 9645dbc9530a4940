//! Render predicate sets, ordering and pagination into a [`QueryBuilder`].
//!
//! Column names come from the closed [`ScopedColumns`] enums and every value
//! is bound as a parameter, so no caller-controlled text reaches the SQL.

use backoffice_core::predicate::{Predicate, PredicateSet, ScopedColumns, Value};
use backoffice_core::query::{OrderBy, Page};
use sqlx::{Postgres, QueryBuilder};

/// Append ` WHERE <p1> AND <p2> ...` for the full conjunction of `set`.
pub fn push_where<C: ScopedColumns>(qb: &mut QueryBuilder<'_, Postgres>, set: &PredicateSet<C>) {
    qb.push(" WHERE ");
    for (i, predicate) in set.predicates().into_iter().enumerate() {
        if i > 0 {
            qb.push(" AND ");
        }
        push_predicate(qb, predicate);
    }
}

fn push_predicate<C: ScopedColumns>(qb: &mut QueryBuilder<'_, Postgres>, predicate: Predicate<C>) {
    match predicate {
        Predicate::Eq { column, value } => {
            qb.push(column.name()).push(" = ");
            push_value(qb, value);
        }
        Predicate::IsNull(column) => {
            qb.push(column.name()).push(" IS NULL");
        }
        Predicate::IsNotNull(column) => {
            qb.push(column.name()).push(" IS NOT NULL");
        }
        Predicate::Range { column, from, to } => match (from, to) {
            (None, None) => {
                qb.push(column.name()).push(" IS NOT NULL");
            }
            (Some(from), None) => {
                qb.push(column.name()).push(" >= ");
                push_value(qb, from);
            }
            (None, Some(to)) => {
                qb.push(column.name()).push(" < ");
                push_value(qb, to);
            }
            (Some(from), Some(to)) => {
                qb.push("(").push(column.name()).push(" >= ");
                push_value(qb, from);
                qb.push(" AND ").push(column.name()).push(" < ");
                push_value(qb, to);
                qb.push(")");
            }
        },
    }
}

fn push_value(qb: &mut QueryBuilder<'_, Postgres>, value: Value) {
    match value {
        Value::Text(text) => qb.push_bind(text),
        Value::Int(int) => qb.push_bind(int),
        Value::Bool(flag) => qb.push_bind(flag),
        Value::Timestamp(ts) => qb.push_bind(ts),
    };
}

/// Append ` ORDER BY ...`. Nothing is appended for an empty slice.
pub fn push_order<C: ScopedColumns>(qb: &mut QueryBuilder<'_, Postgres>, order: &[OrderBy<C>]) {
    for (i, key) in order.iter().enumerate() {
        qb.push(if i == 0 { " ORDER BY " } else { ", " });
        qb.push(key.column.name())
            .push(" ")
            .push(key.direction.to_sql());
    }
}

/// Append ` LIMIT` / ` OFFSET` for whichever bounds are present.
pub fn push_page(qb: &mut QueryBuilder<'_, Postgres>, page: Page) {
    if let Some(limit) = page.limit {
        qb.push(" LIMIT ").push_bind(limit);
    }
    if let Some(offset) = page.offset {
        qb.push(" OFFSET ").push_bind(offset);
    }
}
