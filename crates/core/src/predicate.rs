//! Tagged-variant filter predicates with mandatory row-level scoping.
//!
//! A [`PredicateSet`] is the conjunction applied to every owner-scoped query.
//! The owner predicate and (for soft-deletable entities) the not-deleted
//! predicate are structural: they are derived from the set's `owner` and
//! `scope` fields and always come first in [`PredicateSet::predicates`].
//! Caller criteria can only be appended with [`PredicateSet::and`], so they
//! narrow the result and can never widen it.
//!
//! The same set is rendered to SQL by the database layer and evaluated
//! directly by in-memory stores via [`PredicateSet::matches`].

use std::cmp::Ordering;

use serde::Serialize;

use crate::types::{Timestamp, UserId};

/// A bound parameter value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Int(i64),
    Bool(bool),
    Timestamp(Timestamp),
}

impl Value {
    /// Compare two values of the same variant. Mixed variants are unordered.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<Timestamp> for Value {
    fn from(value: Timestamp) -> Self {
        Value::Timestamp(value)
    }
}

/// Column set of an owner-scoped entity.
///
/// Every entity module (notifications, tickets, tasks, candidates,
/// subscriptions) declares one of these; the mandatory predicates are built
/// from `OWNER` and `DELETED_AT`.
pub trait ScopedColumns: Copy + Eq + std::fmt::Debug + Send + Sync + 'static {
    /// Column holding the owning user's identifier.
    const OWNER: Self;

    /// Soft-delete timestamp column, if the entity is soft-deletable.
    const DELETED_AT: Option<Self>;

    /// SQL column name.
    fn name(self) -> &'static str;
}

/// Read access to a row's column values, `None` meaning SQL `NULL`.
pub trait ColumnValues<C> {
    fn column_value(&self, column: C) -> Option<Value>;
}

/// A single filter condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate<C> {
    Eq { column: C, value: Value },
    IsNull(C),
    IsNotNull(C),
    /// Inclusive lower bound, exclusive upper bound; either may be absent.
    Range {
        column: C,
        from: Option<Value>,
        to: Option<Value>,
    },
}

impl<C: ScopedColumns> Predicate<C> {
    pub fn eq(column: C, value: impl Into<Value>) -> Self {
        Predicate::Eq {
            column,
            value: value.into(),
        }
    }

    pub fn column(&self) -> C {
        match self {
            Predicate::Eq { column, .. }
            | Predicate::IsNull(column)
            | Predicate::IsNotNull(column)
            | Predicate::Range { column, .. } => *column,
        }
    }

    /// Evaluate against a row with SQL semantics: comparisons against `NULL`
    /// never match.
    pub fn matches<R: ColumnValues<C>>(&self, row: &R) -> bool {
        let actual = row.column_value(self.column());
        match self {
            Predicate::Eq { value, .. } => actual.as_ref() == Some(value),
            Predicate::IsNull(_) => actual.is_none(),
            Predicate::IsNotNull(_) => actual.is_some(),
            Predicate::Range { from, to, .. } => {
                let Some(actual) = actual else {
                    return false;
                };
                let above = from.as_ref().map_or(true, |lower| {
                    matches!(
                        actual.compare(lower),
                        Some(Ordering::Greater | Ordering::Equal)
                    )
                });
                let below = to
                    .as_ref()
                    .map_or(true, |upper| actual.compare(upper) == Some(Ordering::Less));
                above && below
            }
        }
    }
}

/// Which rows of the owner are in scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Only rows that are not soft-deleted. Used by every read, count and
    /// update path.
    Active,
    /// Soft-deleted rows included. Only the soft-delete path uses this, so
    /// that deleting twice can be told apart from deleting a missing row.
    AnyState,
}

/// Conjunction of the mandatory scoping predicates and additive criteria.
#[derive(Debug, Clone, PartialEq)]
pub struct PredicateSet<C> {
    owner: UserId,
    scope: Scope,
    criteria: Vec<Predicate<C>>,
}

impl<C: ScopedColumns> PredicateSet<C> {
    /// Active rows owned by `owner`.
    pub fn owned_by(owner: impl Into<UserId>) -> Self {
        Self {
            owner: owner.into(),
            scope: Scope::Active,
            criteria: Vec::new(),
        }
    }

    /// All rows owned by `owner`, soft-deleted ones included.
    pub fn any_state(owner: impl Into<UserId>) -> Self {
        Self {
            owner: owner.into(),
            scope: Scope::AnyState,
            criteria: Vec::new(),
        }
    }

    /// Append a criterion to the conjunction.
    #[must_use]
    pub fn and(mut self, predicate: Predicate<C>) -> Self {
        self.criteria.push(predicate);
        self
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Caller-supplied criteria only, without the mandatory predicates.
    pub fn criteria(&self) -> &[Predicate<C>] {
        &self.criteria
    }

    /// The full conjunction, mandatory predicates first.
    pub fn predicates(&self) -> Vec<Predicate<C>> {
        let mut all = Vec::with_capacity(self.criteria.len() + 2);
        all.push(Predicate::eq(C::OWNER, self.owner.as_str()));
        if self.scope == Scope::Active {
            if let Some(deleted_at) = C::DELETED_AT {
                all.push(Predicate::IsNull(deleted_at));
            }
        }
        all.extend(self.criteria.iter().cloned());
        all
    }

    pub fn matches<R: ColumnValues<C>>(&self, row: &R) -> bool {
        self.predicates().iter().all(|p| p.matches(row))
    }
}
