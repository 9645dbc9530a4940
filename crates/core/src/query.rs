//! Ordering and pagination for list paths.
//!
//! Counts never take a [`Page`]; only the list path is paginated.

use std::cmp::Ordering;

use crate::error::CoreError;
use crate::predicate::{ColumnValues, ScopedColumns};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy<C> {
    pub column: C,
    pub direction: SortDirection,
}

impl<C: ScopedColumns> OrderBy<C> {
    pub fn asc(column: C) -> Self {
        Self {
            column,
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(column: C) -> Self {
        Self {
            column,
            direction: SortDirection::Desc,
        }
    }

    /// Compare two rows on this key. `NULL` sorts last in both directions,
    /// matching PostgreSQL's default for `DESC` and keeping `ASC` stable.
    pub fn compare<R: ColumnValues<C>>(&self, a: &R, b: &R) -> Ordering {
        match (a.column_value(self.column), b.column_value(self.column)) {
            (Some(x), Some(y)) => {
                let ord = x.compare(&y).unwrap_or(Ordering::Equal);
                match self.direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            }
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

/// Compare two rows on a sequence of sort keys.
pub fn compare_rows<C: ScopedColumns, R: ColumnValues<C>>(
    order: &[OrderBy<C>],
    a: &R,
    b: &R,
) -> Ordering {
    order
        .iter()
        .map(|key| key.compare(a, b))
        .find(|ord| *ord != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}

/// Optional `limit` / `offset`. When both are absent the full filtered set
/// is returned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl Page {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.limit.is_some_and(|l| l < 0) {
            return Err(CoreError::Validation("limit must not be negative".into()));
        }
        if self.offset.is_some_and(|o| o < 0) {
            return Err(CoreError::Validation("offset must not be negative".into()));
        }
        Ok(())
    }

    /// Apply the page to an already ordered sequence.
    pub fn apply<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        let skip = self.offset.unwrap_or(0).max(0) as usize;
        let iter = items.into_iter().skip(skip);
        match self.limit {
            Some(limit) => iter.take(limit.max(0) as usize).collect(),
            None => iter.collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn empty_page_returns_everything() {
        assert_eq!(Page::default().apply(1..=5), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn limit_and_offset_slice_the_sequence() {
        let page = Page {
            limit: Some(2),
            offset: Some(1),
        };
        assert_eq!(page.apply(1..=5), vec![2, 3]);
    }

    #[test]
    fn offset_past_the_end_is_empty() {
        let page = Page {
            limit: None,
            offset: Some(10),
        };
        assert!(page.apply(1..=5).is_empty());
    }

    #[test]
    fn negative_values_are_rejected() {
        let page = Page {
            limit: Some(-1),
            offset: None,
        };
        assert_matches!(page.validate(), Err(CoreError::Validation(_)));
        let page = Page {
            limit: None,
            offset: Some(-3),
        };
        assert_matches!(page.validate(), Err(CoreError::Validation(_)));
    }
}
