//! Ownership checks applied before and after storage access.
//!
//! The guard is a pure equality predicate: no roles, no delegation.

use crate::error::CoreError;
use crate::principal::Principal;
use crate::types::DbId;

/// Assert that the principal is the user whose data is being targeted.
///
/// Used for whole-collection operations (listing, counting, bulk updates,
/// preferences) where the target user is an explicit argument. A mismatch is
/// reported as [`CoreError::Unauthorized`] before any lookup happens.
pub fn assert_ownership(principal: &Principal, target_owner_id: &str) -> Result<(), CoreError> {
    if principal.user_id() == target_owner_id {
        Ok(())
    } else {
        tracing::warn!(
            caller = principal.user_id(),
            target = target_owner_id,
            "Rejected cross-user access"
        );
        Err(CoreError::Unauthorized(
            "Caller may not access another user's data".into(),
        ))
    }
}

/// Re-check the owner of a row that came back from an owner-scoped query.
///
/// A mismatch can only mean the query predicate was built wrong. It is
/// reported as [`CoreError::NotFound`] so the response never reveals that a
/// row with this id exists under some other owner.
pub fn ensure_row_owner(
    principal: &Principal,
    row_owner_id: &str,
    entity: &'static str,
    id: DbId,
) -> Result<(), CoreError> {
    if principal.user_id() == row_owner_id {
        return Ok(());
    }
    tracing::warn!(
        caller = principal.user_id(),
        entity,
        id,
        "Owner-scoped query returned a foreign row"
    );
    Err(CoreError::NotFound { entity, id })
}
