use crate::types::DbId;

/// Domain-level failures raised by the access layer.
///
/// Every variant is surfaced to the caller; none of them is ever replaced by
/// an empty or default result.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// No resolvable principal for the request.
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// The principal does not match the user whose data is targeted.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<validator::ValidationErrors> for CoreError {
    fn from(errors: validator::ValidationErrors) -> Self {
        CoreError::Validation(errors.to_string())
    }
}
