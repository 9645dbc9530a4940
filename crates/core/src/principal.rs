//! The resolved identity of the current caller.
//!
//! The identity provider is an external collaborator: something upstream
//! (the HTTP auth extractor, a job runner, a test) resolves the request into
//! an `Option<Principal>` and passes it explicitly into every access-layer
//! call. Nothing in this crate reaches for ambient request state.

use serde::Serialize;

use crate::error::CoreError;
use crate::types::UserId;

/// An authenticated caller carrying exactly one stable user identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Principal {
    user_id: UserId,
}

impl Principal {
    pub fn new(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

/// Resolves an inbound request into a principal, or `None` when the request
/// carries no usable identity.
pub trait IdentityResolver<R: ?Sized> {
    fn resolve(&self, request: &R) -> Option<Principal>;
}

/// Demand a present principal.
///
/// This is the first statement of every access-layer operation; absence is
/// reported as [`CoreError::Unauthenticated`] before any storage access.
pub fn require(identity: Option<&Principal>) -> Result<&Principal, CoreError> {
    identity.ok_or_else(|| CoreError::Unauthenticated("Authentication required".into()))
}
