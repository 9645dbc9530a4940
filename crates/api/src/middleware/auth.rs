//! Resolves the caller's identity from the `Authorization` header.
//!
//! Resolution never rejects a request. A missing, malformed, or invalid
//! token yields no principal, and the access layer answers that with
//! `Unauthenticated` before touching storage.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use backoffice_core::principal::{IdentityResolver, Principal};

use crate::auth::jwt::{validate_token, JwtConfig};
use crate::state::AppState;

impl IdentityResolver<HeaderMap> for JwtConfig {
    fn resolve(&self, headers: &HeaderMap) -> Option<Principal> {
        let header = headers.get(AUTHORIZATION)?;
        let Some(token) = header
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer "))
        else {
            tracing::debug!("Authorization header is not a Bearer token");
            return None;
        };

        match validate_token(token, self) {
            Ok(claims) if !claims.sub.is_empty() => Some(Principal::new(claims.sub)),
            Ok(_) => {
                tracing::debug!("Access token has an empty subject");
                None
            }
            Err(e) => {
                tracing::debug!(error = %e, "Rejected access token");
                None
            }
        }
    }
}

/// The caller's principal, if the request carried a valid access token.
///
/// ```ignore
/// async fn my_handler(caller: Caller, State(state): State<AppState>) -> AppResult<Json<()>> {
///     state.notifications.get_unread_count(caller.principal(), "u-1").await?;
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Caller(pub Option<Principal>);

impl Caller {
    pub fn principal(&self) -> Option<&Principal> {
        self.0.as_ref()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.0.as_ref().map(Principal::user_id)
    }
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Caller(state.config.jwt.resolve(&parts.headers)))
    }
}
