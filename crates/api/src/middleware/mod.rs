//! Request extractors.
//!
//! - [`auth::Caller`] -- the caller's optional principal, resolved from a JWT
//!   Bearer token.

pub mod auth;
