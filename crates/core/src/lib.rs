//! Domain rules of the owner-scoped data-access layer.
//!
//! No I/O lives here: identities, ownership checks, predicate construction
//! and input limits only, so the database layer, the access layer and tests
//! all share one definition.

pub mod error;
pub mod guard;
pub mod notification;
pub mod predicate;
pub mod preference;
pub mod principal;
pub mod query;
pub mod types;
