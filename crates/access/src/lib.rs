//! Authorization-enforced access to notifications and their preferences.
//!
//! Every operation on [`NotificationService`] takes the caller as an explicit
//! `Option<&Principal>` and runs the same sequence before touching storage:
//! require a principal, assert ownership of the targeted user's data, build
//! the owner-scoped predicate set, then call the [`NotificationStore`].
//!
//! - [`store`] -- the storage seam and its error type.
//! - [`pg`] -- PostgreSQL store backed by the `backoffice-db` repositories.
//! - [`memory`] -- in-process store evaluating the same predicate sets.

pub mod memory;
pub mod notifications;
pub mod pg;
pub mod preferences;
pub mod store;

pub use memory::MemoryNotificationStore;
pub use backoffice_db::models::notification::NotificationList;
pub use notifications::NotificationService;
pub use pg::PgNotificationStore;
pub use store::{NotificationStore, StoreError, StoreResult};
