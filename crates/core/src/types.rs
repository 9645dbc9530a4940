/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Stable user identifier supplied by the identity provider.
///
/// Opaque to this layer: it is only ever compared for equality and stored
/// in owner columns.
pub type UserId = String;
