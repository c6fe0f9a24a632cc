/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Batch identifiers are generated client-side so they can be recorded on
/// the import record before the batch's tasks become claimable.
pub type BatchId = uuid::Uuid;

/// One source row: raw column name to raw string value. Produced lazily by
/// the source readers and never persisted outside a task payload.
pub type RowRecord = std::collections::HashMap<String, String>;
