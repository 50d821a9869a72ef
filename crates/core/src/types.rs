/// Records in the hosted database are keyed by UUID.
pub type EntityId = uuid::Uuid;

/// Tenant-scoping identifier; every read and write is filtered by it.
pub type WorkspaceId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Calendar dates (obra start/completion) carry no time component.
pub type Date = chrono::NaiveDate;
