/// All entity identifiers are opaque, stable strings.
pub type EntityId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Generate a fresh identifier.
///
/// UUID v7 strings sort by creation time, which keeps storage indexes tidy.
pub fn new_id() -> EntityId {
    uuid::Uuid::now_v7().to_string()
}
