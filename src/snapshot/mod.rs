pub mod schema;
pub mod writer;

/// Text representation used for timestamp columns in the snapshot file.
/// SQLite has no native datetime type.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
