use sqlx::{Pool, Sqlite};

/// Which generation of the online.db layout to produce.
///
/// The table set, eligibility filter and insert batch size all hang off
/// this one choice; there are no other per-version code paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaVersion {
    /// Legacy layout: beatmaps plus a beatmapsets table, single-row inserts,
    /// no post-copy verification.
    V1,
    /// Current layout: beatmaps only, 18-row inserts, row counts verified
    /// after the copy.
    V2,
}

pub const FILTER_RANKED_OR_APPROVED: &str = "approved IN (1, 2)";
pub const FILTER_RANKED_NOT_DELETED: &str = "approved > 0 AND deleted_at IS NULL";

impl SchemaVersion {
    pub fn parse(value: &str) -> anyhow::Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "v1" | "1" => Ok(SchemaVersion::V1),
            "v2" | "2" => Ok(SchemaVersion::V2),
            other => anyhow::bail!("Unknown snapshot schema version: {other}"),
        }
    }

    pub const fn beatmap_filter(self) -> &'static str {
        match self {
            SchemaVersion::V1 => FILTER_RANKED_OR_APPROVED,
            SchemaVersion::V2 => FILTER_RANKED_NOT_DELETED,
        }
    }

    pub const fn includes_beatmapsets(self) -> bool {
        matches!(self, SchemaVersion::V1)
    }

    pub const fn batch_size(self) -> usize {
        match self {
            SchemaVersion::V1 => 1,
            SchemaVersion::V2 => 18,
        }
    }

    pub const fn verifies_counts(self) -> bool {
        matches!(self, SchemaVersion::V2)
    }
}

// The snapshot layout is maintained by hand rather than reflected off the
// source schema, so an unexpected source column can never leak into the
// artifact unnoticed.
const CREATE_BEATMAPS_TABLE: &str = r#"
CREATE TABLE osu_beatmaps (
    beatmap_id INTEGER NOT NULL PRIMARY KEY,
    beatmapset_id INTEGER,
    user_id INTEGER NOT NULL,
    filename TEXT,
    checksum TEXT,
    version TEXT NOT NULL,
    total_length INTEGER NOT NULL,
    hit_length INTEGER NOT NULL,
    countTotal INTEGER NOT NULL,
    countNormal INTEGER NOT NULL,
    countSlider INTEGER NOT NULL,
    countSpinner INTEGER NOT NULL,
    diff_drain REAL NOT NULL,
    diff_size REAL NOT NULL,
    diff_overall REAL NOT NULL,
    diff_approach REAL NOT NULL,
    playmode INTEGER NOT NULL,
    approved INTEGER NOT NULL,
    last_update TEXT NOT NULL,
    difficultyrating REAL NOT NULL,
    playcount INTEGER NOT NULL,
    passcount INTEGER NOT NULL,
    orphaned INTEGER NOT NULL,
    youtube_preview TEXT,
    score_version INTEGER NOT NULL,
    deleted_at TEXT,
    bpm REAL
)"#;

const CREATE_BEATMAPSETS_TABLE: &str = r#"
CREATE TABLE osu_beatmapsets (
    beatmapset_id INTEGER NOT NULL PRIMARY KEY,
    approved INTEGER NOT NULL,
    approved_date TEXT,
    submit_date TEXT
)"#;

const BEATMAP_INDEXES: &[&str] = &[
    "CREATE INDEX idx_beatmaps_beatmapset_id ON osu_beatmaps (beatmapset_id)",
    "CREATE INDEX idx_beatmaps_filename ON osu_beatmaps (filename)",
    "CREATE INDEX idx_beatmaps_checksum ON osu_beatmaps (checksum)",
    "CREATE INDEX idx_beatmaps_user_id ON osu_beatmaps (user_id)",
];

/// Creates the version's table set in an empty snapshot database.
/// Any DDL failure is fatal for the run.
pub async fn create_schema(db: &Pool<Sqlite>, version: SchemaVersion) -> sqlx::Result<()> {
    sqlx::query(CREATE_BEATMAPS_TABLE).execute(db).await?;
    for index in BEATMAP_INDEXES {
        sqlx::query(index).execute(db).await?;
    }
    if version.includes_beatmapsets() {
        sqlx::query(CREATE_BEATMAPSETS_TABLE).execute(db).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::Row;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn memory_pool() -> Pool<Sqlite> {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    async fn table_names(db: &Pool<Sqlite>) -> Vec<String> {
        sqlx::query("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .fetch_all(db)
            .await
            .unwrap()
            .into_iter()
            .map(|row| row.get::<String, _>(0))
            .collect()
    }

    #[tokio::test]
    async fn v2_creates_only_the_beatmaps_table() {
        let db = memory_pool().await;
        create_schema(&db, SchemaVersion::V2).await.unwrap();
        assert_eq!(table_names(&db).await, vec!["osu_beatmaps"]);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM osu_beatmaps")
            .fetch_one(&db)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn v1_creates_both_tables() {
        let db = memory_pool().await;
        create_schema(&db, SchemaVersion::V1).await.unwrap();
        assert_eq!(table_names(&db).await, vec!["osu_beatmaps", "osu_beatmapsets"]);
    }

    #[tokio::test]
    async fn secondary_indexes_exist() {
        let db = memory_pool().await;
        create_schema(&db, SchemaVersion::V2).await.unwrap();
        let indexes: Vec<String> = sqlx::query(
            "SELECT name FROM sqlite_master WHERE type = 'index' AND name LIKE 'idx_%' ORDER BY name",
        )
        .fetch_all(&db)
        .await
        .unwrap()
        .into_iter()
        .map(|row| row.get::<String, _>(0))
        .collect();
        assert_eq!(
            indexes,
            vec![
                "idx_beatmaps_beatmapset_id",
                "idx_beatmaps_checksum",
                "idx_beatmaps_filename",
                "idx_beatmaps_user_id",
            ]
        );
    }

    #[test]
    fn version_parsing() {
        assert_eq!(SchemaVersion::parse("v1").unwrap(), SchemaVersion::V1);
        assert_eq!(SchemaVersion::parse("V2").unwrap(), SchemaVersion::V2);
        assert_eq!(SchemaVersion::parse("2").unwrap(), SchemaVersion::V2);
        assert!(SchemaVersion::parse("v3").is_err());
    }
}
