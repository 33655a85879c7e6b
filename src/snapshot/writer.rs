use crate::entities::beatmaps::BeatmapRecord;
use crate::entities::beatmapsets::BeatmapSetRecord;
use crate::snapshot::{TIMESTAMP_FORMAT, schema};
use chrono::NaiveDateTime;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, QueryBuilder, Sqlite};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::info;

const INSERT_BEATMAPS: &str = "INSERT INTO osu_beatmaps (beatmap_id, beatmapset_id, user_id, \
    filename, checksum, version, total_length, hit_length, countTotal, countNormal, \
    countSlider, countSpinner, diff_drain, diff_size, diff_overall, diff_approach, \
    playmode, approved, last_update, difficultyrating, playcount, passcount, orphaned, \
    youtube_preview, score_version, deleted_at, bpm) ";

const INSERT_BEATMAPSETS: &str =
    "INSERT INTO osu_beatmapsets (beatmapset_id, approved, approved_date, submit_date) ";

fn timestamp_text(timestamp: &NaiveDateTime) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// Exclusive handle to the snapshot file being built.
///
/// Creating a writer wipes any previous file at the path, so every run
/// starts from a clean slate. Batches are committed independently; a
/// partially written file from an aborted run is simply rebuilt next time.
pub struct SnapshotWriter {
    db: Pool<Sqlite>,
    path: PathBuf,
}

impl SnapshotWriter {
    pub async fn create(path: &Path, version: schema::SchemaVersion) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        match fs::remove_file(path) {
            Ok(()) => info!(path = %path.display(), "Removed previous snapshot file"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let db = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        schema::create_schema(&db, version).await?;

        Ok(Self {
            db,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[cfg(test)]
    pub(crate) fn db(&self) -> &Pool<Sqlite> {
        &self.db
    }

    /// Inserts one batch of beatmaps as a single multi-row statement.
    /// A duplicate beatmap_id fails the whole batch.
    pub async fn insert_beatmaps(&self, batch: &[BeatmapRecord]) -> sqlx::Result<u64> {
        if batch.is_empty() {
            return Ok(0);
        }
        let mut query = QueryBuilder::<Sqlite>::new(INSERT_BEATMAPS);
        query.push_values(batch, |mut row, map| {
            row.push_bind(map.beatmap_id)
                .push_bind(map.beatmapset_id)
                .push_bind(map.user_id)
                .push_bind(map.filename.clone())
                .push_bind(map.checksum.clone())
                .push_bind(map.version.clone())
                .push_bind(map.total_length)
                .push_bind(map.hit_length)
                .push_bind(map.count_total)
                .push_bind(map.count_normal)
                .push_bind(map.count_slider)
                .push_bind(map.count_spinner)
                .push_bind(map.diff_drain)
                .push_bind(map.diff_size)
                .push_bind(map.diff_overall)
                .push_bind(map.diff_approach)
                .push_bind(map.playmode)
                .push_bind(map.approved)
                .push_bind(timestamp_text(&map.last_update))
                .push_bind(map.difficultyrating)
                .push_bind(map.playcount)
                .push_bind(map.passcount)
                .push_bind(map.orphaned)
                .push_bind(map.youtube_preview.clone())
                .push_bind(map.score_version)
                .push_bind(map.deleted_at.as_ref().map(timestamp_text))
                .push_bind(map.bpm);
        });
        let result = query.build().execute(&self.db).await?;
        Ok(result.rows_affected())
    }

    pub async fn insert_beatmapsets(&self, batch: &[BeatmapSetRecord]) -> sqlx::Result<u64> {
        if batch.is_empty() {
            return Ok(0);
        }
        let mut query = QueryBuilder::<Sqlite>::new(INSERT_BEATMAPSETS);
        query.push_values(batch, |mut row, set| {
            row.push_bind(set.beatmapset_id)
                .push_bind(set.approved)
                .push_bind(set.approved_date.as_ref().map(timestamp_text))
                .push_bind(set.submit_date.as_ref().map(timestamp_text));
        });
        let result = query.build().execute(&self.db).await?;
        Ok(result.rows_affected())
    }

    pub async fn count_beatmaps(&self) -> sqlx::Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM osu_beatmaps")
            .fetch_one(&self.db)
            .await
    }

    pub async fn count_beatmapsets(&self) -> sqlx::Result<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM osu_beatmapsets")
            .fetch_one(&self.db)
            .await
    }

    /// Flushes the pool and releases the file, returning its path.
    pub async fn close(self) -> PathBuf {
        self.db.close().await;
        self.path
    }
}
