use crate::common::context::Context;
use crate::common::error::{AppError, ServiceResult};
use crate::entities::beatmaps::BeatmapRecord;
use crate::entities::beatmapsets::BeatmapSetRecord;
use crate::repositories;
use crate::snapshot::schema::SchemaVersion;
use crate::snapshot::writer::SnapshotWriter;
use futures::{Stream, TryStreamExt};
use tracing::{debug, info};

/// Copies every eligible beatmap from the source into the snapshot.
///
/// The source count is taken up front for progress reporting and, on
/// versions that verify, compared against the snapshot after the copy.
pub async fn copy_beatmaps<C: Context>(
    ctx: &C,
    writer: &SnapshotWriter,
    version: SchemaVersion,
    batch_size: usize,
) -> ServiceResult<u64> {
    let expected = repositories::beatmaps::count_eligible(ctx, version).await?;
    info!(expected, "Copying eligible beatmaps into the snapshot");

    let rows = repositories::beatmaps::stream_eligible(ctx, version);
    let copied = load_beatmaps(rows, writer, batch_size).await?;

    if version.verifies_counts() {
        verify_beatmap_count(writer, expected).await?;
    }
    info!(copied, "Finished copying beatmaps");
    Ok(copied)
}

pub async fn copy_beatmapsets<C: Context>(
    ctx: &C,
    writer: &SnapshotWriter,
    batch_size: usize,
) -> ServiceResult<u64> {
    let expected = repositories::beatmapsets::count_eligible(ctx).await?;
    info!(expected, "Copying eligible beatmapsets into the snapshot");

    let mut rows = repositories::beatmapsets::stream_eligible(ctx);
    let batch_size = batch_size.max(1);
    let mut batch: Vec<BeatmapSetRecord> = Vec::with_capacity(batch_size);
    let mut copied = 0;
    while let Some(row) = rows.try_next().await? {
        batch.push(row);
        if batch.len() >= batch_size {
            copied += writer.insert_beatmapsets(&batch).await?;
            batch.clear();
        }
    }
    if !batch.is_empty() {
        copied += writer.insert_beatmapsets(&batch).await?;
    }
    info!(copied, "Finished copying beatmapsets");
    Ok(copied)
}

/// Drains the row stream into multi-row inserts of `batch_size` rows,
/// flushing the remainder at the end. At most one insert is in flight.
pub async fn load_beatmaps<S>(
    mut rows: S,
    writer: &SnapshotWriter,
    batch_size: usize,
) -> ServiceResult<u64>
where
    S: Stream<Item = sqlx::Result<BeatmapRecord>> + Unpin,
{
    let batch_size = batch_size.max(1);
    let mut batch: Vec<BeatmapRecord> = Vec::with_capacity(batch_size);
    let mut copied = 0;
    while let Some(row) = rows.try_next().await? {
        batch.push(row);
        if batch.len() >= batch_size {
            copied += writer.insert_beatmaps(&batch).await?;
            debug!(copied, "Inserted beatmap batch");
            batch.clear();
        }
    }
    if !batch.is_empty() {
        copied += writer.insert_beatmaps(&batch).await?;
        debug!(copied, "Inserted final beatmap batch");
    }
    Ok(copied)
}

pub async fn verify_beatmap_count(writer: &SnapshotWriter, expected: i64) -> ServiceResult<()> {
    let actual = writer.count_beatmaps().await?;
    if actual != expected {
        return Err(AppError::SnapshotCountMismatch(expected, actual));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::schema::SchemaVersion;
    use chrono::NaiveDate;
    use futures::stream;

    fn beatmap(beatmap_id: i32) -> BeatmapRecord {
        BeatmapRecord {
            beatmap_id,
            beatmapset_id: Some(beatmap_id / 4),
            user_id: 100,
            filename: Some(format!("{beatmap_id}.osu")),
            checksum: None,
            version: "Normal".to_owned(),
            total_length: 90,
            hit_length: 80,
            count_total: 200,
            count_normal: 150,
            count_slider: 45,
            count_spinner: 5,
            diff_drain: 5.0,
            diff_size: 4.0,
            diff_overall: 7.0,
            diff_approach: 8.0,
            playmode: 0,
            approved: 1,
            last_update: NaiveDate::from_ymd_opt(2024, 6, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            difficultyrating: 3.5,
            playcount: 10,
            passcount: 5,
            orphaned: false,
            youtube_preview: None,
            score_version: 1,
            deleted_at: None,
            bpm: None,
        }
    }

    async fn temp_writer() -> (tempfile::TempDir, SnapshotWriter) {
        let dir = tempfile::tempdir().unwrap();
        let writer = SnapshotWriter::create(&dir.path().join("online.db"), SchemaVersion::V2)
            .await
            .unwrap();
        (dir, writer)
    }

    #[tokio::test]
    async fn a_partial_final_batch_inserts_exactly_the_remainder() {
        let (_dir, writer) = temp_writer().await;
        let rows = stream::iter((1..=44).map(|id| Ok(beatmap(id))));

        let copied = load_beatmaps(rows, &writer, 18).await.unwrap();
        assert_eq!(copied, 44);
        assert_eq!(writer.count_beatmaps().await.unwrap(), 44);

        let ids: Vec<i32> =
            sqlx::query_scalar("SELECT beatmap_id FROM osu_beatmaps ORDER BY beatmap_id")
                .fetch_all(writer.db())
                .await
                .unwrap();
        assert_eq!(ids, (1..=44).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn an_empty_source_produces_an_empty_valid_snapshot() {
        let (_dir, writer) = temp_writer().await;
        let rows = stream::iter(std::iter::empty::<sqlx::Result<BeatmapRecord>>());

        let copied = load_beatmaps(rows, &writer, 18).await.unwrap();
        assert_eq!(copied, 0);
        assert_eq!(writer.count_beatmaps().await.unwrap(), 0);
        verify_beatmap_count(&writer, 0).await.unwrap();
    }

    #[tokio::test]
    async fn single_row_batches_copy_everything() {
        let (_dir, writer) = temp_writer().await;
        let rows = stream::iter((1..=5).map(|id| Ok(beatmap(id))));
        assert_eq!(load_beatmaps(rows, &writer, 1).await.unwrap(), 5);
        assert_eq!(writer.count_beatmaps().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn rerunning_the_copy_yields_an_identical_row_set() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("online.db");

        let mut row_sets = Vec::new();
        for _ in 0..2 {
            let writer = SnapshotWriter::create(&path, SchemaVersion::V2).await.unwrap();
            let rows = stream::iter((1..=44).map(|id| Ok(beatmap(id))));
            load_beatmaps(rows, &writer, 18).await.unwrap();
            let rows: Vec<(i32, String, String)> = sqlx::query_as(
                "SELECT beatmap_id, filename, last_update FROM osu_beatmaps ORDER BY beatmap_id",
            )
            .fetch_all(writer.db())
            .await
            .unwrap();
            row_sets.push(rows);
            writer.close().await;
        }
        assert_eq!(row_sets[0], row_sets[1]);
    }

    #[tokio::test]
    async fn a_dropped_row_is_reported_with_both_counts() {
        let (_dir, writer) = temp_writer().await;
        let rows = stream::iter((1..=3).map(|id| Ok(beatmap(id))));
        load_beatmaps(rows, &writer, 18).await.unwrap();

        let err = verify_beatmap_count(&writer, 4).await.unwrap_err();
        match err {
            AppError::SnapshotCountMismatch(source, snapshot) => {
                assert_eq!(source, 4);
                assert_eq!(snapshot, 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn a_source_read_error_aborts_the_copy() {
        let (_dir, writer) = temp_writer().await;
        let rows = stream::iter(vec![
            Ok(beatmap(1)),
            Err(sqlx::Error::RowNotFound),
            Ok(beatmap(2)),
        ]);
        assert!(load_beatmaps(rows, &writer, 18).await.is_err());
    }
}
