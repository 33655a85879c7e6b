use crate::common::error::ServiceResult;
use crate::common::init;
use crate::settings::AppSettings;
use crate::snapshot::writer::SnapshotWriter;
use crate::usecases::{publish, snapshot};
use std::time::Instant;
use tracing::info;

/// One full snapshot run: schema creation, copy, verification, compression
/// and (when configured) publishing, strictly in sequence. Any stage error
/// aborts the run and surfaces as a non-zero process exit.
pub async fn run(settings: &AppSettings) -> ServiceResult<()> {
    let started = Instant::now();
    let version = settings.schema_version;
    let batch_size = settings.batch_size.unwrap_or(version.batch_size());
    info!(
        ?version,
        batch_size,
        path = %settings.snapshot_path.display(),
        "Starting snapshot generation"
    );

    let ctx = init::initialize_state(settings).await?;
    let writer = SnapshotWriter::create(&settings.snapshot_path, version).await?;

    snapshot::copy_beatmaps(&ctx, &writer, version, batch_size).await?;
    if version.includes_beatmapsets() {
        snapshot::copy_beatmapsets(&ctx, &writer, batch_size).await?;
    }
    let snapshot_path = writer.close().await;

    publish::publish_snapshot(settings, &snapshot_path).await?;

    info!("Snapshot generation completed in {:?}", started.elapsed());
    Ok(())
}
