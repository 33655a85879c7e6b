use crate::adapters::{cache_purge, object_storage};
use crate::common::error::ServiceResult;
use crate::settings::AppSettings;
use bzip2::Compression;
use bzip2::write::BzEncoder;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

/// Compresses the finished snapshot and, when credentials are configured,
/// uploads it and purges the CDN cache entry. Missing credentials are not
/// an error; the run is then local-only.
pub async fn publish_snapshot(settings: &AppSettings, snapshot_path: &Path) -> ServiceResult<()> {
    let archive_path = compress_snapshot(snapshot_path)?;

    let (access_key, secret_key) = match (
        settings.aws_access_key_id.as_deref(),
        settings.aws_secret_access_key.as_deref(),
    ) {
        (Some(access_key), Some(secret_key)) => (access_key, secret_key),
        _ => {
            info!("No object storage credentials present, skipping upload");
            return Ok(());
        }
    };
    object_storage::upload_snapshot(access_key, secret_key, &archive_path).await?;

    match settings.cache_purge_key.as_deref() {
        Some(purge_key) => cache_purge::purge_snapshot(purge_key).await,
        None => {
            info!("No cache purge key present, skipping purge");
            Ok(())
        }
    }
}

/// Stream-compresses the snapshot into a sibling `.bz2` file and returns
/// the archive path.
pub fn compress_snapshot(snapshot_path: &Path) -> ServiceResult<PathBuf> {
    let archive_path = archive_path_for(snapshot_path);
    let mut input = File::open(snapshot_path)?;
    let output = File::create(&archive_path)?;
    let mut encoder = BzEncoder::new(output, Compression::best());
    let bytes = io::copy(&mut input, &mut encoder)?;
    encoder.finish()?;
    info!(
        bytes,
        archive = %archive_path.display(),
        "Compressed snapshot artifact"
    );
    Ok(archive_path)
}

fn archive_path_for(snapshot_path: &Path) -> PathBuf {
    let mut path = snapshot_path.as_os_str().to_owned();
    path.push(".bz2");
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bzip2::read::BzDecoder;
    use std::io::{Read, Write};

    #[test]
    fn archive_path_appends_the_compression_suffix() {
        assert_eq!(
            archive_path_for(Path::new("data/online.db")),
            PathBuf::from("data/online.db.bz2")
        );
    }

    #[test]
    fn compressed_artifact_decompresses_to_the_original_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("online.db");
        let payload: Vec<u8> = (0..64 * 1024).map(|i| (i % 251) as u8).collect();
        File::create(&path).unwrap().write_all(&payload).unwrap();

        let archive_path = compress_snapshot(&path).unwrap();
        assert_eq!(archive_path, dir.path().join("online.db.bz2"));

        let mut decoded = Vec::new();
        BzDecoder::new(File::open(&archive_path).unwrap())
            .read_to_end(&mut decoded)
            .unwrap();
        assert_eq!(decoded, payload);
    }
}
