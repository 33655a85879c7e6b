use crate::common::error::ServiceResult;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use std::path::Path;
use tracing::info;

pub const SNAPSHOT_BUCKET: &str = "osu-assets";
pub const SNAPSHOT_KEY: &str = "client-resources/online.db.bz2";

const SNAPSHOT_REGION: &str = "us-east-1";
const SNAPSHOT_CONTENT_TYPE: &str = "application/x-bzip2";

/// Uploads the compressed snapshot to its fixed, publicly readable key.
pub async fn upload_snapshot(
    access_key: &str,
    secret_key: &str,
    archive_path: &Path,
) -> ServiceResult<()> {
    let credentials = Credentials::new(access_key, secret_key, None, None, "onlinedb-generator");
    let config = aws_sdk_s3::Config::builder()
        .credentials_provider(credentials)
        .region(Region::new(SNAPSHOT_REGION))
        .build();
    let client = Client::from_conf(config);

    let body = ByteStream::from_path(archive_path).await?;
    client
        .put_object()
        .bucket(SNAPSHOT_BUCKET)
        .key(SNAPSHOT_KEY)
        .acl(ObjectCannedAcl::PublicRead)
        .content_type(SNAPSHOT_CONTENT_TYPE)
        .body(body)
        .send()
        .await?;
    info!("Uploaded snapshot to s3://{SNAPSHOT_BUCKET}/{SNAPSHOT_KEY}");
    Ok(())
}
