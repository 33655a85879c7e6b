use crate::adapters::object_storage::SNAPSHOT_KEY;
use crate::common::error::{AppError, ServiceResult};
use std::sync::LazyLock;
use tracing::info;

const ASSETS_BASE_URL: &str = "https://assets.ppy.sh";
const SNAPSHOT_PUBLIC_URL: &str = const_str::concat!(ASSETS_BASE_URL, "/", SNAPSHOT_KEY);

static CLIENT: LazyLock<reqwest::Client> = LazyLock::new(reqwest::Client::new);

/// Invalidates the CDN cache entry for the published artifact. A non-2xx
/// response fails the run.
pub async fn purge_snapshot(purge_key: &str) -> ServiceResult<()> {
    let response = CLIENT
        .delete(SNAPSHOT_PUBLIC_URL)
        .bearer_auth(purge_key)
        .send()
        .await?;
    let status = response.status();
    if !status.is_success() {
        return Err(AppError::CachePurgeRejected(status));
    }
    info!("Purged cached snapshot at {SNAPSHOT_PUBLIC_URL}");
    Ok(())
}
