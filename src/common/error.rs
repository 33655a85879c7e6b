use reqwest::StatusCode;
use std::fmt;
use tracing::error;

pub type ServiceResult<T> = Result<T, AppError>;

#[track_caller]
pub fn unexpected<T, E: Into<anyhow::Error>>(e: E) -> ServiceResult<T> {
    let caller = std::panic::Location::caller();
    error!("An unexpected error has occurred at {caller}: {}", e.into());
    Err(AppError::Unexpected)
}

#[derive(Debug)]
pub enum AppError {
    Unexpected,

    /// 0: source row count, 1: snapshot row count
    SnapshotCountMismatch(i64, i64),

    CachePurgeRejected(StatusCode),
}

impl<E: Into<anyhow::Error>> From<E> for AppError {
    #[track_caller]
    fn from(e: E) -> Self {
        unexpected::<(), E>(e).unwrap_err()
    }
}

impl AppError {
    pub const fn code(&self) -> &'static str {
        match self {
            AppError::Unexpected => "unexpected",
            AppError::SnapshotCountMismatch(_, _) => "snapshot.count_mismatch",
            AppError::CachePurgeRejected(_) => "publish.cache_purge_rejected",
        }
    }

    pub fn message(&self) -> String {
        match self {
            AppError::Unexpected => "An unexpected error has occurred.".to_owned(),
            AppError::SnapshotCountMismatch(source, snapshot) => format!(
                "Snapshot contains {snapshot} rows but the source reported {source} eligible rows."
            ),
            AppError::CachePurgeRejected(status) => {
                format!("Cache purge request was rejected with status {status}.")
            }
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message(), self.code())
    }
}
