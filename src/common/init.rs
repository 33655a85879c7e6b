use crate::common::state::AppState;
use crate::settings::AppSettings;
use sqlx::mysql::MySqlPoolOptions;
use sqlx::{MySql, Pool};

pub fn initialize_logging(settings: &AppSettings) {
    tracing_subscriber::fmt()
        .with_max_level(settings.level)
        .with_timer(tracing_subscriber::fmt::time())
        .with_level(true)
        .compact()
        .init();
}

pub async fn initialize_state(settings: &AppSettings) -> anyhow::Result<AppState> {
    let db = initialize_db(settings).await?;
    Ok(AppState { db })
}

pub async fn initialize_db(settings: &AppSettings) -> sqlx::Result<Pool<MySql>> {
    MySqlPoolOptions::new()
        .acquire_timeout(settings.db_connect_timeout)
        .max_connections(settings.db_max_connections as _)
        .connect(&settings.database_url())
        .await
}
