use crate::common::env::FromEnv;
use crate::snapshot::schema::SchemaVersion;
use std::env;
use std::ops::Deref;
use std::path::PathBuf;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::Level;

pub struct AppSettings {
    pub level: Level,

    pub mysql_host: String,
    pub mysql_user: String,
    pub mysql_password: String,
    pub mysql_database: String,
    pub db_max_connections: usize,
    pub db_connect_timeout: Duration,

    pub snapshot_path: PathBuf,
    pub schema_version: SchemaVersion,
    pub batch_size: Option<usize>,

    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    pub cache_purge_key: Option<String>,
}

impl AppSettings {
    pub fn load_from_env() -> anyhow::Result<Self> {
        let _ = dotenv::dotenv();

        let level = Level::from_env_or("LOG_LEVEL", Level::INFO)?;

        let mysql_host = String::from_env_or("MYSQL_HOST", "localhost".to_owned())?;
        let mysql_user = String::from_env_or("MYSQL_USER", "root".to_owned())?;
        let mysql_password = String::from_env_or("MYSQL_PASSWORD", String::new())?;
        let mysql_database = String::from_env_or("MYSQL_DATABASE", "osu".to_owned())?;
        let db_max_connections = usize::from_env_or("DB_MAX_CONNECTIONS", 2)?;
        let db_connect_timeout_secs = u64::from_env_or("DB_CONNECT_TIMEOUT_SECS", 5)?;
        let db_connect_timeout = Duration::from_secs(db_connect_timeout_secs);

        let snapshot_path = PathBuf::from_env_or("SNAPSHOT_PATH", "data/online.db".into())?;
        let schema_version = match env::var("SNAPSHOT_SCHEMA_VERSION") {
            Ok(value) => SchemaVersion::parse(&value)?,
            Err(env::VarError::NotPresent) => SchemaVersion::V2,
            Err(e) => return Err(e.into()),
        };
        let batch_size = match env::var("SNAPSHOT_BATCH_SIZE") {
            Ok(value) => Some(value.parse()?),
            Err(env::VarError::NotPresent) => None,
            Err(e) => return Err(e.into()),
        };

        let aws_access_key_id = env::var("AWS_ACCESS_KEY_ID").ok();
        let aws_secret_access_key = env::var("AWS_SECRET_ACCESS_KEY").ok();
        if aws_access_key_id.is_some() && aws_secret_access_key.is_none() {
            anyhow::bail!("AWS_ACCESS_KEY_ID is set but AWS_SECRET_ACCESS_KEY is missing");
        }
        let cache_purge_key = env::var("CACHE_PURGE_KEY").ok();

        Ok(AppSettings {
            level,

            mysql_host,
            mysql_user,
            mysql_password,
            mysql_database,
            db_max_connections,
            db_connect_timeout,

            snapshot_path,
            schema_version,
            batch_size,

            aws_access_key_id,
            aws_secret_access_key,
            cache_purge_key,
        })
    }

    pub fn database_url(&self) -> String {
        format!(
            "mysql://{}:{}@{}/{}",
            self.mysql_user, self.mysql_password, self.mysql_host, self.mysql_database
        )
    }

    pub fn get() -> &'static AppSettings {
        settings()
    }
}

pub fn settings() -> &'static AppSettings {
    static SETTINGS: LazyLock<AppSettings> =
        LazyLock::new(|| AppSettings::load_from_env().expect("Failed to load settings"));
    SETTINGS.deref()
}
