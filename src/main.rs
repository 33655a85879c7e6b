use onlinedb_generator::common::init;
use onlinedb_generator::settings::AppSettings;
use onlinedb_generator::workers::snapshot;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = AppSettings::get();
    init::initialize_logging(settings);
    match snapshot::run(settings).await {
        Ok(()) => Ok(()),
        Err(e) => Err(anyhow::anyhow!("snapshot generation failed: {e}")),
    }
}
