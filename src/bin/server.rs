use quiz_cms::db::{establish_connection, run_migrations};
use quiz_cms::server::app::run_server;
use quiz_cms::settings::Settings;
use quiz_cms::telemetry::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let settings = Settings::load()?;
    let pool = establish_connection(&settings.db_path).await?;
    run_migrations(&pool).await?;
    run_server(pool.clone(), &settings.listen_addr).await?;
    pool.close().await;
    Ok(())
}
