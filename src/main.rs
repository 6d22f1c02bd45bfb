use anyhow::Result;
use log::{error, info, warn};
use pixel_tracker::security::AdminGate;
use pixel_tracker::{Config, DatabaseService, RestApi};

async fn run_app() -> Result<()> {
    let config = Config::from_env()?;

    // RUST_LOG still takes precedence over the configured level
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.api.log_level.as_str()),
    )
    .init();

    info!("Starting pixel tracker");
    info!(
        "Configuration loaded: listening on {}:{}, database {:?}",
        config.api.address, config.api.port, config.database.path
    );

    let database = DatabaseService::new(&config.database).await?;
    if !database.health_check().await? {
        warn!("Database health check failed; requests may fail until storage recovers");
    }

    let admin_gate = AdminGate::new(config.security.clone());
    if admin_gate.is_placeholder() {
        warn!("ADMIN_TOKEN is not set or left as default. Set ADMIN_TOKEN in environment for security.");
    }

    let http_server = RestApi::new(&config.api, database.pool.clone(), admin_gate);
    http_server.run().await?;

    database.pool.close().await;
    info!("Shutdown complete");

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(e) = run_app().await {
        error!("Application error: {:#}", e);
        eprintln!("Application error: {:#}", e);
        std::process::exit(1);
    }
}
