use actix_web::{web, App, HttpServer};
use askdb_api::config::ApiConfig;
use askdb_api::AppState;
use tracing::{info, warn};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let (config, config_path) = ApiConfig::load()?;
    info!(config_path = %config_path.display(), "Loaded configuration");

    if config.anthropic_api_key().is_none() {
        warn!("No Anthropic API key configured; queries will return a credentials error");
    }

    let state = web::Data::new(AppState::from_config(&config)?);

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Starting askdb-api server at http://{}", bind_addr);

    HttpServer::new(move || App::new().app_data(state.clone()).configure(askdb_api::configure))
        .bind(&bind_addr)?
        .run()
        .await?;

    Ok(())
}
