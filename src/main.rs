// src/main.rs
use stowage_advisor::{api, config::AppConfig, telemetry};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let dotenv_result = dotenvy::dotenv();
    telemetry::init();
    if let Err(err) = dotenv_result {
        if !matches!(err, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            warn!("⚠️ Could not load .env: {}", err);
        }
    }

    let app_config = AppConfig::from_env();
    let api_config = app_config.api.clone();
    let engine_config = app_config.engine.engine_config();

    info!("🚀 Stowage advisor starting...");
    if let Err(err) = api::start_api_server(api_config, engine_config).await {
        error!("❌ API server terminated with an error: {}", err);
        std::process::exit(1);
    }
}
