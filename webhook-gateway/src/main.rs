use std::sync::Arc;

use r2e_core::builder::AppBuilder;
use r2e_core::config::R2eConfig;
use r2e_core::plugins::Tracing;

use webhook_gateway::app_config::AppSettings;
use webhook_gateway::config_store::ConfigStore;
use webhook_gateway::controllers::{AdminController, HealthController, WebhookController};
use webhook_gateway::payload_log::PayloadLogger;
use webhook_gateway::sink::SinkClient;
use webhook_gateway::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let profile = std::env::var("R2E_PROFILE").unwrap_or_else(|_| "dev".to_string());
    let config = R2eConfig::load(&profile)?;
    let settings = Arc::new(AppSettings::from_config(&config)?);

    let config_store = Arc::new(ConfigStore::new(
        settings.webhook_config_path.clone(),
        settings.webhook_config_backup_dir.clone(),
    ));
    let payload_logger = Arc::new(PayloadLogger::new(
        settings.webhook_logging_base_directory.clone(),
        settings.webhook_logging_max_bytes,
        settings.webhook_logging_backup_count,
        settings.webhook_logging_log_file_name.clone(),
        settings.webhook_logging_enabled,
    ));
    let sink_client = Arc::new(SinkClient::new(
        settings.sink_url.clone(),
        settings.sink_username.clone(),
        settings.sink_password.clone(),
        settings.sink_timeout_seconds,
        settings.sink_retry_attempts,
    )?);

    let state = AppState {
        config_store,
        payload_logger,
        sink_client,
        settings: settings.clone(),
    };

    let addr = format!("{}:{}", settings.server_host, settings.server_port);

    AppBuilder::new()
        .with_state(state)
        .with(Tracing)
        .register_controller::<WebhookController>()
        .register_controller::<AdminController>()
        .register_controller::<HealthController>()
        .serve(&addr)
        .await
}
