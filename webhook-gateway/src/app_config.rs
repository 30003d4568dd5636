//! Typed access to the application-configuration file (spec §6), loaded
//! through the framework's `R2eConfig` (YAML + `.env` + `${NAME}`
//! placeholder resolution + environment-variable overlay).

use r2e_core::config::R2eConfig;

use crate::error::GatewayError;

/// Recognised application-configuration keys, with the defaults from
/// spec §6.
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub server_host: String,
    pub server_port: u16,

    pub sink_url: String,
    pub sink_username: String,
    pub sink_password: String,
    pub sink_timeout_seconds: u64,
    pub sink_retry_attempts: u32,

    pub logging_level: String,

    pub webhook_logging_enabled: bool,
    pub webhook_logging_base_directory: String,
    pub webhook_logging_max_bytes: u64,
    pub webhook_logging_backup_count: u32,
    pub webhook_logging_log_file_name: String,

    /// Where the webhook configuration store (C3) keeps its file and
    /// backups. Not part of spec §6's application-config table (that
    /// table only names sink/logging/server keys) but still a recognised
    /// key under the same file, since the store's location must come from
    /// somewhere other than a hard-coded path.
    pub webhook_config_path: String,
    pub webhook_config_backup_dir: String,
}

impl AppSettings {
    pub fn from_config(config: &R2eConfig) -> Result<Self, GatewayError> {
        Ok(Self {
            server_host: config.get_or("server.host", "0.0.0.0".to_string()),
            server_port: config.get_or("server.port", 8000i64) as u16,

            sink_url: config
                .get::<String>("sink.url")
                .map_err(|e| GatewayError::BadConfig(format!("sink.url: {e}")))?,
            sink_username: config
                .get::<String>("sink.username")
                .map_err(|e| GatewayError::BadConfig(format!("sink.username: {e}")))?,
            sink_password: config
                .get::<String>("sink.password")
                .map_err(|e| GatewayError::BadConfig(format!("sink.password: {e}")))?,
            sink_timeout_seconds: config.get_or("sink.timeout_seconds", 30i64) as u64,
            sink_retry_attempts: config.get_or("sink.retry_attempts", 3i64) as u32,

            logging_level: config.get_or("logging.level", "INFO".to_string()),

            webhook_logging_enabled: config.get_or("webhook_logging.enabled", true),
            webhook_logging_base_directory: config
                .get_or("webhook_logging.base_directory", "logs/webhooks".to_string()),
            webhook_logging_max_bytes: config.get_or("webhook_logging.max_bytes", 10_485_760i64) as u64,
            webhook_logging_backup_count: config.get_or("webhook_logging.backup_count", 5i64) as u32,
            webhook_logging_log_file_name: config
                .get_or("webhook_logging.log_file_name", "payload.log".to_string()),

            webhook_config_path: config
                .get_or("webhook_config.path", "config/webhooks.conf".to_string()),
            webhook_config_backup_dir: config
                .get_or("webhook_config.backup_directory", "config/backups".to_string()),
        })
    }
}
