//! Application state shared across every controller.

use std::sync::Arc;

use r2e_core::prelude::BeanState;

use crate::app_config::AppSettings;
use crate::config_store::ConfigStore;
use crate::payload_log::PayloadLogger;
use crate::sink::SinkClient;

/// Constructed once in `main` and installed via `AppBuilder::with_state`
/// (the framework's backward-compatible path, bypassing the bean graph —
/// every dependency here is wired by hand, not resolved through DI).
#[derive(Clone, BeanState)]
pub struct AppState {
    pub config_store: Arc<ConfigStore>,
    pub payload_logger: Arc<PayloadLogger>,
    pub sink_client: Arc<SinkClient>,
    pub settings: Arc<AppSettings>,
}
