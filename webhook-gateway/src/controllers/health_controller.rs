//! `GET /health` (spec §6, A4): a domain-specific health body, implemented
//! directly rather than through the generic health-indicator plugin.

use std::sync::Arc;

use chrono::Utc;
use r2e_core::prelude::*;
use serde::Serialize;

use crate::config_store::ConfigStore;

#[derive(Controller)]
#[controller(state = crate::state::AppState)]
pub struct HealthController {
    #[inject]
    config_store: Arc<ConfigStore>,
}

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
    version: &'static str,
    webhook_types: Vec<String>,
    timestamp: chrono::DateTime<Utc>,
}

#[routes]
impl HealthController {
    #[get("/health")]
    async fn health(&self) -> JsonResult<HealthBody> {
        let records = self.config_store.list().await?;
        let mut webhook_types: Vec<String> =
            records.into_iter().map(|r| r.service).collect();
        webhook_types.sort();
        webhook_types.dedup();

        Ok(Json(HealthBody {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
            webhook_types,
            timestamp: Utc::now(),
        }))
    }
}
