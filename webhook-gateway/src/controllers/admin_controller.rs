//! Administrative surface (C8, spec §4.8): endpoints consumed by the
//! external configuration UI. Thin orchestration over C1–C5; no business
//! logic lives here beyond request/response shaping.

use std::sync::Arc;

use r2e_core::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config_store::ConfigStore;
use crate::extract;
use crate::models::ConfigRecord;
use crate::payload_log::PayloadLogger;
use crate::template;
use crate::token_mint;

const ANALYZE_MAX_DEPTH: usize = 3;

#[derive(Controller)]
#[controller(path = "/api", state = crate::state::AppState)]
pub struct AdminController {
    #[inject]
    config_store: Arc<ConfigStore>,
    #[inject]
    payload_logger: Arc<PayloadLogger>,
}

#[derive(Deserialize)]
struct SaveConfigRequest {
    service: String,
    fields: String,
    template: String,
    #[serde(default)]
    alignment: String,
    #[serde(default)]
    token: Option<String>,
}

#[derive(Deserialize)]
struct AnalyzePayloadRequest {
    payload: Value,
    #[serde(default)]
    #[allow(dead_code)]
    webhook_type: Option<String>,
}

#[derive(Serialize)]
struct LeafInfo {
    path: String,
    #[serde(rename = "type")]
    value_type: &'static str,
}

#[derive(Deserialize)]
struct TestConfigRequest {
    fields: String,
    template: String,
    payload: Value,
}

#[derive(Serialize)]
struct TestConfigResponse {
    rendered: String,
    extracted: std::collections::BTreeMap<String, Value>,
}

#[derive(Serialize)]
struct GeneratedToken {
    token: String,
}

#[routes]
impl AdminController {
    #[get("/configs")]
    async fn list_configs(&self) -> JsonResult<Vec<ConfigRecord>> {
        Ok(Json(self.config_store.list().await?))
    }

    #[get("/config/{service}/{token}")]
    async fn get_config(&self, Path((service, token)): Path<(String, String)>) -> JsonResult<ConfigRecord> {
        Ok(Json(self.config_store.resolve(&service, &token).await?))
    }

    #[post("/save-config")]
    async fn save_config(&self, Json(body): Json<SaveConfigRequest>) -> JsonResult<ConfigRecord> {
        let alignment = body
            .alignment
            .parse()
            .map_err(|_| crate::error::GatewayError::BadConfig(format!("invalid alignment: {}", body.alignment)))?;

        let record = match body.token {
            Some(token) => {
                self.config_store
                    .update(&body.service, &token, body.fields, body.template, alignment)
                    .await?
            }
            None => {
                let token = token_mint::mint(&self.config_store).await?;
                self.config_store
                    .create(body.service, token, body.fields, body.template, alignment)
                    .await?
            }
        };
        Ok(Json(record))
    }

    #[delete("/config/{service}/{token}")]
    async fn delete_config(&self, Path((service, token)): Path<(String, String)>) -> StatusResult {
        let was_last = self.config_store.delete(&service, &token).await?;
        if was_last {
            self.payload_logger.remove_service_dir(&service).await?;
        }
        Ok(StatusCode::NO_CONTENT)
    }

    #[post("/analyze-payload")]
    async fn analyze_payload(&self, Json(body): Json<AnalyzePayloadRequest>) -> JsonResult<Vec<LeafInfo>> {
        let mut leaves = Vec::new();
        collect_leaves(&body.payload, String::new(), 0, &mut leaves);
        Ok(Json(leaves))
    }

    #[post("/test-config")]
    async fn test_config(&self, Json(body): Json<TestConfigRequest>) -> JsonResult<TestConfigResponse> {
        let patterns = extract::parse_fields(&body.fields)?;
        let map = extract::extract(&body.payload, &patterns);
        let rendered = template::render(&body.template, &map)?;
        let extracted = map
            .into_iter()
            .map(|(k, v)| (k, serde_json::to_value(&v).unwrap_or(Value::Null)))
            .collect();
        Ok(Json(TestConfigResponse { rendered, extracted }))
    }

    #[get("/generate-token")]
    async fn generate_token(&self) -> JsonResult<GeneratedToken> {
        let token = token_mint::mint(&self.config_store).await?;
        Ok(Json(GeneratedToken { token }))
    }

    #[get("/webhook-logs/types")]
    async fn webhook_log_types(&self) -> JsonResult<Vec<String>> {
        Ok(Json(self.payload_logger.list_service_types().await?))
    }

    #[get("/webhook-logs/{service}/recent")]
    async fn webhook_log_recent(
        &self,
        Path(service): Path<String>,
        Query(params): Query<RecentParams>,
    ) -> JsonResult<Vec<crate::models::PayloadLogRecord>> {
        let limit = params.limit.unwrap_or(50);
        Ok(Json(self.payload_logger.recent(&service, limit).await?))
    }
}

#[derive(Deserialize)]
pub struct RecentParams {
    limit: Option<usize>,
}

/// Walk `value` up to `ANALYZE_MAX_DEPTH` object levels, recording the
/// dotted path and inferred type of every leaf (or of a node truncated at
/// the depth bound). Arrays are inspected through their first element and
/// do not themselves consume a depth level, since fan-out is irrelevant to
/// advisory field discovery.
fn collect_leaves(value: &Value, path: String, depth: usize, out: &mut Vec<LeafInfo>) {
    match value {
        Value::Object(map) if depth < ANALYZE_MAX_DEPTH => {
            for (key, child) in map {
                let next_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                collect_leaves(child, next_path, depth + 1, out);
            }
        }
        Value::Array(items) if depth < ANALYZE_MAX_DEPTH => match items.first() {
            Some(first) => collect_leaves(first, path, depth, out),
            None => out.push(LeafInfo { path, value_type: "array" }),
        },
        other => out.push(LeafInfo {
            path,
            value_type: value_type_name(other),
        }),
    }
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
