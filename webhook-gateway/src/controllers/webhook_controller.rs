//! `POST /webhook/{service}/{token}` (C7, spec §4.7): the ingestion path.
//!
//! RECEIVED → RESOLVED → RENDERED → COMPLETED. Every failure past
//! resolution is reported as 200 with a failure body (the webhook was
//! accepted; retrying it would not help) — only an unknown `(service,
//! token)` pair responds 404.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use r2e_core::prelude::*;
use r2e_core::http::{Bytes, ConnectInfo, USER_AGENT};
use serde::Serialize;

use crate::config_store::ConfigStore;
use crate::extract;
use crate::models::{PayloadLogRecord, ProcessingStatus, SinkMessage};
use crate::payload_log::PayloadLogger;
use crate::sink::SinkClient;
use crate::template;

const PROCESSING_BUDGET_SECONDS: u64 = 30;

#[derive(Controller)]
#[controller(state = crate::state::AppState)]
pub struct WebhookController {
    #[inject]
    config_store: Arc<ConfigStore>,
    #[inject]
    payload_logger: Arc<PayloadLogger>,
    #[inject]
    sink_client: Arc<SinkClient>,
}

#[derive(Serialize)]
struct WebhookResponse {
    status: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    generated_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    service_token: Option<String>,
}

#[routes]
impl WebhookController {
    #[post("/webhook/{service}/{token}")]
    async fn ingest(
        &self,
        Path((service, token)): Path<(String, String)>,
        connect_info: Option<ConnectInfo<SocketAddr>>,
        headers: HeaderMap,
        body: Bytes,
    ) -> ApiResult<Json<WebhookResponse>> {
        let service = service.to_lowercase();
        let token = token.to_lowercase();

        // NotFound is the one GatewayError kind this handler lets through
        // as a real HTTP error — everything past resolution is reported in
        // the 200 body instead.
        let record = self.config_store.resolve(&service, &token).await?;

        let source_ip = connect_info.map(|ConnectInfo(addr)| addr.ip().to_string());
        let user_agent = headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let content_length = if body.is_empty() { None } else { Some(body.len()) };

        if body.is_empty() {
            return Ok(Json(WebhookResponse {
                status: "accepted",
                message: "empty payload accepted".into(),
                generated_message: None,
                service_token: None,
            }));
        }

        let payload: serde_json::Value = match serde_json::from_slice(&body) {
            Ok(v) => v,
            Err(_) => {
                return Ok(Json(WebhookResponse {
                    status: "accepted",
                    message: "non-JSON payload accepted".into(),
                    generated_message: None,
                    service_token: None,
                }));
            }
        };

        let budget = Duration::from_secs(PROCESSING_BUDGET_SECONDS);
        let outcome = tokio::time::timeout(
            budget,
            self.process(&service, &token, &record, payload.clone()),
        )
        .await;

        let (status, message, generated_message) = match outcome {
            Ok(ProcessOutcome::Delivered(rendered)) => ("success", "delivered".to_string(), Some(rendered)),
            Ok(ProcessOutcome::Failed { reason, rendered }) => ("failure", reason, rendered),
            Err(_) => ("failure", "processing timed out".to_string(), None),
        };

        let log_record = PayloadLogRecord {
            timestamp: Utc::now(),
            webhook_type: service.clone(),
            payload,
            source_ip,
            user_agent,
            processing_status: if status == "success" {
                ProcessingStatus::Success
            } else {
                ProcessingStatus::Failure
            },
            generated_message: generated_message.clone(),
            content_length,
        };
        let _ = self.payload_logger.append(&service, &log_record).await;

        Ok(Json(WebhookResponse {
            status,
            message,
            generated_message,
            service_token: Some(format!("{service}:{token}")),
        }))
    }
}

enum ProcessOutcome {
    Delivered(String),
    Failed {
        reason: String,
        rendered: Option<String>,
    },
}

impl WebhookController {
    /// Run extraction, rendering, and the sink send. Stored configurations
    /// are validated at write time, so extraction/rendering cannot fail
    /// here; only the sink call can.
    async fn process(
        &self,
        service: &str,
        token: &str,
        record: &crate::models::ConfigRecord,
        payload: serde_json::Value,
    ) -> ProcessOutcome {
        let patterns = match extract::parse_fields(&record.fields) {
            Ok(p) => p,
            Err(e) => {
                return ProcessOutcome::Failed {
                    reason: e.to_string(),
                    rendered: None,
                }
            }
        };
        let map = extract::extract(&payload, &patterns);
        let rendered = match template::render(&record.template, &map) {
            Ok(r) => r,
            Err(e) => {
                return ProcessOutcome::Failed {
                    reason: e.to_string(),
                    rendered: None,
                }
            }
        };

        let message = SinkMessage::new(service, token, &rendered, record.alignment.0);
        match self.sink_client.send(&message).await {
            Ok(()) => ProcessOutcome::Delivered(rendered),
            Err(e) => {
                tracing::warn!(service, token, error = %e, "sink delivery failed");
                ProcessOutcome::Failed {
                    reason: e.to_string(),
                    rendered: Some(rendered),
                }
            }
        }
    }
}
