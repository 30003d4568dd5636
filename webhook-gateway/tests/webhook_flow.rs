//! End-to-end coverage of the HTTP surface, driven through `TestApp`
//! (in-process, no socket bound) rather than the pipeline functions
//! directly.

use std::sync::Arc;

use r2e_core::AppBuilder;
use r2e_test::TestApp;
use serde_json::json;

use webhook_gateway::config_store::ConfigStore;
use webhook_gateway::controllers::{AdminController, HealthController, WebhookController};
use webhook_gateway::payload_log::PayloadLogger;
use webhook_gateway::sink::SinkClient;
use webhook_gateway::state::AppState;

/// Build a `TestApp` backed by a fresh tempdir for the config store and
/// payload logs. The sink points at an address nothing listens on, with a
/// single retry attempt and a short timeout, so `SinkClient::send` fails
/// fast instead of hanging the test.
fn build_app() -> (TestApp, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();

    let config_store = Arc::new(ConfigStore::new(
        dir.path().join("webhooks.conf"),
        dir.path().join("backups"),
    ));
    let payload_logger = Arc::new(PayloadLogger::new(
        dir.path().join("logs"),
        10_485_760,
        5,
        "payload.log",
        true,
    ));
    let sink_client = Arc::new(
        SinkClient::new("http://127.0.0.1:1", "u", "p", 1, 1).unwrap(),
    );

    let state = AppState {
        config_store,
        payload_logger,
        sink_client,
        settings: Arc::new(test_settings()),
    };

    let app = AppBuilder::new()
        .with_state(state)
        .register_controller::<WebhookController>()
        .register_controller::<AdminController>()
        .register_controller::<HealthController>()
        .build();

    (TestApp::new(app), dir)
}

fn test_settings() -> webhook_gateway::app_config::AppSettings {
    webhook_gateway::app_config::AppSettings {
        server_host: "127.0.0.1".into(),
        server_port: 0,
        sink_url: "http://127.0.0.1:1".into(),
        sink_username: "u".into(),
        sink_password: "p".into(),
        sink_timeout_seconds: 1,
        sink_retry_attempts: 1,
        logging_level: "INFO".into(),
        webhook_logging_enabled: true,
        webhook_logging_base_directory: "logs/webhooks".into(),
        webhook_logging_max_bytes: 10_485_760,
        webhook_logging_backup_count: 5,
        webhook_logging_log_file_name: "payload.log".into(),
        webhook_config_path: "config/webhooks.conf".into(),
        webhook_config_backup_dir: "config/backups".into(),
    }
}

#[tokio::test]
async fn unknown_service_token_pair_is_404() {
    let (app, _dir) = build_app();
    app.post_json("/webhook/github/deadbeefdeadbeefdeadbeefdeadbeef", &json!({"a": 1}))
        .await
        .assert_not_found();
}

#[tokio::test]
async fn empty_body_is_accepted_without_processing() {
    let (app, _dir) = build_app();
    app.post_json("/api/save-config", &json!({
        "service": "github",
        "fields": "action",
        "template": "$action$",
        "alignment": "",
    }))
    .await
    .assert_ok();

    let configs: Vec<serde_json::Value> = app.get("/api/configs").await.assert_ok().json();
    let token = configs[0]["token"].as_str().unwrap().to_string();

    let req = http::Request::builder()
        .method(http::Method::POST)
        .uri(format!("/webhook/github/{token}"))
        .body(r2e_core::http::body::Body::empty())
        .unwrap();
    let resp = app.send(req).await.assert_ok();
    let body: serde_json::Value = resp.json();
    assert_eq!(body["status"], "accepted");
}

#[tokio::test]
async fn known_webhook_renders_and_reports_sink_failure() {
    let (app, _dir) = build_app();
    let created: serde_json::Value = app
        .post_json(
            "/api/save-config",
            &json!({
                "service": "github",
                "fields": "action,repo{name}",
                "template": "$action$ on $repo.name$",
                "alignment": "",
            }),
        )
        .await
        .assert_ok()
        .json();
    let token = created["token"].as_str().unwrap();

    let resp = app
        .post_json(
            &format!("/webhook/github/{token}"),
            &json!({"action": "opened", "repo": {"name": "acme/widgets"}}),
        )
        .await
        .assert_ok();
    let body: serde_json::Value = resp.json();
    assert_eq!(body["status"], "failure");
    assert_eq!(body["generated_message"], "opened on acme/widgets");
}

#[tokio::test]
async fn admin_crud_round_trips_a_config() {
    let (app, _dir) = build_app();

    let created: serde_json::Value = app
        .post_json(
            "/api/save-config",
            &json!({
                "service": "stripe",
                "fields": "amount",
                "template": "$amount$",
                "alignment": "org:7",
            }),
        )
        .await
        .assert_ok()
        .json();
    let token = created["token"].as_str().unwrap().to_string();
    assert_eq!(created["alignment"], "org:7");

    let fetched: serde_json::Value = app
        .get(&format!("/api/config/stripe/{token}"))
        .await
        .assert_ok()
        .json();
    assert_eq!(fetched["fields"], "amount");

    app.delete_authenticated(&format!("/api/config/stripe/{token}"), "unused")
        .await
        .assert_status(http::StatusCode::NO_CONTENT);

    app.get(&format!("/api/config/stripe/{token}"))
        .await
        .assert_not_found();
}

#[tokio::test]
async fn generate_token_then_save_config_with_explicit_token_updates_record() {
    let (app, _dir) = build_app();

    let minted: serde_json::Value = app.get("/api/generate-token").await.assert_ok().json();
    let token = minted["token"].as_str().unwrap().to_string();

    let created: serde_json::Value = app
        .post_json(
            "/api/save-config",
            &json!({
                "service": "github",
                "fields": "action",
                "template": "$action$",
                "alignment": "",
                "token": token,
            }),
        )
        .await
        .assert_ok()
        .json();
    assert_eq!(created["token"], token);

    let updated: serde_json::Value = app
        .post_json(
            "/api/save-config",
            &json!({
                "service": "github",
                "fields": "action,repo",
                "template": "$action$ $repo$",
                "alignment": "",
                "token": token,
            }),
        )
        .await
        .assert_ok()
        .json();
    assert_eq!(updated["token"], token);
    assert_eq!(updated["fields"], "action,repo");
}

#[tokio::test]
async fn analyze_payload_reports_leaf_paths_and_types() {
    let (app, _dir) = build_app();
    let leaves: Vec<serde_json::Value> = app
        .post_json(
            "/api/analyze-payload",
            &json!({"payload": {"action": "opened", "repo": {"name": "acme/widgets"}, "count": 3}}),
        )
        .await
        .assert_ok()
        .json();

    let by_path: std::collections::HashMap<String, String> = leaves
        .into_iter()
        .map(|l| {
            (
                l["path"].as_str().unwrap().to_string(),
                l["type"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    assert_eq!(by_path["action"], "string");
    assert_eq!(by_path["repo.name"], "string");
    assert_eq!(by_path["count"], "number");
}

#[tokio::test]
async fn test_config_renders_without_touching_the_store() {
    let (app, _dir) = build_app();
    let result: serde_json::Value = app
        .post_json(
            "/api/test-config",
            &json!({
                "fields": "action",
                "template": "got: $action$",
                "payload": {"action": "opened"},
            }),
        )
        .await
        .assert_ok()
        .json();
    assert_eq!(result["rendered"], "got: opened");

    let configs: Vec<serde_json::Value> = app.get("/api/configs").await.assert_ok().json();
    assert!(configs.is_empty());
}

#[tokio::test]
async fn health_reports_known_service_types() {
    let (app, _dir) = build_app();
    app.post_json(
        "/api/save-config",
        &json!({"service": "github", "fields": "action", "template": "$action$", "alignment": ""}),
    )
    .await
    .assert_ok();

    let body: serde_json::Value = app.get("/health").await.assert_ok().json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["webhook_types"], json!(["github"]));
}

#[tokio::test]
async fn webhook_logs_types_and_recent_reflect_ingested_payloads() {
    let (app, _dir) = build_app();
    let created: serde_json::Value = app
        .post_json(
            "/api/save-config",
            &json!({"service": "github", "fields": "action", "template": "$action$", "alignment": ""}),
        )
        .await
        .assert_ok()
        .json();
    let token = created["token"].as_str().unwrap();

    app.post_json(&format!("/webhook/github/{token}"), &json!({"action": "opened"}))
        .await
        .assert_ok();

    let types: Vec<String> = app.get("/api/webhook-logs/types").await.assert_ok().json();
    assert_eq!(types, vec!["github".to_string()]);

    let recent: Vec<serde_json::Value> = app
        .get("/api/webhook-logs/github/recent")
        .await
        .assert_ok()
        .json();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0]["webhook_type"], "github");
}
