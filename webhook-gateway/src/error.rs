//! Domain error taxonomy for the gateway, and its mapping onto the
//! framework's HTTP error type.

use r2e_core::error::HttpError;
use r2e_core::http::StatusCode;

/// The error kinds surfaced by the core pipeline (spec §7).
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("invalid field pattern: {0}")]
    BadPattern(String),

    #[error("invalid template: {0}")]
    BadTemplate(String),

    #[error("token already in use")]
    TokenCollision,

    #[error("no configuration for the given service/token")]
    NotFound,

    #[error("invalid configuration: {0}")]
    BadConfig(String),

    #[error("sink rejected the message: {0}")]
    SinkRejected(String),

    #[error("sink unavailable after retries: {0}")]
    SinkUnavailable(String),

    #[error("failed to write payload log: {0}")]
    LogIoFailure(String),

    #[error("token space exhausted")]
    Exhausted,
}

/// Administrative endpoints surface the full error; no message ever
/// echoes a token (spec §7).
impl From<GatewayError> for HttpError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::BadPattern(msg) => HttpError::BadRequest(msg),
            GatewayError::BadTemplate(msg) => HttpError::BadRequest(msg),
            GatewayError::TokenCollision => {
                HttpError::Custom {
                    status: StatusCode::CONFLICT,
                    body: serde_json::json!({"error": "token already in use"}),
                }
            }
            GatewayError::NotFound => HttpError::NotFound("configuration not found".into()),
            GatewayError::BadConfig(msg) => HttpError::BadRequest(msg),
            GatewayError::SinkRejected(msg) => HttpError::BadRequest(msg),
            GatewayError::SinkUnavailable(msg) => HttpError::Internal(msg),
            GatewayError::LogIoFailure(msg) => HttpError::Internal(msg),
            GatewayError::Exhausted => {
                HttpError::Internal("token space exhausted".into())
            }
        }
    }
}
