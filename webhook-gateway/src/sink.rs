//! The sink client (C6, spec §4.6): forwards rendered messages to the
//! external monitoring API with bounded, exponential-backoff retry.

use std::time::Duration;

use crate::error::GatewayError;
use crate::models::SinkMessage;

pub struct SinkClient {
    client: reqwest::Client,
    url: String,
    username: String,
    password: String,
    retry_attempts: u32,
}

impl SinkClient {
    pub fn new(
        url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        timeout_seconds: u64,
        retry_attempts: u32,
    ) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| GatewayError::SinkUnavailable(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
            username: username.into(),
            password: password.into(),
            retry_attempts: retry_attempts.max(1),
        })
    }

    /// POST `message` to the sink. Retries on network errors and `5xx`
    /// responses with exponential backoff starting at ~1s. `4xx` and `3xx`
    /// responses are terminal (`SinkRejected`); retry exhaustion is
    /// `SinkUnavailable`.
    pub async fn send(&self, message: &SinkMessage) -> Result<(), GatewayError> {
        let mut delay = Duration::from_secs(1);

        for attempt in 1..=self.retry_attempts {
            match self.attempt(message).await {
                Ok(()) => return Ok(()),
                Err(AttemptOutcome::Terminal(err)) => return Err(err),
                Err(AttemptOutcome::Retryable(reason)) => {
                    if attempt == self.retry_attempts {
                        return Err(GatewayError::SinkUnavailable(format!(
                            "{reason} after {attempt} attempt(s)"
                        )));
                    }
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
            }
        }
        unreachable!("loop always returns by the last attempt")
    }

    async fn attempt(&self, message: &SinkMessage) -> Result<(), AttemptOutcome> {
        let response = self
            .client
            .post(&self.url)
            .basic_auth(&self.username, Some(&self.password))
            .json(message)
            .send()
            .await
            .map_err(|e| AttemptOutcome::Retryable(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        if status.is_client_error() || status.is_redirection() {
            let body = response.text().await.unwrap_or_default();
            return Err(AttemptOutcome::Terminal(GatewayError::SinkRejected(format!(
                "sink returned {status}: {body}"
            ))));
        }
        Err(AttemptOutcome::Retryable(format!("sink returned {status}")))
    }
}

enum AttemptOutcome {
    Retryable(String),
    Terminal(GatewayError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_rejects_zero_attempts_by_clamping() {
        let client = SinkClient::new("http://sink.example", "u", "p", 30, 0).unwrap();
        assert_eq!(client.retry_attempts, 1);
    }
}
