use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;

use crate::error::RelayError;
use crate::message::{MessagePayload, SendReceipt};

/// Connection settings for the WhatsApp Cloud API.
#[derive(Debug, Clone)]
pub struct CloudApiConfig {
    pub api_base: String,
    pub api_version: String,
    pub access_token: String,
    pub phone_number_id: String,
    pub business_account_id: Option<String>,
    pub timeout: Duration,
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl Default for CloudApiConfig {
    fn default() -> Self {
        Self {
            api_base: "https://graph.facebook.com".to_string(),
            api_version: "v18.0".to_string(),
            access_token: String::new(),
            phone_number_id: String::new(),
            business_account_id: None,
            timeout: Duration::from_secs(10),
            max_retries: 3,
            retry_delay: Duration::from_millis(1000),
        }
    }
}

/// Client for the WhatsApp Cloud API messages endpoint.
pub struct CloudApiClient {
    config: CloudApiConfig,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct GraphSendResponse {
    #[serde(default)]
    messages: Vec<GraphMessageId>,
}

#[derive(Debug, Deserialize)]
struct GraphMessageId {
    id: String,
}

#[derive(Debug, Deserialize)]
struct GraphErrorResponse {
    error: Option<GraphErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct GraphErrorDetail {
    message: String,
}

#[derive(Debug, Deserialize)]
struct GraphStatusResponse {
    status: Option<String>,
}

impl CloudApiClient {
    pub fn new(config: CloudApiConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    pub fn is_configured(&self) -> bool {
        !self.config.access_token.is_empty() && !self.config.phone_number_id.is_empty()
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/{}/{}/messages",
            self.config.api_base, self.config.api_version, self.config.phone_number_id
        )
    }

    /// Send a message, retrying transient failures with exponential backoff.
    pub async fn send(&self, payload: &MessagePayload) -> Result<SendReceipt, RelayError> {
        if !self.is_configured() {
            return Err(RelayError::MissingCredentials);
        }

        let url = self.messages_url();
        let policy = RetryPolicy {
            max_attempts: self.config.max_retries,
            base_delay: self.config.retry_delay,
        };

        send_with_retry(policy, |_attempt| self.attempt_send(&url, payload)).await
    }

    async fn attempt_send(
        &self,
        url: &str,
        payload: &MessagePayload,
    ) -> Result<SendReceipt, RelayError> {
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.config.access_token)
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RelayError::GatewayTimeout
                } else {
                    RelayError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            let body: GraphSendResponse = response.json().await.map_err(|e| {
                RelayError::Upstream(format!("Malformed WhatsApp API response: {}", e))
            })?;
            let message_id = body
                .messages
                .into_iter()
                .next()
                .map(|m| m.id)
                .unwrap_or_default();

            tracing::info!("WhatsApp message sent: {}", message_id);

            Ok(SendReceipt {
                message_id,
                phone: payload.to.clone(),
                kind: payload.kind,
            })
        } else {
            let detail = response
                .json::<GraphErrorResponse>()
                .await
                .ok()
                .and_then(|body| body.error.map(|e| e.message))
                .unwrap_or_else(|| status.to_string());
            Err(classify_status(status, detail))
        }
    }

    /// Look up the delivery status of a previously sent message.
    pub async fn message_status(&self, message_id: &str) -> Result<String, RelayError> {
        if !self.is_configured() {
            return Err(RelayError::MissingCredentials);
        }

        let url = format!(
            "{}/{}/{}",
            self.config.api_base, self.config.api_version, message_id
        );

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.config.access_token)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RelayError::GatewayTimeout
                } else {
                    RelayError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<GraphErrorResponse>()
                .await
                .ok()
                .and_then(|body| body.error.map(|e| e.message))
                .unwrap_or_else(|| status.to_string());
            return Err(classify_status(status, detail));
        }

        let body: GraphStatusResponse = response
            .json()
            .await
            .map_err(|e| RelayError::Upstream(format!("Malformed status response: {}", e)))?;
        Ok(body.status.unwrap_or_else(|| "unknown".to_string()))
    }
}

fn classify_status(status: StatusCode, detail: String) -> RelayError {
    match status.as_u16() {
        400 => RelayError::BadRequest(detail),
        401 => RelayError::AuthFailed("Access token may be expired or invalid".to_string()),
        403 => {
            RelayError::PermissionDenied("Check permissions for your WhatsApp Business account".to_string())
        }
        404 => RelayError::PhoneNumberNotFound("Verify the phone number ID is correct".to_string()),
        402..=499 => RelayError::BadRequest(detail),
        _ => RelayError::Upstream(detail),
    }
}

/// Attempt budget and backoff base for transient failures.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

/// Run `op` up to `max_attempts` times.
///
/// Non-retryable errors propagate immediately. Between retryable failures
/// the delay doubles: base, base*2, base*4, ...
pub async fn send_with_retry<T, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T, RelayError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, RelayError>>,
{
    let mut last_error = None;

    for attempt in 1..=policy.max_attempts.max(1) {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) if !err.is_retryable() => return Err(err),
            Err(err) => {
                tracing::warn!(
                    "Send attempt {}/{} failed: {}",
                    attempt,
                    policy.max_attempts,
                    err
                );
                last_error = Some(err);
                if attempt < policy.max_attempts {
                    let delay = policy.base_delay * 2u32.pow(attempt - 1);
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    Err(last_error.unwrap_or_else(|| RelayError::Upstream("Retry budget exhausted".to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn transient_errors_retry_three_times_with_backoff() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();
        let started = tokio::time::Instant::now();

        let result: Result<(), _> = send_with_retry(policy(), move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err(RelayError::Upstream("500".to_string())) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
        // two delays: 1s then 2s
        assert!(started.elapsed() >= Duration::from_secs(3));
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();

        let result: Result<(), _> = send_with_retry(policy(), move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err(RelayError::BadRequest("400".to_string())) }
        })
        .await;

        assert!(matches!(result, Err(RelayError::BadRequest(_))));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn recovers_after_a_transient_failure() {
        let attempts = Arc::new(AtomicU32::new(0));
        let counter = attempts.clone();

        let result = send_with_retry(policy(), move |_| {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(RelayError::GatewayTimeout)
                } else {
                    Ok("delivered")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "delivered");
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn classification_distinguishes_client_errors() {
        assert!(matches!(
            classify_status(StatusCode::BAD_REQUEST, "x".into()),
            RelayError::BadRequest(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::UNAUTHORIZED, "x".into()),
            RelayError::AuthFailed(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::FORBIDDEN, "x".into()),
            RelayError::PermissionDenied(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::NOT_FOUND, "x".into()),
            RelayError::PhoneNumberNotFound(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::INTERNAL_SERVER_ERROR, "x".into()),
            RelayError::Upstream(_)
        ));
        assert!(!classify_status(StatusCode::BAD_REQUEST, "x".into()).is_retryable());
        assert!(classify_status(StatusCode::BAD_GATEWAY, "x".into()).is_retryable());
    }
}
