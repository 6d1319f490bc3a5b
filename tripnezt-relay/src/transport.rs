use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::RelayError;
use crate::gateway::CloudApiClient;
use crate::message::{sanitize_message, MessagePayload, SendReceipt};
use crate::{phone, template};

/// A message send request in the shape the REST endpoint accepts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendRequest {
    pub phone_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_data: Option<TemplateData>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Vec<serde_json::Value>>,
}

impl SendRequest {
    /// Build the Cloud API payload: a template send when only a template
    /// name is given, a text send otherwise (falling back to the
    /// template's canned text when the body is empty).
    pub fn to_payload(&self) -> MessagePayload {
        let to = phone::normalize(&self.phone_number);

        match (&self.message, &self.template_name) {
            (None, Some(name)) => {
                let data = self.template_data.clone().unwrap_or_default();
                MessagePayload::template(
                    to,
                    name.clone(),
                    data.language_code.unwrap_or_else(|| "en".to_string()),
                    data.components.unwrap_or_default(),
                )
            }
            (message, template_name) => {
                let body = message
                    .as_deref()
                    .map(sanitize_message)
                    .filter(|m| !m.is_empty())
                    .unwrap_or_else(|| {
                        template::default_message(template_name.as_deref().unwrap_or("welcome"))
                            .to_string()
                    });
                MessagePayload::text(to, body)
            }
        }
    }
}

/// A delivery path for outbound messages.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &SendRequest) -> Result<SendReceipt, RelayError>;

    fn name(&self) -> &'static str;
}

// ============================================================================
// REST transport
// ============================================================================

/// Sends through a remote relay endpoint (`POST {base}/api/send-whatsapp`).
pub struct RestTransport {
    base_url: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RestSendResponse {
    message_id: Option<String>,
    phone: Option<String>,
    #[serde(rename = "type")]
    kind: Option<crate::message::MessageKind>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RestErrorBody {
    error: Option<String>,
    retry_after: Option<u64>,
}

impl RestTransport {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }
}

#[async_trait]
impl Transport for RestTransport {
    async fn send(&self, request: &SendRequest) -> Result<SendReceipt, RelayError> {
        let url = format!("{}/api/send-whatsapp", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(request)
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
            let body: RestSendResponse = response
                .json()
                .await
                .map_err(|e| RelayError::Upstream(format!("Malformed relay response: {}", e)))?;
            return Ok(SendReceipt {
                message_id: body.message_id.unwrap_or_default(),
                phone: body
                    .phone
                    .unwrap_or_else(|| phone::normalize(&request.phone_number)),
                kind: body.kind.unwrap_or(crate::message::MessageKind::Text),
            });
        }

        let body = response.json::<RestErrorBody>().await.ok();
        let detail = body
            .as_ref()
            .and_then(|b| b.error.clone())
            .unwrap_or_else(|| status.to_string());

        Err(match status.as_u16() {
            400 => RelayError::BadRequest(detail),
            401 => RelayError::AuthFailed(detail),
            403 => RelayError::PermissionDenied(detail),
            404 => RelayError::PhoneNumberNotFound(detail),
            429 => RelayError::RateLimited {
                retry_after: body.and_then(|b| b.retry_after).unwrap_or(60),
            },
            504 => RelayError::GatewayTimeout,
            _ => RelayError::Upstream(detail),
        })
    }

    fn name(&self) -> &'static str {
        "rest"
    }
}

// ============================================================================
// Direct transport
// ============================================================================

/// Sends through the Cloud API in-process; the server-side equivalent of
/// the managed callable function.
pub struct DirectTransport {
    gateway: Arc<CloudApiClient>,
}

impl DirectTransport {
    pub fn new(gateway: Arc<CloudApiClient>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl Transport for DirectTransport {
    async fn send(&self, request: &SendRequest) -> Result<SendReceipt, RelayError> {
        let payload = request.to_payload();
        self.gateway.send(&payload).await
    }

    fn name(&self) -> &'static str {
        "direct"
    }
}

// ============================================================================
// Selector
// ============================================================================

/// Explicit fallback strategy over the configured transports.
///
/// Prefers the REST transport when one is configured; any REST failure
/// falls back to the direct transport. With no REST transport the direct
/// path is used outright.
pub struct TransportSelector {
    rest: Option<Arc<dyn Transport>>,
    fallback: Arc<dyn Transport>,
}

impl TransportSelector {
    pub fn new(rest: Option<Arc<dyn Transport>>, fallback: Arc<dyn Transport>) -> Self {
        Self { rest, fallback }
    }

    pub async fn send(&self, request: &SendRequest) -> Result<SendReceipt, RelayError> {
        if let Some(rest) = &self.rest {
            match rest.send(request).await {
                Ok(receipt) => return Ok(receipt),
                Err(err) => {
                    tracing::warn!(
                        "{} transport failed, falling back to {}: {}",
                        rest.name(),
                        self.fallback.name(),
                        err
                    );
                }
            }
        }

        self.fallback.send(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageKind;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct StubTransport {
        calls: AtomicU32,
        fail: bool,
        label: &'static str,
    }

    impl StubTransport {
        fn new(fail: bool, label: &'static str) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicU32::new(0),
                fail,
                label,
            })
        }
    }

    #[async_trait]
    impl Transport for StubTransport {
        async fn send(&self, request: &SendRequest) -> Result<SendReceipt, RelayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(RelayError::Network("connection refused".to_string()))
            } else {
                Ok(SendReceipt {
                    message_id: format!("wamid-{}", self.label),
                    phone: phone::normalize(&request.phone_number),
                    kind: MessageKind::Text,
                })
            }
        }

        fn name(&self) -> &'static str {
            self.label
        }
    }

    fn request() -> SendRequest {
        SendRequest {
            phone_number: "9876543210".to_string(),
            message: Some("hello".to_string()),
            template_name: None,
            template_data: None,
        }
    }

    #[tokio::test]
    async fn rest_success_skips_the_fallback() {
        let rest = StubTransport::new(false, "rest");
        let direct = StubTransport::new(false, "direct");
        let selector = TransportSelector::new(Some(rest.clone()), direct.clone());

        let receipt = selector.send(&request()).await.unwrap();
        assert_eq!(receipt.message_id, "wamid-rest");
        assert_eq!(rest.calls.load(Ordering::SeqCst), 1);
        assert_eq!(direct.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn rest_failure_falls_back_to_direct() {
        let rest = StubTransport::new(true, "rest");
        let direct = StubTransport::new(false, "direct");
        let selector = TransportSelector::new(Some(rest.clone()), direct.clone());

        let receipt = selector.send(&request()).await.unwrap();
        assert_eq!(receipt.message_id, "wamid-direct");
        assert_eq!(rest.calls.load(Ordering::SeqCst), 1);
        assert_eq!(direct.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn without_rest_the_direct_path_is_used() {
        let direct = StubTransport::new(false, "direct");
        let selector = TransportSelector::new(None, direct.clone());

        let receipt = selector.send(&request()).await.unwrap();
        assert_eq!(receipt.message_id, "wamid-direct");
        assert_eq!(direct.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn template_only_requests_become_template_payloads() {
        let req = SendRequest {
            phone_number: "9876543210".to_string(),
            message: None,
            template_name: Some("booking_confirmed".to_string()),
            template_data: None,
        };
        let payload = req.to_payload();
        assert_eq!(payload.kind, MessageKind::Template);
        assert_eq!(payload.to, "+919876543210");
    }

    #[test]
    fn message_requests_become_text_payloads() {
        let payload = request().to_payload();
        assert_eq!(payload.kind, MessageKind::Text);
        assert_eq!(payload.text.unwrap().body, "hello");
    }

    #[test]
    fn empty_message_falls_back_to_canned_text() {
        let req = SendRequest {
            phone_number: "9876543210".to_string(),
            message: Some("   ".to_string()),
            template_name: Some("follow_up".to_string()),
            template_data: None,
        };
        let payload = req.to_payload();
        assert_eq!(payload.kind, MessageKind::Text);
        assert!(payload.text.unwrap().body.contains("Following up"));
    }
}
