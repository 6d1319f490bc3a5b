/// Failure taxonomy for outbound message delivery.
///
/// Validation and client errors are surfaced immediately; only transient
/// upstream failures are eligible for retry.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("Invalid phone number: {0}")]
    InvalidPhone(String),

    #[error("Unknown message template: {0}")]
    UnknownTemplate(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("WhatsApp Business credentials not configured")]
    MissingCredentials,

    #[error("Invalid request to WhatsApp API: {0}")]
    BadRequest(String),

    #[error("WhatsApp API authentication failed: {0}")]
    AuthFailed(String),

    #[error("WhatsApp API access denied: {0}")]
    PermissionDenied(String),

    #[error("WhatsApp Business phone number not found: {0}")]
    PhoneNumberNotFound(String),

    #[error("Rate limited, retry after {retry_after}s")]
    RateLimited { retry_after: u64 },

    #[error("WhatsApp API request timed out")]
    GatewayTimeout,

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Network error: {0}")]
    Network(String),
}

impl RelayError {
    /// 5xx, network failures and timeouts are retried; everything else
    /// is surfaced on the first attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RelayError::Upstream(_) | RelayError::Network(_) | RelayError::GatewayTimeout
        )
    }
}
