use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use tripnezt_relay::RelayError;
use tripnezt_store::StoreError;

#[derive(Debug)]
pub enum AppError {
    AuthenticationError(String),
    AuthorizationError(String),
    ValidationError(String),
    ValidationDetails(Vec<String>),
    NotFoundError(String),
    ConflictError(String),
    RateLimited { retry_after: u64 },
    GatewayTimeout(String),
    FailedPrecondition { message: String, hint: Option<String> },
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut retry_after = None;

        let (status, code, mut body) = match self {
            AppError::AuthenticationError(msg) => (
                StatusCode::UNAUTHORIZED,
                "unauthenticated",
                json!({ "error": msg }),
            ),
            AppError::AuthorizationError(msg) => (
                StatusCode::FORBIDDEN,
                "permission-denied",
                json!({ "error": msg }),
            ),
            AppError::ValidationError(msg) => (
                StatusCode::BAD_REQUEST,
                "invalid-argument",
                json!({ "error": msg }),
            ),
            AppError::ValidationDetails(details) => (
                StatusCode::BAD_REQUEST,
                "invalid-argument",
                json!({ "error": "Validation failed", "details": details }),
            ),
            AppError::NotFoundError(msg) => {
                (StatusCode::NOT_FOUND, "not-found", json!({ "error": msg }))
            }
            AppError::ConflictError(msg) => {
                (StatusCode::CONFLICT, "conflict", json!({ "error": msg }))
            }
            AppError::RateLimited { retry_after: secs } => {
                retry_after = Some(secs);
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    "rate-limited",
                    json!({ "error": "Too many requests", "retryAfter": secs }),
                )
            }
            AppError::GatewayTimeout(msg) => (
                StatusCode::GATEWAY_TIMEOUT,
                "gateway-timeout",
                json!({ "error": msg }),
            ),
            AppError::FailedPrecondition { message, hint } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "failed-precondition",
                match hint {
                    Some(hint) => json!({ "error": message, "hint": hint }),
                    None => json!({ "error": message }),
                },
            ),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal",
                    json!({ "error": "Internal Server Error" }),
                )
            }
        };

        body["code"] = json!(code);

        let mut response = (status, Json(body)).into_response();
        if let Some(secs) = retry_after {
            if let Ok(value) = secs.to_string().parse() {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(resource, id) => {
                AppError::NotFoundError(format!("{} with id '{}' not found", resource, id))
            }
            StoreError::InvalidTransition(e) => AppError::ConflictError(e.to_string()),
            StoreError::CapacityExceeded {
                requested,
                available,
            } => AppError::ConflictError(format!(
                "Capacity exceeded: requested {} seats, only {} available",
                requested, available
            )),
            StoreError::DuplicateEmail(email) => {
                AppError::ConflictError(format!("Email already registered: {}", email))
            }
            StoreError::Corrupt(msg) => AppError::InternalServerError(msg),
            StoreError::Database(e) => AppError::InternalServerError(e.to_string()),
        }
    }
}

impl From<RelayError> for AppError {
    fn from(err: RelayError) -> Self {
        match err {
            RelayError::InvalidPhone(msg) | RelayError::Validation(msg) => {
                AppError::ValidationError(msg)
            }
            RelayError::UnknownTemplate(name) => {
                AppError::ValidationError(format!("Unknown message template: {}", name))
            }
            RelayError::BadRequest(msg) => {
                AppError::ValidationError(format!("Invalid request to WhatsApp API: {}", msg))
            }
            RelayError::AuthFailed(msg) => AppError::AuthenticationError(format!(
                "WhatsApp API authentication failed: {}",
                msg
            )),
            RelayError::PermissionDenied(msg) => {
                AppError::AuthorizationError(format!("WhatsApp API access denied: {}", msg))
            }
            RelayError::PhoneNumberNotFound(msg) => AppError::NotFoundError(format!(
                "WhatsApp Business phone number not found: {}",
                msg
            )),
            RelayError::RateLimited { retry_after } => AppError::RateLimited { retry_after },
            RelayError::GatewayTimeout => AppError::GatewayTimeout(
                "WhatsApp API request timed out. Please try again".to_string(),
            ),
            RelayError::MissingCredentials => AppError::FailedPrecondition {
                message: "WhatsApp Business credentials not configured".to_string(),
                hint: Some(
                    "Please set WHATSAPP_ACCESS_TOKEN and WHATSAPP_PHONE_NUMBER_ID environment variables"
                        .to_string(),
                ),
            },
            RelayError::Upstream(msg) | RelayError::Network(msg) => {
                AppError::InternalServerError(format!("Failed to send WhatsApp message: {}", msg))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limited_carries_retry_after_header() {
        let response = AppError::RateLimited { retry_after: 42 }.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "42");
    }

    #[test]
    fn relay_timeouts_map_to_gateway_timeout() {
        let response = AppError::from(RelayError::GatewayTimeout).into_response();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn capacity_exceeded_maps_to_conflict() {
        let err = StoreError::CapacityExceeded {
            requested: 3,
            available: 1,
        };
        let response = AppError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
