use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::error::AppError;
use crate::middleware::auth::Claims;
use crate::state::AppState;
use tripnezt_relay::message::MessagePayload;
use tripnezt_relay::transport::{SendRequest, TemplateData};
use tripnezt_relay::{phone, template, RelayError};

/// Longest message body the Cloud API accepts.
const MAX_MESSAGE_LENGTH: usize = 4096;

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendWhatsAppBody {
    pub phone_number: Option<String>,
    pub message: Option<String>,
    pub template_name: Option<String>,
    pub template_data: Option<TemplateData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallableSendBody {
    pub phone_number: Option<String>,
    pub message: Option<String>,
    pub template_name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallableTemplateBody {
    pub phone_number: Option<String>,
    pub template_name: Option<String>,
    pub language_code: Option<String>,
    pub components: Option<Vec<serde_json::Value>>,
}

fn is_valid_template_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

fn validate_body(body: &SendWhatsAppBody) -> Vec<String> {
    let mut errors = Vec::new();

    match &body.phone_number {
        None => errors.push("Phone number is required".to_string()),
        Some(phone_number) => {
            if phone::validate(phone_number).is_err() {
                errors.push("Invalid phone number format".to_string());
            }
        }
    }

    if body.message.is_none() && body.template_name.is_none() {
        errors.push("Message or template name is required".to_string());
    }

    if let Some(message) = &body.message {
        if message.len() > MAX_MESSAGE_LENGTH {
            errors.push("Message too long (max 4096 characters)".to_string());
        }
    }

    if let Some(template_name) = &body.template_name {
        if !is_valid_template_name(template_name) {
            errors.push(
                "Invalid template name format (only lowercase letters, numbers, and underscores allowed)"
                    .to_string(),
            );
        }
    }

    errors
}

// ============================================================================
// Public REST endpoint
// ============================================================================

/// POST /api/send-whatsapp
/// Rate-limited public relay endpoint for the WhatsApp Cloud API.
pub async fn send_whatsapp(
    State(state): State<AppState>,
    Json(body): Json<SendWhatsAppBody>,
) -> Result<Response, AppError> {
    // 1. Validate before any external call
    let errors = validate_body(&body);
    if !errors.is_empty() {
        return Err(AppError::ValidationDetails(errors));
    }

    // 2. Credentials must be configured
    if !state.gateway.is_configured() {
        return Err(RelayError::MissingCredentials.into());
    }

    // 3. Build the payload and send with retry/backoff
    let request = SendRequest {
        phone_number: body.phone_number.unwrap_or_default(),
        message: body.message,
        template_name: body.template_name,
        template_data: body.template_data,
    };
    let payload = request.to_payload();

    match state.gateway.send(&payload).await {
        Ok(receipt) => Ok(Json(json!({
            "success": true,
            "messageId": receipt.message_id,
            "phone": receipt.phone,
            "type": receipt.kind.as_str(),
        }))
        .into_response()),
        Err(err) => {
            // Internal detail only leaves the process in development mode
            if state.dev_mode {
                if let RelayError::Upstream(detail) | RelayError::Network(detail) = &err {
                    let body = json!({
                        "error": "Failed to send WhatsApp message",
                        "debug": detail,
                        "code": "internal",
                    });
                    return Ok((StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response());
                }
            }
            Err(err.into())
        }
    }
}

// ============================================================================
// Authenticated callable surface
// ============================================================================

/// POST /v1/messages/send
/// Text send with a delivery-log record; requires an authenticated caller.
pub async fn send_message(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<CallableSendBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let phone_number = body
        .phone_number
        .ok_or_else(|| AppError::ValidationError("Phone number is required".to_string()))?;
    if body.message.is_none() && body.template_name.is_none() {
        return Err(AppError::ValidationError(
            "Message or template name is required".to_string(),
        ));
    }
    if !state.gateway.is_configured() {
        return Err(RelayError::MissingCredentials.into());
    }

    let formatted_phone = phone::normalize(&phone_number);
    let text = body.message.clone().unwrap_or_else(|| {
        template::default_message(body.template_name.as_deref().unwrap_or("welcome")).to_string()
    });

    let payload = MessagePayload::text(formatted_phone.clone(), text.clone());
    let result = state.gateway.send(&payload).await;

    match result {
        Ok(receipt) => {
            let _ = state
                .messages
                .log_sent(
                    &formatted_phone,
                    &text,
                    body.template_name.as_deref(),
                    &receipt.message_id,
                    &claims.sub,
                )
                .await;

            Ok(Json(json!({
                "success": true,
                "messageId": receipt.message_id,
            })))
        }
        Err(err) => {
            let _ = state
                .messages
                .log_failed(
                    &formatted_phone,
                    &text,
                    body.template_name.as_deref(),
                    &err.to_string(),
                    &claims.sub,
                )
                .await;

            Err(err.into())
        }
    }
}

/// POST /v1/messages/template
/// Pre-approved template send; requires an authenticated caller.
pub async fn send_template(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<CallableTemplateBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let phone_number = body
        .phone_number
        .ok_or_else(|| AppError::ValidationError("Phone number is required".to_string()))?;
    let template_name = body
        .template_name
        .ok_or_else(|| AppError::ValidationError("Template name is required".to_string()))?;
    if !state.gateway.is_configured() {
        return Err(RelayError::MissingCredentials.into());
    }

    let formatted_phone = phone::normalize(&phone_number);
    let payload = MessagePayload::template(
        formatted_phone.clone(),
        template_name.clone(),
        body.language_code.unwrap_or_else(|| "en".to_string()),
        body.components.unwrap_or_default(),
    );

    let result = state.gateway.send(&payload).await;

    match result {
        Ok(receipt) => {
            let _ = state
                .messages
                .log_sent(
                    &formatted_phone,
                    &template_name,
                    Some(&template_name),
                    &receipt.message_id,
                    &claims.sub,
                )
                .await;

            Ok(Json(json!({
                "success": true,
                "messageId": receipt.message_id,
            })))
        }
        Err(err) => {
            let _ = state
                .messages
                .log_failed(
                    &formatted_phone,
                    &template_name,
                    Some(&template_name),
                    &err.to_string(),
                    &claims.sub,
                )
                .await;

            Err(err.into())
        }
    }
}

/// GET /v1/messages/{id}/status
pub async fn message_status(
    State(state): State<AppState>,
    Path(message_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    if message_id.trim().is_empty() {
        return Err(AppError::ValidationError("Message ID is required".to_string()));
    }

    let status = state.gateway.message_status(&message_id).await?;
    Ok(Json(json!({
        "success": true,
        "status": status,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(
        phone: Option<&str>,
        message: Option<&str>,
        template: Option<&str>,
    ) -> SendWhatsAppBody {
        SendWhatsAppBody {
            phone_number: phone.map(String::from),
            message: message.map(String::from),
            template_name: template.map(String::from),
            template_data: None,
        }
    }

    #[test]
    fn missing_phone_is_reported() {
        let errors = validate_body(&body(None, Some("hi"), None));
        assert!(errors.iter().any(|e| e.contains("Phone number is required")));
    }

    #[test]
    fn short_phone_is_rejected() {
        let errors = validate_body(&body(Some("12345"), Some("hi"), None));
        assert!(errors.iter().any(|e| e.contains("Invalid phone number")));
    }

    #[test]
    fn message_or_template_is_required() {
        let errors = validate_body(&body(Some("9876543210"), None, None));
        assert!(errors
            .iter()
            .any(|e| e.contains("Message or template name is required")));
    }

    #[test]
    fn oversized_message_is_rejected() {
        let long = "x".repeat(MAX_MESSAGE_LENGTH + 1);
        let errors = validate_body(&body(Some("9876543210"), Some(&long), None));
        assert!(errors.iter().any(|e| e.contains("Message too long")));
    }

    #[test]
    fn template_name_format_is_enforced() {
        let errors = validate_body(&body(Some("9876543210"), None, Some("Bad-Name")));
        assert!(errors.iter().any(|e| e.contains("Invalid template name")));

        assert!(validate_body(&body(Some("9876543210"), None, Some("booking_confirmed"))).is_empty());
    }

    #[test]
    fn valid_body_passes() {
        assert!(validate_body(&body(Some("+91 98765 43210"), Some("hi"), None)).is_empty());
    }
}
