use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::Claims;
use crate::state::AppState;
use tripnezt_domain::booking::{Booking, BookingStatus};
use tripnezt_relay::lead::{build_lead_request, LeadContact, Substitutions};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ChangeStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyLeadRequest {
    pub template_key: String,
    #[serde(default)]
    pub substitutions: Substitutions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifyLeadResponse {
    pub success: bool,
    pub message_id: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /v1/admin/leads
/// All bookings, newest first.
pub async fn list_leads(State(state): State<AppState>) -> Result<Json<Vec<Booking>>, AppError> {
    let bookings = state.bookings.list().await?;
    Ok(Json(bookings))
}

/// POST /v1/admin/leads/{id}/status
/// Move a lead through its lifecycle. Seat reconciliation and the audit
/// record commit atomically with the status change.
pub async fn change_status(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
    Json(req): Json<ChangeStatusRequest>,
) -> Result<Json<Booking>, AppError> {
    let new_status = BookingStatus::parse(&req.status)
        .ok_or_else(|| AppError::ValidationError(format!("Unknown status '{}'", req.status)))?;

    let booking = state.bookings.transition(booking_id, new_status).await?;
    Ok(Json(booking))
}

/// POST /v1/admin/leads/{id}/notify
/// Send a templated WhatsApp message to the lead.
pub async fn notify_lead(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(booking_id): Path<Uuid>,
    Json(req): Json<NotifyLeadRequest>,
) -> Result<Json<NotifyLeadResponse>, AppError> {
    // 1. Load the lead
    let booking = state
        .bookings
        .get(booking_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("Booking '{}' not found", booking_id)))?;

    let contact = LeadContact {
        name: booking.full_name.clone(),
        whatsapp_number: booking.whatsapp_number.inner().clone(),
    };

    // 2. Fill trip details into the template unless the caller overrode them
    let mut subs = req.substitutions;
    subs.entry("tripName".to_string())
        .or_insert_with(|| booking.trip_name.clone());
    subs.entry("date".to_string())
        .or_insert_with(|| booking.travel_date.format("%d %b %Y").to_string());
    subs.entry("guests".to_string())
        .or_insert_with(|| booking.guests.to_string());
    if let Some(amount) = booking.total_amount {
        subs.entry("amount".to_string())
            .or_insert_with(|| format!("₹{}", amount));
    }

    // 3. Dispatch through the configured transports
    let request = build_lead_request(&contact, &req.template_key, &subs)?;
    let body = request.message.clone().unwrap_or_default();
    let result = state.relay.send(&request).await;

    // 4. Record the outcome in the delivery log
    match &result {
        Ok(receipt) => {
            let _ = state
                .messages
                .log_sent(
                    &receipt.phone,
                    &body,
                    Some(&req.template_key),
                    &receipt.message_id,
                    &claims.sub,
                )
                .await;
        }
        Err(err) => {
            let _ = state
                .messages
                .log_failed(
                    &request.phone_number,
                    &body,
                    Some(&req.template_key),
                    &err.to_string(),
                    &claims.sub,
                )
                .await;
        }
    }

    let receipt = result?;
    Ok(Json(NotifyLeadResponse {
        success: true,
        message_id: receipt.message_id,
    }))
}
