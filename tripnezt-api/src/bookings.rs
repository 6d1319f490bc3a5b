use axum::{extract::State, Extension, Json};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::{decode_claims, Claims};
use crate::state::AppState;
use tripnezt_domain::booking::{Booking, BookingRequest, BookingStatus};
use tripnezt_relay::phone;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitBookingRequest {
    pub trip_id: Uuid,
    pub full_name: String,
    pub whatsapp_number: String,
    pub travel_date: NaiveDate,
    pub guests: i32,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitBookingResponse {
    pub booking_id: Uuid,
    pub status: BookingStatus,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/bookings
/// Submit a booking request; the admission engine assigns the initial status.
pub async fn submit_booking(
    State(state): State<AppState>,
    headers: axum::http::HeaderMap,
    Json(req): Json<SubmitBookingRequest>,
) -> Result<Json<SubmitBookingResponse>, AppError> {
    // 1. Validate
    if req.full_name.trim().is_empty() {
        return Err(AppError::ValidationError("Full name is required".to_string()));
    }
    if req.guests < 1 {
        return Err(AppError::ValidationError(
            "Guest count must be at least 1".to_string(),
        ));
    }
    phone::validate(&req.whatsapp_number)?;
    let normalized_phone = phone::normalize(&req.whatsapp_number);

    // 2. Submissions may be authenticated or guest
    let user_id = headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .and_then(|token| decode_claims(token, &state.auth.secret).ok())
        .and_then(|claims| Uuid::parse_str(&claims.sub).ok());

    // 3. Admit: decision, insert and seat commit happen in one transaction
    let booking_request = BookingRequest {
        full_name: req.full_name,
        whatsapp_number: normalized_phone,
        notes: req.notes,
        travel_date: req.travel_date,
        guests: req.guests,
    };

    let booking = state
        .bookings
        .submit(req.trip_id, user_id, &booking_request)
        .await?;

    Ok(Json(SubmitBookingResponse {
        booking_id: booking.id,
        status: booking.status,
    }))
}

/// GET /v1/bookings/mine
/// Bookings belonging to the authenticated user.
pub async fn my_bookings(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<Booking>>, AppError> {
    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| AppError::AuthorizationError("Guest sessions have no bookings".to_string()))?;

    let bookings = state.bookings.list_for_user(user_id).await?;
    Ok(Json(bookings))
}
