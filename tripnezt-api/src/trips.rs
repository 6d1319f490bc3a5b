use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;
use tripnezt_domain::trip::{
    DurationType, ItineraryDay, Trip, DEFAULT_WAITLIST_THRESHOLD, GALLERY_MAX,
};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripPayload {
    pub title: String,
    pub location: String,
    #[serde(default)]
    pub state: String,
    pub price: Option<i32>,
    #[serde(default)]
    pub duration: i32,
    pub duration_type: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub highlights: Vec<String>,
    #[serde(default)]
    pub cover_image: String,
    #[serde(default)]
    pub gallery: Vec<String>,
    #[serde(default)]
    pub itinerary: Vec<ItineraryDay>,
    pub total_seats: Option<i32>,
    #[serde(default)]
    pub auto_approve: bool,
    pub waitlist_threshold: Option<i32>,
}

impl TripPayload {
    fn validate(&self) -> Result<DurationType, AppError> {
        if self.title.trim().is_empty() {
            return Err(AppError::ValidationError("Title is required".to_string()));
        }
        if self.gallery.len() > GALLERY_MAX {
            return Err(AppError::ValidationError(format!(
                "Gallery is limited to {} images",
                GALLERY_MAX
            )));
        }
        if let Some(total) = self.total_seats {
            if total < 0 {
                return Err(AppError::ValidationError(
                    "Total seats cannot be negative".to_string(),
                ));
            }
        }
        DurationType::parse(&self.duration_type).ok_or_else(|| {
            AppError::ValidationError(format!("Unknown duration type '{}'", self.duration_type))
        })
    }
}

// ============================================================================
// Public Handlers
// ============================================================================

/// GET /v1/trips
pub async fn list_trips(State(state): State<AppState>) -> Result<Json<Vec<Trip>>, AppError> {
    let trips = state.trips.list().await?;
    Ok(Json(trips))
}

/// GET /v1/trips/{id}
pub async fn get_trip(
    State(state): State<AppState>,
    Path(trip_id): Path<Uuid>,
) -> Result<Json<Trip>, AppError> {
    let trip = state
        .trips
        .get(trip_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("Trip '{}' not found", trip_id)))?;
    Ok(Json(trip))
}

// ============================================================================
// Admin Handlers
// ============================================================================

/// POST /v1/admin/trips
pub async fn create_trip(
    State(state): State<AppState>,
    Json(payload): Json<TripPayload>,
) -> Result<Json<Trip>, AppError> {
    let duration_type = payload.validate()?;

    let now = Utc::now();
    let trip = Trip {
        id: Uuid::new_v4(),
        title: payload.title,
        location: payload.location,
        state: payload.state,
        price: payload.price,
        duration: payload.duration,
        duration_type,
        category: payload.category,
        description: payload.description,
        highlights: payload.highlights,
        cover_image: payload.cover_image,
        gallery: payload.gallery,
        itinerary: payload.itinerary,
        total_seats: payload.total_seats,
        booked_seats: 0,
        auto_approve: payload.auto_approve,
        waitlist_threshold: payload.waitlist_threshold.unwrap_or(DEFAULT_WAITLIST_THRESHOLD),
        created_at: now,
        updated_at: now,
    };

    state.trips.create(&trip).await?;
    Ok(Json(trip))
}

/// PUT /v1/admin/trips/{id}
pub async fn update_trip(
    State(state): State<AppState>,
    Path(trip_id): Path<Uuid>,
    Json(payload): Json<TripPayload>,
) -> Result<Json<Trip>, AppError> {
    let duration_type = payload.validate()?;

    // The seat counter survives edits; only the booking flows touch it
    let existing = state
        .trips
        .get(trip_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("Trip '{}' not found", trip_id)))?;

    let trip = Trip {
        id: trip_id,
        title: payload.title,
        location: payload.location,
        state: payload.state,
        price: payload.price,
        duration: payload.duration,
        duration_type,
        category: payload.category,
        description: payload.description,
        highlights: payload.highlights,
        cover_image: payload.cover_image,
        gallery: payload.gallery,
        itinerary: payload.itinerary,
        total_seats: payload.total_seats,
        booked_seats: existing.booked_seats,
        auto_approve: payload.auto_approve,
        waitlist_threshold: payload.waitlist_threshold.unwrap_or(existing.waitlist_threshold),
        created_at: existing.created_at,
        updated_at: Utc::now(),
    };

    state.trips.update(&trip).await?;
    Ok(Json(trip))
}

/// DELETE /v1/admin/trips/{id}
pub async fn delete_trip(
    State(state): State<AppState>,
    Path(trip_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.trips.delete(trip_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
