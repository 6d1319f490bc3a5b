use sqlx::PgPool;
use uuid::Uuid;

use crate::error::StoreError;
use tripnezt_domain::trip::{DurationType, Trip};

pub struct TripRepository {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct TripRow {
    id: Uuid,
    title: String,
    location: String,
    state: String,
    price: Option<i32>,
    duration: i32,
    duration_type: String,
    category: String,
    description: String,
    highlights: serde_json::Value,
    cover_image: String,
    gallery: serde_json::Value,
    itinerary: serde_json::Value,
    total_seats: Option<i32>,
    booked_seats: i32,
    auto_approve: bool,
    waitlist_threshold: i32,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl TripRow {
    fn into_trip(self) -> Result<Trip, StoreError> {
        let duration_type = DurationType::parse(&self.duration_type)
            .ok_or_else(|| StoreError::Corrupt(format!("duration_type '{}'", self.duration_type)))?;

        Ok(Trip {
            id: self.id,
            title: self.title,
            location: self.location,
            state: self.state,
            price: self.price,
            duration: self.duration,
            duration_type,
            category: self.category,
            description: self.description,
            highlights: serde_json::from_value(self.highlights)
                .map_err(|e| StoreError::Corrupt(format!("highlights: {}", e)))?,
            cover_image: self.cover_image,
            gallery: serde_json::from_value(self.gallery)
                .map_err(|e| StoreError::Corrupt(format!("gallery: {}", e)))?,
            itinerary: serde_json::from_value(self.itinerary)
                .map_err(|e| StoreError::Corrupt(format!("itinerary: {}", e)))?,
            total_seats: self.total_seats,
            booked_seats: self.booked_seats,
            auto_approve: self.auto_approve,
            waitlist_threshold: self.waitlist_threshold,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl TripRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, trip: &Trip) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO trips (id, title, location, state, price, duration, duration_type,
                               category, description, highlights, cover_image, gallery, itinerary,
                               total_seats, booked_seats, auto_approve, waitlist_threshold,
                               created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            "#,
        )
        .bind(trip.id)
        .bind(&trip.title)
        .bind(&trip.location)
        .bind(&trip.state)
        .bind(trip.price)
        .bind(trip.duration)
        .bind(trip.duration_type.as_str())
        .bind(&trip.category)
        .bind(&trip.description)
        .bind(serde_json::json!(trip.highlights))
        .bind(&trip.cover_image)
        .bind(serde_json::json!(trip.gallery))
        .bind(serde_json::json!(trip.itinerary))
        .bind(trip.total_seats)
        .bind(trip.booked_seats)
        .bind(trip.auto_approve)
        .bind(trip.waitlist_threshold)
        .bind(trip.created_at)
        .bind(trip.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Full-row update of the editable fields. The seat counter is only
    /// touched through the booking flows.
    pub async fn update(&self, trip: &Trip) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE trips
            SET title = $1, location = $2, state = $3, price = $4, duration = $5,
                duration_type = $6, category = $7, description = $8, highlights = $9,
                cover_image = $10, gallery = $11, itinerary = $12, total_seats = $13,
                auto_approve = $14, waitlist_threshold = $15, updated_at = NOW()
            WHERE id = $16
            "#,
        )
        .bind(&trip.title)
        .bind(&trip.location)
        .bind(&trip.state)
        .bind(trip.price)
        .bind(trip.duration)
        .bind(trip.duration_type.as_str())
        .bind(&trip.category)
        .bind(&trip.description)
        .bind(serde_json::json!(trip.highlights))
        .bind(&trip.cover_image)
        .bind(serde_json::json!(trip.gallery))
        .bind(serde_json::json!(trip.itinerary))
        .bind(trip.total_seats)
        .bind(trip.auto_approve)
        .bind(trip.waitlist_threshold)
        .bind(trip.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Trip", trip.id));
        }
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM trips WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("Trip", id));
        }
        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Trip>, StoreError> {
        let row = sqlx::query_as::<_, TripRow>("SELECT * FROM trips WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(TripRow::into_trip).transpose()
    }

    pub async fn list(&self) -> Result<Vec<Trip>, StoreError> {
        let rows = sqlx::query_as::<_, TripRow>("SELECT * FROM trips ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(TripRow::into_trip).collect()
    }
}
