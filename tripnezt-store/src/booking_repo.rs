use chrono::Utc;
use sqlx::PgPool;
use tripnezt_shared::Masked;
use uuid::Uuid;

use crate::audit_repo;
use crate::error::StoreError;
use tripnezt_domain::admission::decide_admission;
use tripnezt_domain::audit::AuditEntry;
use tripnezt_domain::booking::{Booking, BookingRequest, BookingStatus};
use tripnezt_domain::transition::{seat_adjustment, TransitionTable};
use tripnezt_domain::trip::SeatSnapshot;

pub struct BookingRepository {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    trip_id: Uuid,
    trip_name: String,
    trip_price: Option<i32>,
    user_id: Option<Uuid>,
    full_name: String,
    whatsapp_number: String,
    notes: Option<String>,
    travel_date: chrono::NaiveDate,
    guests: i32,
    total_amount: Option<i32>,
    status: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl BookingRow {
    fn into_booking(self) -> Result<Booking, StoreError> {
        let status = BookingStatus::parse(&self.status)
            .ok_or_else(|| StoreError::Corrupt(format!("booking status '{}'", self.status)))?;

        Ok(Booking {
            id: self.id,
            trip_id: self.trip_id,
            trip_name: self.trip_name,
            trip_price: self.trip_price,
            user_id: self.user_id,
            full_name: self.full_name,
            whatsapp_number: Masked(self.whatsapp_number),
            notes: self.notes,
            travel_date: self.travel_date,
            guests: self.guests,
            total_amount: self.total_amount,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct TripSeatsRow {
    title: String,
    price: Option<i32>,
    total_seats: Option<i32>,
    booked_seats: i32,
    auto_approve: bool,
    waitlist_threshold: i32,
}

impl BookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Admit a new booking.
    ///
    /// The availability read, the admission decision, the booking insert
    /// and the conditional seat increment run as one transaction with the
    /// trip row locked, so concurrent submissions cannot overcommit seats.
    pub async fn submit(
        &self,
        trip_id: Uuid,
        user_id: Option<Uuid>,
        request: &BookingRequest,
    ) -> Result<Booking, StoreError> {
        let mut tx = self.pool.begin().await?;

        // 1. Lock the trip row and read the seat counters
        let trip = sqlx::query_as::<_, TripSeatsRow>(
            r#"
            SELECT title, price, total_seats, booked_seats, auto_approve, waitlist_threshold
            FROM trips WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(trip_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| StoreError::not_found("Trip", trip_id))?;

        // 2. Decide the initial status
        let snapshot = SeatSnapshot {
            total_seats: trip.total_seats,
            booked_seats: trip.booked_seats,
            auto_approve: trip.auto_approve,
            waitlist_threshold: trip.waitlist_threshold,
        };
        let status = decide_admission(&snapshot, request.guests);

        // 3. Persist the booking with a denormalized trip snapshot
        let now = Utc::now();
        let booking = Booking {
            id: Uuid::new_v4(),
            trip_id,
            trip_name: trip.title,
            trip_price: trip.price,
            user_id,
            full_name: request.full_name.clone(),
            whatsapp_number: Masked(request.whatsapp_number.clone()),
            notes: request.notes.clone(),
            travel_date: request.travel_date,
            guests: request.guests,
            total_amount: request.total_amount(trip.price),
            status,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO bookings (id, trip_id, trip_name, trip_price, user_id, full_name,
                                  whatsapp_number, notes, travel_date, guests, total_amount,
                                  status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(booking.id)
        .bind(booking.trip_id)
        .bind(&booking.trip_name)
        .bind(booking.trip_price)
        .bind(booking.user_id)
        .bind(&booking.full_name)
        .bind(booking.whatsapp_number.inner())
        .bind(&booking.notes)
        .bind(booking.travel_date)
        .bind(booking.guests)
        .bind(booking.total_amount)
        .bind(status.as_str())
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&mut *tx)
        .await?;

        // 4. Approved bookings commit their seats inside the same transaction
        if status == BookingStatus::Approved {
            sqlx::query(
                "UPDATE trips SET booked_seats = booked_seats + $1, updated_at = NOW() WHERE id = $2",
            )
            .bind(request.guests)
            .bind(trip_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::info!("Booking {} admitted as {}", booking.id, status);
        Ok(booking)
    }

    /// Move a lead to a new status.
    ///
    /// Status update, seat reconciliation and the audit record commit
    /// atomically. A move into Approved re-checks capacity under lock and
    /// fails with CapacityExceeded rather than overcommitting; a move out
    /// of Approved releases the seats, clamped at zero.
    pub async fn transition(
        &self,
        booking_id: Uuid,
        new_status: BookingStatus,
    ) -> Result<Booking, StoreError> {
        let mut tx = self.pool.begin().await?;

        // 1. Lock the booking row
        let row = sqlx::query_as::<_, BookingRow>(
            "SELECT * FROM bookings WHERE id = $1 FOR UPDATE",
        )
        .bind(booking_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| StoreError::not_found("Booking", booking_id))?;

        let old_status = BookingStatus::parse(&row.status)
            .ok_or_else(|| StoreError::Corrupt(format!("booking status '{}'", row.status)))?;

        // 2. Validate against the transition table
        TransitionTable::check(old_status, new_status)?;

        let updated_at = Utc::now();
        sqlx::query("UPDATE bookings SET status = $1, updated_at = $2 WHERE id = $3")
            .bind(new_status.as_str())
            .bind(updated_at)
            .bind(booking_id)
            .execute(&mut *tx)
            .await?;

        // 3. Seat reconciliation across the Approved boundary
        let delta = seat_adjustment(old_status, new_status, row.guests);
        if delta > 0 {
            let seats = sqlx::query_as::<_, (Option<i32>, i32)>(
                "SELECT total_seats, booked_seats FROM trips WHERE id = $1 FOR UPDATE",
            )
            .bind(row.trip_id)
            .fetch_optional(&mut *tx)
            .await?;

            // The trip may have been deleted; the lead keeps its snapshot
            if let Some((total_seats, booked_seats)) = seats {
                if let Some(total) = total_seats {
                    if booked_seats + delta > total {
                        return Err(StoreError::CapacityExceeded {
                            requested: delta,
                            available: total - booked_seats,
                        });
                    }
                }
                sqlx::query(
                    "UPDATE trips SET booked_seats = booked_seats + $1, updated_at = NOW() WHERE id = $2",
                )
                .bind(delta)
                .bind(row.trip_id)
                .execute(&mut *tx)
                .await?;
            }
        } else if delta < 0 {
            sqlx::query(
                "UPDATE trips SET booked_seats = GREATEST(booked_seats + $1, 0), updated_at = NOW() WHERE id = $2",
            )
            .bind(delta)
            .bind(row.trip_id)
            .execute(&mut *tx)
            .await?;
        }

        // 4. Audit record, co-committed with the status change
        let entry = AuditEntry::status_changed(
            booking_id,
            old_status.as_str(),
            new_status.as_str(),
            &row.trip_name,
            row.guests,
        );
        audit_repo::insert_in_tx(&mut tx, &entry).await?;

        tx.commit().await?;

        tracing::info!(
            "Booking {} moved {} -> {}",
            booking_id,
            old_status,
            new_status
        );

        let mut booking = row.into_booking()?;
        booking.status = new_status;
        booking.updated_at = updated_at;
        Ok(booking)
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Booking>, StoreError> {
        let row = sqlx::query_as::<_, BookingRow>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(BookingRow::into_booking).transpose()
    }

    pub async fn list(&self) -> Result<Vec<Booking>, StoreError> {
        let rows =
            sqlx::query_as::<_, BookingRow>("SELECT * FROM bookings ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter().map(BookingRow::into_booking).collect()
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<Booking>, StoreError> {
        let rows = sqlx::query_as::<_, BookingRow>(
            "SELECT * FROM bookings WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(BookingRow::into_booking).collect()
    }
}
