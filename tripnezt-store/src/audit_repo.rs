use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::error::StoreError;
use tripnezt_domain::audit::AuditEntry;

/// Insert an audit entry inside an open transaction so the record commits
/// with the state change it describes.
pub async fn insert_in_tx(
    tx: &mut Transaction<'_, Postgres>,
    entry: &AuditEntry,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO audit_logs (id, action, booking_id, old_status, new_status, trip_name, guests, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(entry.id)
    .bind(&entry.action)
    .bind(entry.booking_id)
    .bind(&entry.old_status)
    .bind(&entry.new_status)
    .bind(&entry.trip_name)
    .bind(entry.guests)
    .bind(entry.created_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

pub struct AuditRepository {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct AuditRow {
    id: Uuid,
    action: String,
    booking_id: Uuid,
    old_status: String,
    new_status: String,
    trip_name: String,
    guests: i32,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl AuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, limit: i64) -> Result<Vec<AuditEntry>, StoreError> {
        let rows = sqlx::query_as::<_, AuditRow>(
            "SELECT * FROM audit_logs ORDER BY created_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| AuditEntry {
                id: r.id,
                action: r.action,
                booking_id: r.booking_id,
                old_status: r.old_status,
                new_status: r.new_status,
                trip_name: r.trip_name,
                guests: r.guests,
                created_at: r.created_at,
            })
            .collect())
    }
}
