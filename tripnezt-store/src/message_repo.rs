use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::StoreError;

pub struct MessageRepository {
    pool: PgPool,
}

/// A delivery-log row pending a status sync.
#[derive(Debug, sqlx::FromRow)]
pub struct PendingMessage {
    pub id: Uuid,
    pub message_id: String,
    pub status: String,
}

impl MessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn log_sent(
        &self,
        phone: &str,
        body: &str,
        template_name: Option<&str>,
        message_id: &str,
        sent_by: &str,
    ) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO whatsapp_messages (id, phone, body, template_name, message_id, status, sent_by, sent_at)
            VALUES ($1, $2, $3, $4, $5, 'sent', $6, $7)
            "#,
        )
        .bind(id)
        .bind(phone)
        .bind(body)
        .bind(template_name)
        .bind(message_id)
        .bind(sent_by)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    pub async fn log_failed(
        &self,
        phone: &str,
        body: &str,
        template_name: Option<&str>,
        error: &str,
        sent_by: &str,
    ) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO whatsapp_messages (id, phone, body, template_name, status, error, sent_by, sent_at)
            VALUES ($1, $2, $3, $4, 'failed', $5, $6, $7)
            "#,
        )
        .bind(id)
        .bind(phone)
        .bind(body)
        .bind(template_name)
        .bind(error)
        .bind(sent_by)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(id)
    }

    /// Most recent rows still marked `sent`, for the status sync worker.
    pub async fn list_pending_sync(&self, limit: i64) -> Result<Vec<PendingMessage>, StoreError> {
        let rows = sqlx::query_as::<_, PendingMessage>(
            r#"
            SELECT id, message_id, status FROM whatsapp_messages
            WHERE status = 'sent' AND message_id <> ''
            ORDER BY sent_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn update_status(&self, id: Uuid, status: &str) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE whatsapp_messages SET status = $1, last_updated = $2 WHERE id = $3",
        )
        .bind(status)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
