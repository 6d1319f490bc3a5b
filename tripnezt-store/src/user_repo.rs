use sqlx::PgPool;
use uuid::Uuid;

use crate::error::StoreError;
use tripnezt_domain::user::{Role, UserProfile, UserStatus};

pub struct UserRepository {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    status: String,
    phone: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl UserRow {
    fn into_profile(self) -> Result<(UserProfile, String), StoreError> {
        let role = Role::parse(&self.role)
            .ok_or_else(|| StoreError::Corrupt(format!("user role '{}'", self.role)))?;
        let status = UserStatus::parse(&self.status)
            .ok_or_else(|| StoreError::Corrupt(format!("user status '{}'", self.status)))?;

        Ok((
            UserProfile {
                id: self.id,
                name: self.name,
                email: self.email,
                role,
                status,
                phone: self.phone,
                created_at: self.created_at,
            },
            self.password_hash,
        ))
    }
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        profile: &UserProfile,
        password_hash: &str,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, role, status, phone, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(profile.id)
        .bind(&profile.name)
        .bind(&profile.email)
        .bind(password_hash)
        .bind(profile.role.as_str())
        .bind(profile.status.as_str())
        .bind(&profile.phone)
        .bind(profile.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                let unique_violation = e
                    .as_database_error()
                    .and_then(|db| db.code())
                    .map(|code| code == "23505")
                    .unwrap_or(false);
                if unique_violation {
                    Err(StoreError::DuplicateEmail(profile.email.clone()))
                } else {
                    Err(e.into())
                }
            }
        }
    }

    pub async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<(UserProfile, String)>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        row.map(UserRow::into_profile).transpose()
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<UserProfile>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.into_profile().map(|(p, _)| p)).transpose()
    }

    pub async fn list(&self) -> Result<Vec<UserProfile>, StoreError> {
        let rows = sqlx::query_as::<_, UserRow>("SELECT * FROM users ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|r| r.into_profile().map(|(p, _)| p))
            .collect()
    }

    pub async fn update_status(&self, id: Uuid, status: UserStatus) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE users SET status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("User", id));
        }
        Ok(())
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("User", id));
        }
        Ok(())
    }
}
