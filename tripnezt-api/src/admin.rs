use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::state::AppState;
use tripnezt_domain::audit::AuditEntry;
use tripnezt_domain::user::{UserProfile, UserStatus};

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ChangeUserStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct AuditLogQuery {
    pub limit: Option<i64>,
}

// ============================================================================
// User Management Handlers
// ============================================================================

/// GET /v1/admin/users
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<UserProfile>>, AppError> {
    let users = state.users.list().await?;
    Ok(Json(users))
}

/// POST /v1/admin/users/{id}/status
/// Approve, reject, block or unblock an account.
pub async fn change_user_status(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<ChangeUserStatusRequest>,
) -> Result<Json<UserProfile>, AppError> {
    let status = UserStatus::parse(&req.status)
        .ok_or_else(|| AppError::ValidationError(format!("Unknown status '{}'", req.status)))?;

    state.users.update_status(user_id, status).await?;

    let user = state
        .users
        .get(user_id)
        .await?
        .ok_or_else(|| AppError::NotFoundError(format!("User '{}' not found", user_id)))?;
    Ok(Json(user))
}

/// DELETE /v1/admin/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.users.delete(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Audit Log Handlers
// ============================================================================

/// GET /v1/admin/audit-logs
pub async fn list_audit_logs(
    State(state): State<AppState>,
    Query(query): Query<AuditLogQuery>,
) -> Result<Json<Vec<AuditEntry>>, AppError> {
    let limit = query.limit.unwrap_or(100).clamp(1, 500);
    let entries = state.audit.list(limit).await?;
    Ok(Json(entries))
}
