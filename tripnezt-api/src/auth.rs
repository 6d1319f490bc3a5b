use axum::{extract::State, routing::post, Json, Router};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::auth::Claims;
use crate::state::AppState;
use tripnezt_domain::user::{Role, UserProfile, UserStatus};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
    #[serde(default)]
    pub apply_as_admin: bool,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
struct AuthResponse {
    token: String,
    user: UserProfile,
}

#[derive(Debug, Serialize)]
struct GuestAuthResponse {
    token: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/auth/signup", post(signup))
        .route("/v1/auth/login", post(login))
        .route("/v1/auth/guest", post(login_guest))
}

fn issue_token(state: &AppState, profile: &UserProfile) -> Result<String, AppError> {
    let claims = Claims {
        sub: profile.id.to_string(),
        email: profile.email.clone(),
        name: profile.name.clone(),
        role: profile.role.as_str().to_string(),
        status: profile.status.as_str().to_string(),
        exp: (Utc::now() + Duration::seconds(state.auth.expiration as i64)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.auth.secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(format!("Token encoding failed: {}", e)))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/auth/signup
async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    if req.password.len() < 6 {
        return Err(AppError::ValidationError(
            "Password must be at least 6 characters".to_string(),
        ));
    }
    if !req.email.contains('@') {
        return Err(AppError::ValidationError("Invalid email address".to_string()));
    }

    // Admin applications sit in 'pending' until approved; the primary
    // admin identity skips the queue
    let is_primary = req
        .email
        .eq_ignore_ascii_case(&state.auth.primary_admin_email);
    let (role, status) = if req.apply_as_admin {
        (
            Role::Admin,
            if is_primary {
                UserStatus::Approved
            } else {
                UserStatus::Pending
            },
        )
    } else {
        (Role::User, UserStatus::Active)
    };

    let profile = UserProfile {
        id: Uuid::new_v4(),
        name: req.name,
        email: req.email,
        role,
        status,
        phone: req.phone,
        created_at: Utc::now(),
    };

    let password_hash = bcrypt::hash(&req.password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::InternalServerError(format!("Hash failed: {}", e)))?;

    state.users.create(&profile, &password_hash).await?;

    let token = issue_token(&state, &profile)?;
    tracing::info!("User {} signed up as {}", profile.id, profile.role.as_str());

    Ok(Json(AuthResponse {
        token,
        user: profile,
    }))
}

/// POST /v1/auth/login
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    // 1. Look up the account
    let (profile, password_hash) = state
        .users
        .find_by_email(&req.email)
        .await?
        .ok_or_else(|| AppError::AuthenticationError("Invalid email or password".to_string()))?;

    // 2. Verify the password
    let valid = bcrypt::verify(&req.password, &password_hash)
        .map_err(|e| AppError::InternalServerError(format!("Hash verification failed: {}", e)))?;
    if !valid {
        return Err(AppError::AuthenticationError(
            "Invalid email or password".to_string(),
        ));
    }

    // 3. Gate checks
    if profile.is_blocked() {
        return Err(AppError::AuthorizationError(
            "Your account has been blocked".to_string(),
        ));
    }
    if profile.role == Role::Admin && !profile.can_operate(&state.auth.primary_admin_email) {
        return Err(AppError::AuthorizationError(
            "Your admin account is pending approval. Please contact the primary admin".to_string(),
        ));
    }

    let token = issue_token(&state, &profile)?;

    Ok(Json(AuthResponse {
        token,
        user: profile,
    }))
}

/// POST /v1/auth/guest
async fn login_guest(State(state): State<AppState>) -> Result<Json<GuestAuthResponse>, AppError> {
    let claims = Claims {
        sub: format!("guest-{}", Uuid::new_v4()),
        email: String::new(),
        name: "Guest".to_string(),
        role: "guest".to_string(),
        status: "active".to_string(),
        exp: (Utc::now() + Duration::seconds(state.auth.expiration as i64)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.auth.secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(format!("Token encoding failed: {}", e)))?;

    Ok(Json(GuestAuthResponse { token }))
}
