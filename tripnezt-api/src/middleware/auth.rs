use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// JWT Claims
// ============================================================================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub status: String,
    pub exp: usize,
}

fn bearer_token(req: &Request) -> Result<&str, AppError> {
    req.headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(|| {
            AppError::AuthenticationError("You must be logged in to call this endpoint".to_string())
        })
}

pub fn decode_claims(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::AuthenticationError("Invalid or expired token".to_string()))
}

// ============================================================================
// Authenticated-user middleware
// ============================================================================

pub async fn user_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // 1. Extract and decode the token
    let token = bearer_token(&req)?;
    let claims = decode_claims(token, &state.auth.secret)?;

    // 2. Blocked accounts lose access everywhere
    if claims.status == "blocked" {
        return Err(AppError::AuthorizationError(
            "Your account has been blocked".to_string(),
        ));
    }

    // 3. Inject claims into request extensions
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

// ============================================================================
// Admin middleware
// ============================================================================

pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // 1. Extract and decode the token
    let token = bearer_token(&req)?;
    let claims = decode_claims(token, &state.auth.secret)?;

    // 2. Admin role only counts once approved; the primary admin
    //    bypasses the approval gate
    let is_primary = claims
        .email
        .eq_ignore_ascii_case(&state.auth.primary_admin_email);
    if claims.role != "admin" || (claims.status != "approved" && !is_primary) {
        return Err(AppError::AuthorizationError(
            "Admin access required".to_string(),
        ));
    }

    // 3. Inject claims
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
