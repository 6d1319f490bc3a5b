use axum::{
    extract::{ConnectInfo, Request},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod admin;
pub mod auth;
pub mod bookings;
pub mod error;
pub mod leads;
pub mod middleware;
pub mod notifications;
pub mod state;
pub mod trips;
pub mod worker;

pub use state::AppState;

use crate::error::AppError;
use crate::middleware::auth::{admin_auth_middleware, user_auth_middleware};

pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.allowed_origins);

    let public = Router::new()
        .route("/v1/trips", get(trips::list_trips))
        .route("/v1/trips/{id}", get(trips::get_trip))
        .route("/v1/bookings", post(bookings::submit_booking))
        .merge(auth::routes());

    // The public relay endpoint carries its own rate limit
    let relay = Router::new()
        .route("/api/send-whatsapp", post(notifications::send_whatsapp))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    // The callable surface requires an authenticated caller
    let callable = Router::new()
        .route("/v1/messages/send", post(notifications::send_message))
        .route("/v1/messages/template", post(notifications::send_template))
        .route("/v1/messages/{id}/status", get(notifications::message_status))
        .route("/v1/bookings/mine", get(bookings::my_bookings))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            user_auth_middleware,
        ));

    let admin_routes = Router::new()
        .route("/v1/admin/leads", get(leads::list_leads))
        .route("/v1/admin/leads/{id}/status", post(leads::change_status))
        .route("/v1/admin/leads/{id}/notify", post(leads::notify_lead))
        .route("/v1/admin/trips", post(trips::create_trip))
        .route(
            "/v1/admin/trips/{id}",
            put(trips::update_trip).delete(trips::delete_trip),
        )
        .route("/v1/admin/users", get(admin::list_users))
        .route("/v1/admin/users/{id}/status", post(admin::change_user_status))
        .route("/v1/admin/users/{id}", delete(admin::delete_user))
        .route("/v1/admin/audit-logs", get(admin::list_audit_logs))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            admin_auth_middleware,
        ));

    Router::new()
        .merge(public)
        .merge(relay)
        .merge(callable)
        .merge(admin_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(allowed_origins: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if allowed_origins.trim() == "*" {
        cors.allow_origin(tower_http::cors::Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .split(',')
            .filter_map(|origin| origin.trim().parse().ok())
            .collect();
        cors.allow_origin(origins)
    }
}

/// Fixed-window limiter keyed by client IP, backed by Redis so the cap
/// holds across instances. Fails open when Redis is unreachable.
async fn rate_limit_middleware(
    axum::extract::State(state): axum::extract::State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ip = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|s| s.trim().to_string())
        .or_else(|| {
            req.extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ci| ci.0.ip().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string());

    let key = format!("ratelimit:{}", ip);
    match state
        .redis
        .check_rate_limit(&key, state.rate_limit.max_requests, state.rate_limit.window_seconds)
        .await
    {
        Ok(decision) if decision.allowed => Ok(next.run(req).await),
        Ok(decision) => Err(AppError::RateLimited {
            retry_after: decision.retry_after,
        }),
        Err(_) => Ok(next.run(req).await), // Fail open
    }
}
