use std::sync::Arc;

use tripnezt_relay::{CloudApiClient, TransportSelector};
use tripnezt_store::app_config::RateLimitConfig;
use tripnezt_store::{
    AuditRepository, BookingRepository, MessageRepository, RedisClient, TripRepository,
    UserRepository,
};

#[derive(Clone)]
pub struct AuthSettings {
    pub secret: String,
    pub expiration: u64,
    pub primary_admin_email: String,
}

#[derive(Clone)]
pub struct AppState {
    pub trips: Arc<TripRepository>,
    pub bookings: Arc<BookingRepository>,
    pub users: Arc<UserRepository>,
    pub messages: Arc<MessageRepository>,
    pub audit: Arc<AuditRepository>,
    pub redis: Arc<RedisClient>,
    pub gateway: Arc<CloudApiClient>,
    pub relay: Arc<TransportSelector>,
    pub auth: AuthSettings,
    pub rate_limit: RateLimitConfig,
    pub allowed_origins: String,
    pub dev_mode: bool,
}
