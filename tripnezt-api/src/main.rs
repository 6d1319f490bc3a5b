use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tripnezt_api::{app, state::AuthSettings, worker, AppState};
use tripnezt_relay::{CloudApiClient, CloudApiConfig, DirectTransport, RestTransport, Transport, TransportSelector};
use tripnezt_store::{
    AuditRepository, BookingRepository, DbClient, MessageRepository, RedisClient, TripRepository,
    UserRepository,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tripnezt_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = tripnezt_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting TripNezt API on port {}", config.server.port);

    // Postgres
    let db = DbClient::new(&config.database.url)
        .await
        .expect("Failed to connect to Postgres");
    db.migrate().await.expect("Failed to run migrations");

    // Redis (rate-limit counters)
    let redis = RedisClient::new(&config.redis.url)
        .await
        .expect("Failed to connect to Redis");

    // WhatsApp Cloud API gateway
    let gateway = Arc::new(CloudApiClient::new(CloudApiConfig {
        api_base: config.whatsapp.api_base.clone(),
        api_version: config.whatsapp.api_version.clone(),
        access_token: config.whatsapp.access_token.clone(),
        phone_number_id: config.whatsapp.phone_number_id.clone(),
        business_account_id: config.whatsapp.business_account_id.clone(),
        timeout: Duration::from_secs(config.whatsapp.timeout_seconds),
        max_retries: config.whatsapp.max_retries,
        retry_delay: Duration::from_millis(config.whatsapp.retry_delay_ms),
    }));

    // Transports: prefer the external relay endpoint when configured,
    // fall back to the in-process path
    let rest_transport: Option<Arc<dyn Transport>> = config
        .relay
        .rest_base_url
        .clone()
        .map(|url| Arc::new(RestTransport::new(url)) as Arc<dyn Transport>);
    let direct_transport: Arc<dyn Transport> = Arc::new(DirectTransport::new(gateway.clone()));
    let relay = Arc::new(TransportSelector::new(rest_transport, direct_transport));

    let messages = Arc::new(MessageRepository::new(db.pool.clone()));

    let app_state = AppState {
        trips: Arc::new(TripRepository::new(db.pool.clone())),
        bookings: Arc::new(BookingRepository::new(db.pool.clone())),
        users: Arc::new(UserRepository::new(db.pool.clone())),
        messages: messages.clone(),
        audit: Arc::new(AuditRepository::new(db.pool.clone())),
        redis: Arc::new(redis),
        gateway: gateway.clone(),
        relay,
        auth: AuthSettings {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
            primary_admin_email: config.auth.primary_admin_email.clone(),
        },
        rate_limit: config.rate_limit.clone(),
        allowed_origins: config.cors.allowed_origins.clone(),
        dev_mode: config.server.is_development(),
    };

    // Delivery-log status sync
    tokio::spawn(worker::start_message_status_worker(gateway, messages));

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .unwrap();
}
