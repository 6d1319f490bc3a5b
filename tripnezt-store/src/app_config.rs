use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub auth: AuthConfig,
    pub whatsapp: WhatsAppConfig,
    pub relay: RelayConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    #[serde(default = "default_environment")]
    pub environment: String,
}

fn default_environment() -> String {
    "development".to_string()
}

impl ServerConfig {
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub jwt_expiration_seconds: u64,
    pub primary_admin_email: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WhatsAppConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub phone_number_id: String,
    #[serde(default)]
    pub business_account_id: Option<String>,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_api_base() -> String {
    "https://graph.facebook.com".to_string()
}

fn default_api_version() -> String {
    "v18.0".to_string()
}

fn default_timeout_seconds() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

#[derive(Debug, Deserialize, Clone)]
pub struct RelayConfig {
    /// Base URL of an external relay endpoint. When set, the REST
    /// transport is preferred for lead messaging.
    #[serde(default)]
    pub rest_base_url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RateLimitConfig {
    #[serde(default = "default_rate_limit_requests")]
    pub max_requests: i64,
    #[serde(default = "default_rate_limit_window")]
    pub window_seconds: i64,
}

fn default_rate_limit_requests() -> i64 {
    10
}

fn default_rate_limit_window() -> i64 {
    60
}

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: String,
}

fn default_allowed_origins() -> String {
    "*".to_string()
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            // Start off by merging in the "default" configuration file
            .add_source(config::File::with_name("config/default"))
            // Add in the current environment file; optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Add in settings from the environment (with a prefix of TRIPNEZT)
            // Eg.. `TRIPNEZT__SERVER__PORT=9090` would set server.port
            .add_source(config::Environment::with_prefix("TRIPNEZT").separator("__"))
            .build()?;

        let mut cfg: Config = s.try_deserialize()?;

        // The deployment platforms this service replaces configure the
        // WhatsApp integration through these exact variable names.
        if let Ok(v) = env::var("WHATSAPP_ACCESS_TOKEN") {
            cfg.whatsapp.access_token = v;
        }
        if let Ok(v) = env::var("WHATSAPP_PHONE_NUMBER_ID") {
            cfg.whatsapp.phone_number_id = v;
        }
        if let Ok(v) = env::var("WHATSAPP_BUSINESS_ACCOUNT_ID") {
            cfg.whatsapp.business_account_id = Some(v);
        }
        if let Ok(v) = env::var("ALLOWED_ORIGINS") {
            cfg.cors.allowed_origins = v;
        }

        Ok(cfg)
    }
}
