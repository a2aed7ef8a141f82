//! Application configuration.
//!
//! Every setting is read once at startup into [`AppConfig`] and handed to
//! [`AppState`](crate::state::AppState). Request handling never touches the
//! environment.
//!
//! # Environment Variables
//!
//! | Variable | Used by |
//! |----------|---------|
//! | `SUPABASE_URL`, `SUPABASE_ANON_KEY`, `SUPABASE_SERVICE_ROLE_KEY` | [`StoreConfig`] |
//! | `SUPABASE_JWT_SECRET`, `JWT_AUDIENCE`, `SESSION_COOKIE_NAME` | [`JwtConfig`] |
//! | `ALLOWED_ORIGINS` | [`CorsConfig`] |
//! | `RATE_LIMIT_*` | [`RateLimitConfig`] |
//! | `HOST`, `PORT`, `METRICS_PORT`, `SERVICE_NAME`, `ENABLED_SERVICES`, `MAX_UPLOAD_BYTES` | [`ServerConfig`] |
//!
//! # Example
//!
//! ```ignore
//! use aula::config::AppConfig;
//!
//! dotenvy::dotenv().ok();
//! let config = AppConfig::from_env()?;
//! println!("listening on {}", config.server.bind_address());
//! ```

pub use aula_config::{
    ConfigError, CorsConfig, JwtConfig, RateLimitConfig, ServerConfig, Service, StoreConfig,
    StoreTimeouts,
};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub jwt: JwtConfig,
    pub store: StoreConfig,
    pub cors: CorsConfig,
    pub rate_limit: RateLimitConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    /// Loads every section.
    ///
    /// # Errors
    ///
    /// Fails when the store URL or keys, or the token secret, are missing,
    /// or when `ENABLED_SERVICES` names an unknown service.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            jwt: JwtConfig::from_env()?,
            store: StoreConfig::from_env()?,
            cors: CorsConfig::from_env(),
            rate_limit: RateLimitConfig::from_env(),
            server: ServerConfig::from_env()?,
        })
    }
}
