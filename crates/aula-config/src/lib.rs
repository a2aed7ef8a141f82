//! # Aula Config
//!
//! Configuration types for the Aula services, loaded from environment
//! variables once at startup:
//!
//! - [`jwt`]: Identity token verification settings
//! - [`store`]: Hosted backend URL, keys and call timeouts
//! - [`cors`]: CORS (Cross-Origin Resource Sharing) configuration
//! - [`rate_limit`]: API rate limiting configuration
//! - [`server`]: Bind address, mounted services and upload limits
//!
//! # Example
//!
//! ```ignore
//! use aula_config::{JwtConfig, StoreConfig, CorsConfig, RateLimitConfig, ServerConfig};
//!
//! let jwt_config = JwtConfig::from_env()?;
//! let store_config = StoreConfig::from_env()?;
//! let cors_config = CorsConfig::from_env();
//! let rate_limit_config = RateLimitConfig::from_env();
//! let server_config = ServerConfig::from_env()?;
//! ```

pub mod cors;
pub mod error;
pub mod jwt;
pub mod rate_limit;
pub mod server;
pub mod store;

/// Printed in place of keys and secrets by `Debug` impls.
pub const REDACTED: &str = "[redacted]";

// Re-export commonly used types at crate root
pub use cors::CorsConfig;
pub use error::ConfigError;
pub use jwt::JwtConfig;
pub use rate_limit::RateLimitConfig;
pub use server::{Service, ServerConfig};
pub use store::{StoreConfig, StoreTimeouts};
