//! Rate limiting configuration for the API.
//!
//! Limits are applied per peer IP with a token bucket:
//!
//! - Tokens are replenished every `per_second` seconds
//! - Each request consumes one token
//! - `burst_size` is the bucket capacity
//!
//! The file upload endpoint gets its own, stricter bucket because each call
//! may fan out into one large bulk insert.
//!
//! # Environment Variables
//!
//! - `RATE_LIMIT_ENABLED`: `false` disables the layer entirely (default: true)
//! - `RATE_LIMIT_GENERAL_PER_SECOND`: default 1
//! - `RATE_LIMIT_GENERAL_BURST_SIZE`: default 60
//! - `RATE_LIMIT_UPLOAD_PER_SECOND`: default 10
//! - `RATE_LIMIT_UPLOAD_BURST_SIZE`: default 3

use tower_governor::governor::{GovernorConfig, GovernorConfigBuilder};
use tower_governor::key_extractor::PeerIpKeyExtractor;

use crate::error::parsed_or;

pub type PeerGovernorConfig =
    GovernorConfig<PeerIpKeyExtractor, ::governor::middleware::NoOpMiddleware>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub general_per_second: u64,
    pub general_burst_size: u32,
    pub upload_per_second: u64,
    pub upload_burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            general_per_second: 1,
            general_burst_size: 60,
            upload_per_second: 10,
            upload_burst_size: 3,
        }
    }
}

impl RateLimitConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: parsed_or("RATE_LIMIT_ENABLED", defaults.enabled),
            general_per_second: parsed_or(
                "RATE_LIMIT_GENERAL_PER_SECOND",
                defaults.general_per_second,
            ),
            general_burst_size: parsed_or(
                "RATE_LIMIT_GENERAL_BURST_SIZE",
                defaults.general_burst_size,
            ),
            upload_per_second: parsed_or(
                "RATE_LIMIT_UPLOAD_PER_SECOND",
                defaults.upload_per_second,
            ),
            upload_burst_size: parsed_or(
                "RATE_LIMIT_UPLOAD_BURST_SIZE",
                defaults.upload_burst_size,
            ),
        }
    }

    /// Limiter disabled, for tests and local tooling.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Governor config for general endpoints, keyed by peer IP.
    ///
    /// Returns `None` when the configured values are zero.
    #[must_use]
    pub fn general_governor_config(&self) -> Option<PeerGovernorConfig> {
        build(self.general_per_second, self.general_burst_size)
    }

    /// Governor config for the file upload endpoint.
    #[must_use]
    pub fn upload_governor_config(&self) -> Option<PeerGovernorConfig> {
        build(self.upload_per_second, self.upload_burst_size)
    }
}

fn build(per_second: u64, burst_size: u32) -> Option<PeerGovernorConfig> {
    GovernorConfigBuilder::default()
        .per_second(per_second)
        .burst_size(burst_size)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
}
