use std::fmt;

use crate::REDACTED;
use crate::error::{ConfigError, optional, parsed_or};

pub const DEFAULT_AUDIENCE: &str = "authenticated";
pub const DEFAULT_SESSION_COOKIE: &str = "session_token";

/// Settings for verifying identity tokens issued by the hosted auth service.
#[derive(Clone)]
pub struct JwtConfig {
    /// Shared HS256 secret.
    pub secret: String,
    pub audience: String,
    /// Cookie consulted when no `Authorization` header is present.
    pub session_cookie_name: String,
    /// Lifetime in seconds of tokens minted locally for development and tests.
    pub issued_token_expiry: i64,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &REDACTED)
            .field("audience", &self.audience)
            .field("session_cookie_name", &self.session_cookie_name)
            .field("issued_token_expiry", &self.issued_token_expiry)
            .finish()
    }
}

impl JwtConfig {
    /// Loads the token settings.
    ///
    /// The secret is taken from `SUPABASE_JWT_SECRET`, falling back to
    /// `SUPABASE_ANON_KEY` when the former is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let secret = optional("SUPABASE_JWT_SECRET")
            .or_else(|| optional("SUPABASE_ANON_KEY"))
            .ok_or(ConfigError::Missing("SUPABASE_JWT_SECRET"))?;

        Ok(Self {
            secret,
            audience: optional("JWT_AUDIENCE").unwrap_or_else(|| DEFAULT_AUDIENCE.to_string()),
            session_cookie_name: optional("SESSION_COOKIE_NAME")
                .unwrap_or_else(|| DEFAULT_SESSION_COOKIE.to_string()),
            issued_token_expiry: parsed_or("JWT_ISSUED_TOKEN_EXPIRY", 3600), // 1 hour
        })
    }

    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            audience: DEFAULT_AUDIENCE.to_string(),
            session_cookie_name: DEFAULT_SESSION_COOKIE.to_string(),
            issued_token_expiry: 3600,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_secret_uses_defaults() {
        let config = JwtConfig::with_secret("s3cret");
        assert_eq!(config.secret, "s3cret");
        assert_eq!(config.audience, "authenticated");
        assert_eq!(config.session_cookie_name, "session_token");
        assert_eq!(config.issued_token_expiry, 3600);
    }

    #[test]
    fn debug_hides_secret() {
        let printed = format!("{:?}", JwtConfig::with_secret("s3cret-hs256-key"));
        assert!(!printed.contains("s3cret-hs256-key"));
        assert!(printed.contains("authenticated"));
    }
}
