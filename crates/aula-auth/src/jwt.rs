//! Identity token verification.
//!
//! Tokens are HS256-signed by the hosted auth service with a shared secret
//! and must carry the configured audience and an unexpired `exp`.
//!
//! # Example
//!
//! ```ignore
//! use aula_auth::TokenValidator;
//! use aula_config::JwtConfig;
//!
//! let validator = TokenValidator::new(&JwtConfig::from_env()?);
//! let identity = validator.verify(token)?;
//! println!("caller: {}", identity.email);
//! ```

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;

use aula_config::JwtConfig;
use aula_core::AppError;

use crate::claims::IdentityClaims;

/// Why a request could not be authenticated. Every variant maps to 401.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token no proporcionado")]
    NoCredential,

    #[error("Token expirado")]
    Expired,

    #[error("Token inválido")]
    Invalid,

    #[error("Email no encontrado en token")]
    MissingEmailClaim,
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        AppError::unauthorized(err)
    }
}

/// What a valid token says about its bearer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    pub email: String,
    pub subject: Option<String>,
}

#[derive(Clone)]
pub struct TokenValidator {
    decoding: DecodingKey,
    encoding: EncodingKey,
    validation: Validation,
    audience: String,
    issued_token_expiry: i64,
}

impl std::fmt::Debug for TokenValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenValidator")
            .field("audience", &self.audience)
            .finish_non_exhaustive()
    }
}

impl TokenValidator {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[config.audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "aud"]);

        Self {
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            validation,
            audience: config.audience.clone(),
            issued_token_expiry: config.issued_token_expiry,
        }
    }

    /// Checks signature, algorithm, audience and expiry, then extracts the email.
    ///
    /// # Errors
    ///
    /// - [`TokenError::Expired`] when `exp` is in the past
    /// - [`TokenError::Invalid`] for any other verification failure
    /// - [`TokenError::MissingEmailClaim`] when the token is valid but has no email
    pub fn verify(&self, token: &str) -> Result<VerifiedIdentity, TokenError> {
        let data = decode::<IdentityClaims>(token, &self.decoding, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            },
        )?;

        let email = data
            .claims
            .email
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .ok_or(TokenError::MissingEmailClaim)?;

        Ok(VerifiedIdentity {
            email,
            subject: data.claims.sub,
        })
    }

    /// Mints a token accepted by [`verify`](Self::verify), valid for the
    /// configured lifetime. Used by the CLI and by tests.
    pub fn issue_token(
        &self,
        email: &str,
        subject: Option<&str>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue_token_expiring_in(email, subject, self.issued_token_expiry)
    }

    /// Same as [`issue_token`](Self::issue_token) with an explicit lifetime
    /// in seconds. Negative values produce an already expired token.
    pub fn issue_token_expiring_in(
        &self,
        email: &str,
        subject: Option<&str>,
        seconds: i64,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now().timestamp();
        let claims = IdentityClaims {
            sub: subject.map(str::to_string),
            email: Some(email.to_string()),
            aud: self.audience.clone(),
            exp: (now + seconds).max(0) as usize,
            iat: Some(now as usize),
            role: Some("authenticated".to_string()),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }
}
