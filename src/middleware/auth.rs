use aula_auth::{Policy, VerifiedIdentity, extract_token};
use aula_core::AppError;
use aula_models::IdentityContext;
use axum::{extract::FromRequestParts, http::request::Parts};

use crate::metrics::track_token_validation;
use crate::state::AppState;

/// Extractor that verifies the caller's token.
///
/// Only proves who the caller is. Tenant and role are checked per operation
/// with [`AuthUser::authorize`].
#[derive(Debug, Clone)]
pub struct AuthUser(pub VerifiedIdentity);

impl AuthUser {
    pub fn email(&self) -> &str {
        &self.0.email
    }

    pub fn subject(&self) -> Option<&str> {
        self.0.subject.as_deref()
    }

    /// Resolves the caller's tenant and profile and checks `policy`.
    pub async fn authorize(
        &self,
        state: &AppState,
        policy: &Policy,
    ) -> Result<IdentityContext, AppError> {
        Ok(state.gate.authorize(self.email(), policy).await?)
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_token(&parts.headers, &state.jwt_config.session_cookie_name)?;

        let identity = state.tokens.verify(&token);
        track_token_validation(identity.is_ok());

        Ok(AuthUser(identity?))
    }
}
