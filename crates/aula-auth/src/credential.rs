//! Locating the bearer credential of a request.

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum_extra::extract::cookie::CookieJar;

use crate::jwt::TokenError;

/// Returns the raw token from `Authorization: Bearer <t>`, or failing that
/// from the session cookie named `cookie_name`.
///
/// A header without the `Bearer ` prefix is ignored, as is a blank value.
pub fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Result<String, TokenError> {
    let from_header = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    if let Some(token) = from_header {
        return Ok(token.to_string());
    }

    CookieJar::from_headers(headers)
        .get(cookie_name)
        .map(|c| c.value().trim().to_string())
        .filter(|t| !t.is_empty())
        .ok_or(TokenError::NoCredential)
}
