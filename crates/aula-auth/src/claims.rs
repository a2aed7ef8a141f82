//! Claims carried by identity tokens from the hosted auth service.

use serde::{Deserialize, Serialize};

/// Registered and custom claims the services read.
///
/// Only `email` matters for authorization; `sub` is the auth service's
/// opaque user id and is logged but never trusted for tenant selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub aud: String,
    /// Expiration timestamp (Unix seconds)
    pub exp: usize,
    /// Issued-at timestamp (Unix seconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<usize>,
    /// Auth service role, usually `authenticated`. Not an application role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}
