//! Tenant resolution and role checks for an authenticated caller.
//!
//! Every resource operation goes through [`AccessGate::authorize`] before it
//! touches a tenant table. The gate only reads, so repeating it for the same
//! caller yields the same context.

use std::sync::Arc;

use aula_core::{AppError, TenantDirectory};
use aula_models::{IdentityContext, Role};
use aula_store::{Store, StoreError};
use axum::http::StatusCode;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::lookup::UserLookup;

/// Roles an operation admits, and what to tell everybody else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    roles: &'static [Role],
    denial: &'static str,
}

impl Policy {
    pub const fn new(roles: &'static [Role], denial: &'static str) -> Self {
        Self { roles, denial }
    }

    pub fn allows(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    pub fn roles(&self) -> &'static [Role] {
        self.roles
    }

    pub fn denial(&self) -> &'static str {
        self.denial
    }
}

#[derive(Debug, Error)]
pub enum AccessError {
    #[error("Dominio de tenant no válido")]
    InvalidTenant,

    /// Valid token, but no profile in the tenant.
    #[error("{0}")]
    NoProfile(&'static str),

    #[error("{0}")]
    RoleNotAllowed(&'static str),

    #[error("El email del {0} debe pertenecer al mismo dominio institucional")]
    CrossTenant(&'static str),

    #[error(transparent)]
    Lookup(#[from] StoreError),
}

impl AccessError {
    pub fn status(&self) -> StatusCode {
        match self {
            AccessError::InvalidTenant | AccessError::CrossTenant(_) => StatusCode::BAD_REQUEST,
            AccessError::NoProfile(_) | AccessError::RoleNotAllowed(_) => StatusCode::FORBIDDEN,
            AccessError::Lookup(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AccessError> for AppError {
    fn from(err: AccessError) -> Self {
        AppError::new(err.status(), err)
    }
}

#[derive(Clone, Debug)]
pub struct AccessGate {
    tenants: TenantDirectory,
    lookup: UserLookup,
}

impl AccessGate {
    pub fn new(tenants: TenantDirectory, store: Arc<dyn Store>) -> Self {
        Self {
            tenants,
            lookup: UserLookup::new(store),
        }
    }

    pub fn tenants(&self) -> &TenantDirectory {
        &self.tenants
    }

    /// Resolves the caller's tenant and profile and checks the role.
    ///
    /// # Errors
    ///
    /// - [`AccessError::InvalidTenant`] if the email domain is not recognized
    /// - [`AccessError::NoProfile`] if the tenant has no user with that email
    /// - [`AccessError::RoleNotAllowed`] if the profile's role is not admitted
    /// - [`AccessError::Lookup`] if the store could not be queried
    #[instrument(skip(self, policy), fields(auth.email = %email))]
    pub async fn authorize(
        &self,
        email: &str,
        policy: &Policy,
    ) -> Result<IdentityContext, AccessError> {
        let result = self.resolve(email, policy).await;
        record(&result);
        result
    }

    async fn resolve(&self, email: &str, policy: &Policy) -> Result<IdentityContext, AccessError> {
        let domain = self
            .tenants
            .domain_from_email(email)
            .ok_or(AccessError::InvalidTenant)?;
        let schema = self.tenants.schema_for(domain.as_str());

        let profile = self
            .lookup
            .by_email(email, &schema)
            .await?
            .ok_or(AccessError::NoProfile(policy.denial()))?;

        let role = profile
            .role()
            .filter(|role| policy.allows(*role))
            .ok_or(AccessError::RoleNotAllowed(policy.denial()))?;

        IdentityContext::new(email, domain, schema, role, profile.id)
            .map_err(|e| AccessError::Lookup(StoreError::Decode(e.to_string())))
    }

    /// Fails unless `email` belongs to the caller's own institution.
    ///
    /// `subject` names the kind of person being provisioned, e.g. `estudiante`.
    pub fn ensure_same_tenant(
        &self,
        ctx: &IdentityContext,
        email: &str,
        subject: &'static str,
    ) -> Result<(), AccessError> {
        match self.tenants.domain_from_email(email) {
            Some(domain) if domain == ctx.domain => Ok(()),
            _ => {
                warn!(
                    auth.email = %ctx.email,
                    target.email = %email,
                    "cross-tenant provisioning rejected"
                );
                Err(AccessError::CrossTenant(subject))
            }
        }
    }
}

fn record(result: &Result<IdentityContext, AccessError>) {
    let (role, status) = match result {
        Ok(ctx) => (ctx.role.as_str(), "allowed"),
        Err(AccessError::InvalidTenant) => ("unknown", "invalid_tenant"),
        Err(AccessError::NoProfile(_)) => ("unknown", "no_profile"),
        Err(AccessError::RoleNotAllowed(_)) => ("unknown", "forbidden"),
        Err(AccessError::CrossTenant(_)) => ("unknown", "cross_tenant"),
        Err(AccessError::Lookup(_)) => ("unknown", "error"),
    };
    metrics::counter!("authorization_checks_total", "role" => role, "status" => status)
        .increment(1);

    match result {
        Ok(ctx) => debug!(
            auth.role = %ctx.role,
            tenant.schema = %ctx.schema,
            "authorization granted"
        ),
        Err(e) => warn!(auth.status = status, error = %e, "authorization denied"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aula_core::Entity;
    use aula_store::MemoryStore;
    use serde_json::json;

    const DIRECTOR_ONLY: Policy = Policy::new(&[Role::Director], "Solo los directores pueden hacer esto");
    const STAFF: Policy = Policy::new(
        &[Role::Director, Role::Profesor],
        "Solo los directores y profesores pueden hacer esto",
    );

    fn gate_with_users(users: &[(&str, &str)]) -> (AccessGate, MemoryStore) {
        let store = MemoryStore::new();
        let tenants = TenantDirectory::default();
        for (email, rol) in users {
            let domain = tenants.domain_from_email(email).unwrap();
            let table = tenants.schema_for(domain.as_str()).table(Entity::Users);
            store.seed(
                &table,
                json!({"nombre": "N", "apellido": "A", "email": email, "rol": rol}),
            );
        }
        (
            AccessGate::new(tenants, Arc::new(store.clone())),
            store,
        )
    }

    #[tokio::test]
    async fn test_director_is_authorized() {
        let (gate, _) = gate_with_users(&[("dir@ucb.edu.bo", "director")]);
        let ctx = gate.authorize("dir@ucb.edu.bo", &DIRECTOR_ONLY).await.unwrap();
        assert_eq!(ctx.role, Role::Director);
        assert_eq!(ctx.schema.as_str(), "tenant_ucb");
        assert_eq!(ctx.domain.as_str(), "ucb.edu.bo");
    }

    #[tokio::test]
    async fn test_unknown_domain_is_invalid_tenant() {
        let (gate, store) = gate_with_users(&[]);
        let err = gate.authorize("x@example.com", &STAFF).await.unwrap_err();
        assert!(matches!(err, AccessError::InvalidTenant));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(store.read_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_profile_is_forbidden() {
        let (gate, _) = gate_with_users(&[("dir@ucb.edu.bo", "director")]);
        let err = gate.authorize("ghost@ucb.edu.bo", &STAFF).await.unwrap_err();
        assert!(matches!(err, AccessError::NoProfile(_)));
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_profile_in_other_tenant_is_not_found() {
        // Same local part, different institution.
        let (gate, _) = gate_with_users(&[("ana@upb.edu.bo", "director")]);
        let err = gate.authorize("ana@ucb.edu.bo", &DIRECTOR_ONLY).await.unwrap_err();
        assert!(matches!(err, AccessError::NoProfile(_)));
    }

    #[tokio::test]
    async fn test_teacher_cannot_pass_director_policy() {
        let (gate, _) = gate_with_users(&[("prof@ucb.edu.bo", "profesor")]);
        let err = gate.authorize("prof@ucb.edu.bo", &DIRECTOR_ONLY).await.unwrap_err();
        assert!(matches!(err, AccessError::RoleNotAllowed(_)));
        assert_eq!(err.to_string(), "Solo los directores pueden hacer esto");
        assert!(gate.authorize("prof@ucb.edu.bo", &STAFF).await.is_ok());
    }

    #[tokio::test]
    async fn test_unrecognized_stored_role_is_forbidden() {
        let (gate, _) = gate_with_users(&[("sec@ucb.edu.bo", "secretaria")]);
        let err = gate.authorize("sec@ucb.edu.bo", &STAFF).await.unwrap_err();
        assert!(matches!(err, AccessError::RoleNotAllowed(_)));
    }

    #[tokio::test]
    async fn test_store_failure_is_not_forbidden() {
        let (gate, store) = gate_with_users(&[("dir@ucb.edu.bo", "director")]);
        store.set_unavailable(true);
        let err = gate.authorize("dir@ucb.edu.bo", &DIRECTOR_ONLY).await.unwrap_err();
        assert!(matches!(err, AccessError::Lookup(_)));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_authorize_is_idempotent_and_read_only() {
        let (gate, store) = gate_with_users(&[("dir@ucb.edu.bo", "director")]);
        let first = gate.authorize("dir@ucb.edu.bo", &DIRECTOR_ONLY).await.unwrap();
        let second = gate.authorize("dir@ucb.edu.bo", &DIRECTOR_ONLY).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_same_tenant_check() {
        let (gate, _) = gate_with_users(&[("dir@ucb.edu.bo", "director")]);
        let ctx = gate.authorize("dir@ucb.edu.bo", &DIRECTOR_ONLY).await.unwrap();

        assert!(gate.ensure_same_tenant(&ctx, "new@UCB.edu.bo", "estudiante").is_ok());

        let err = gate
            .ensure_same_tenant(&ctx, "new@upb.edu.bo", "estudiante")
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "El email del estudiante debe pertenecer al mismo dominio institucional"
        );
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        assert!(gate.ensure_same_tenant(&ctx, "x@example.com", "profesor").is_err());
    }
}
