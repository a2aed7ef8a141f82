use aula_core::{Domain, Schema};
use serde::Serialize;

use crate::ModelError;
use crate::users::Role;

/// The authorized caller of one request.
///
/// Built fresh by the access gate for every request and dropped with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityContext {
    pub email: String,
    pub domain: Domain,
    pub schema: Schema,
    pub role: Role,
    pub user_id: i64,
}

impl IdentityContext {
    pub fn new(
        email: impl Into<String>,
        domain: Domain,
        schema: Schema,
        role: Role,
        user_id: i64,
    ) -> Result<Self, ModelError> {
        let email = email.into();
        if email.trim().is_empty() {
            return Err(ModelError::EmptyEmail);
        }
        Ok(Self {
            email,
            domain,
            schema,
            role,
            user_id,
        })
    }

    pub fn is(&self, role: Role) -> bool {
        self.role == role
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aula_core::TenantDirectory;

    #[test]
    fn rejects_empty_email() {
        let dir = TenantDirectory::default();
        let domain = dir.domain_from_email("a@ucb.edu.bo").unwrap();
        let schema = dir.schema_for(domain.as_str());
        let err = IdentityContext::new(" ", domain, schema, Role::Director, 1).unwrap_err();
        assert_eq!(err, ModelError::EmptyEmail);
    }

    #[test]
    fn carries_role() {
        let dir = TenantDirectory::default();
        let domain = dir.domain_from_email("a@ucb.edu.bo").unwrap();
        let schema = dir.schema_for(domain.as_str());
        let ctx = IdentityContext::new("a@ucb.edu.bo", domain, schema, Role::Profesor, 9).unwrap();
        assert!(ctx.is(Role::Profesor));
        assert!(!ctx.is(Role::Director));
        assert_eq!(ctx.schema.as_str(), "tenant_ucb");
    }
}
