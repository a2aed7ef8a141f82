//! Tenant resolution.
//!
//! Every institution owns a set of tables prefixed with its schema name,
//! e.g. `tenant_ucb_usuarios`. The caller's institution is derived from the
//! domain of their email address.
//!
//! ```
//! use aula_core::tenant::{Entity, TenantDirectory};
//!
//! let tenants = TenantDirectory::default();
//! let domain = tenants.domain_from_email("Ana@UCB.edu.bo").unwrap();
//! let schema = tenants.schema_for(domain.as_str());
//! assert_eq!(schema.table(Entity::Users).as_str(), "tenant_ucb_usuarios");
//! ```

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

/// Schema used for domains that are not part of the directory.
pub const FALLBACK_SCHEMA: &str = "tenant_default";

/// A recognized institutional email domain, always lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Domain(String);

impl Domain {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Table-name prefix owned by one tenant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Schema(String);

impl Schema {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Locator for `entity` inside this tenant.
    pub fn table(&self, entity: Entity) -> TenantTable {
        TenantTable(format!("{}_{}", self.0, entity.suffix()))
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Logical tables present in every tenant schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Users,
    Courses,
    Enrollments,
    Grades,
    Attendance,
    Excuses,
}

impl Entity {
    pub fn suffix(self) -> &'static str {
        match self {
            Entity::Users => "usuarios",
            Entity::Courses => "cursos",
            Entity::Enrollments => "inscripciones",
            Entity::Grades => "notas",
            Entity::Attendance => "asistencias",
            Entity::Excuses => "excusas",
        }
    }
}

/// Fully qualified `{schema}_{entity}` table name.
///
/// Only [`Schema::table`] builds one, so a table can never be addressed
/// without going through a resolved schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TenantTable(String);

impl TenantTable {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tenant {
    pub domain: &'static str,
    pub schema: &'static str,
    pub institution: &'static str,
}

/// Fixed mapping of email domains to schemas.
#[derive(Debug, Clone)]
pub struct TenantDirectory {
    tenants: Arc<[Tenant]>,
}

impl Default for TenantDirectory {
    fn default() -> Self {
        Self::new(vec![
            Tenant {
                domain: "ucb.edu.bo",
                schema: "tenant_ucb",
                institution: "Universidad Católica Boliviana",
            },
            Tenant {
                domain: "upb.edu.bo",
                schema: "tenant_upb",
                institution: "Universidad Privada Boliviana",
            },
            Tenant {
                domain: "gmail.com",
                schema: "tenant_gmail",
                institution: "Cuentas Gmail (pruebas)",
            },
        ])
    }
}

impl TenantDirectory {
    pub fn new(tenants: Vec<Tenant>) -> Self {
        Self {
            tenants: tenants.into(),
        }
    }

    pub fn tenants(&self) -> &[Tenant] {
        &self.tenants
    }

    /// Resolves the institutional domain of an email address.
    ///
    /// Matching is case-insensitive and anchored on `@`, so
    /// `x@fakeucb.edu.bo` does not resolve to `ucb.edu.bo`.
    pub fn domain_from_email(&self, email: &str) -> Option<Domain> {
        let email = email.trim().to_lowercase();
        self.tenants
            .iter()
            .find(|t| email.ends_with(&format!("@{}", t.domain)))
            .map(|t| Domain(t.domain.to_string()))
    }

    /// Schema for a domain. Never fails: unknown domains get [`FALLBACK_SCHEMA`].
    pub fn schema_for(&self, domain: &str) -> Schema {
        let domain = domain.to_lowercase();
        let schema = self
            .find(&domain)
            .map(|t| t.schema)
            .unwrap_or(FALLBACK_SCHEMA);
        Schema(schema.to_string())
    }

    /// Display name of the institution, falling back to the domain itself.
    pub fn institution_name(&self, domain: &Domain) -> String {
        self.find(domain.as_str())
            .map(|t| t.institution.to_string())
            .unwrap_or_else(|| domain.to_string())
    }

    fn find(&self, domain: &str) -> Option<&Tenant> {
        self.tenants.iter().find(|t| t.domain == domain)
    }
}
