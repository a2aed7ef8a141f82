//! # Aula Core
//!
//! Core types shared by every Aula service:
//!
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`tenant`]: Email domain to tenant schema resolution and table locators
//! - [`serde`]: Custom serde deserialization helpers
//!
//! # Example
//!
//! ```ignore
//! use aula_core::errors::AppError;
//! use aula_core::tenant::{Entity, TenantDirectory};
//!
//! let tenants = TenantDirectory::default();
//! let domain = tenants
//!     .domain_from_email("dir@ucb.edu.bo")
//!     .ok_or_else(|| AppError::bad_request(anyhow::anyhow!("Dominio de tenant no válido")))?;
//! let users = tenants.schema_for(domain.as_str()).table(Entity::Users);
//! ```

pub mod errors;
pub mod serde;
pub mod tenant;

// Re-export commonly used types at crate root
pub use errors::AppError;
pub use tenant::{Domain, Entity, Schema, TenantDirectory, TenantTable};
