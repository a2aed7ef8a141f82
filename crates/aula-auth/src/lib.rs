//! # Aula Auth
//!
//! Authentication and authorization for the Aula services.
//!
//! A request is authenticated by [`TokenValidator`], which turns a bearer
//! token or session cookie into a [`VerifiedIdentity`]. It is then authorized by
//! [`AccessGate`], which resolves the caller's tenant from the email
//! domain, looks the caller up in that tenant, and checks the role against
//! the operation's [`Policy`].
//!
//! # Example
//!
//! ```ignore
//! use aula_auth::{AccessGate, Policy, TokenValidator, extract_token};
//! use aula_models::Role;
//!
//! const STAFF: Policy = Policy::new(&[Role::Director, Role::Profesor], "Acceso denegado");
//!
//! let token = extract_token(&headers, "session_token")?;
//! let identity = validator.verify(&token)?;
//! let ctx = gate.authorize(&identity.email, &STAFF).await?;
//! ```

pub mod claims;
pub mod credential;
pub mod gate;
pub mod jwt;
pub mod lookup;

pub use claims::IdentityClaims;
pub use credential::extract_token;
pub use gate::{AccessError, AccessGate, Policy};
pub use jwt::{TokenError, TokenValidator, VerifiedIdentity};
pub use lookup::UserLookup;
