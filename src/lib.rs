//! # Aula API
//!
//! A multi-tenant REST API for school management built with Axum on top of a
//! hosted PostgREST backend.
//!
//! ## Overview
//!
//! Every institution owns a set of tables prefixed with its schema name
//! (`tenant_ucb_usuarios`, `tenant_ucb_cursos`, ...). The institution of a
//! request is never taken from the client: it is derived from the domain of
//! the email inside the verified bearer token.
//!
//! ```text
//! Authorization: Bearer <jwt>
//!     ↓ TokenValidator          email = ana@ucb.edu.bo
//!     ↓ TenantDirectory         domain = ucb.edu.bo, schema = tenant_ucb
//!     ↓ UserLookup              tenant_ucb_usuarios where email = ana@ucb.edu.bo
//!     ↓ AccessGate              role in policy?
//! IdentityContext { schema, role, user_id }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! src/
//! ├── config/           # AppConfig assembled from the aula-config sections
//! ├── middleware/       # AuthUser extractor
//! ├── modules/          # Feature modules
//! │   ├── students/    # Student CRUD and course rosters
//! │   ├── teachers/    # Teacher CRUD
//! │   ├── directors/   # Overview, grouped users, role changes
//! │   ├── courses/     # Courses and enrollments
//! │   ├── grades/      # Grades and CSV/XLSX import
//! │   ├── attendance/  # Attendance and excuses
//! │   ├── users/       # Shared role-scoped user operations
//! │   └── health/      # Liveness
//! ```
//!
//! Each feature module has a `controller.rs` with the HTTP handlers and their
//! access policies, a `service.rs` with the store calls, and a `router.rs`.
//!
//! ## Roles
//!
//! | Role | Description |
//! |------|-------------|
//! | `director` | Manages people, courses and enrollments of the institution |
//! | `profesor` | Records grades and attendance, reviews excuses |
//! | `estudiante` | Reads own grades and attendance, submits excuses |
//!
//! ## Quick Start
//!
//! ```bash
//! SUPABASE_URL=https://project.supabase.co
//! SUPABASE_ANON_KEY=...
//! SUPABASE_SERVICE_ROLE_KEY=...
//! SUPABASE_JWT_SECRET=...
//! ENABLED_SERVICES=all
//! ```
//!
//! When the server is running, API documentation is available at:
//!
//! - Swagger UI: `http://localhost:5000/swagger-ui`
//! - Scalar: `http://localhost:5000/scalar`
//!
//! ## Modules
//!
//! - [`config`]: Application configuration
//! - [`docs`]: OpenAPI documentation setup
//! - [`logging`]: Distributed tracing and logging
//! - [`metrics`]: Prometheus metrics endpoint
//! - [`middleware`]: Authentication extractor
//! - [`modules`]: Feature modules
//! - [`router`]: Main application router
//! - [`state`]: Shared application state
//! - [`validator`]: Request validation utilities

pub mod config;
pub mod docs;
pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod modules;
pub mod router;
pub mod state;
pub mod validator;

// Re-export workspace crates for convenience
pub use aula_auth;
pub use aula_config;
pub use aula_core;
pub use aula_models;
pub use aula_store;
