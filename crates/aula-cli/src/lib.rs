//! # Aula CLI
//!
//! Development and administration helpers for the Aula services.
//!
//! This library crate holds the seeding logic used by the CLI binary, so it
//! can run against the REST store in production and the in-memory store in
//! tests.
//!
//! ## Usage
//!
//! ```ignore
//! use aula_cli::seeder::{SeedConfig, seed_tenant};
//!
//! let config = SeedConfig::new("ucb.edu.bo").with_students(40);
//! seed_tenant(&store, &tenants, config).await?;
//! ```

pub mod directors;
pub mod seeder;
