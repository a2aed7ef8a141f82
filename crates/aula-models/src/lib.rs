//! # Aula Models
//!
//! Domain models and DTOs shared by the Aula services.
//!
//! Records mirror the columns of the tenant tables; DTOs carry client input
//! and are validated with `validator` before anything reaches the store.
//!
//! # Modules
//!
//! - [`users`]: Roles, user profiles and person DTOs
//! - [`identity`]: The authorized caller of a request
//! - [`courses`]: Courses and enrollments
//! - [`grades`]: Grades and bulk import results
//! - [`attendance`]: Attendance records and excuses
//! - [`directors`]: Institution overview and grouped user listing
//!
//! # Example
//!
//! ```ignore
//! use aula_models::users::{Role, UserProfile};
//!
//! let profile = UserProfile::try_from(row)?;
//! if profile.role() == Some(Role::Director) {
//!     println!("{} runs this institution", profile.email);
//! }
//! ```

pub mod attendance;
pub mod courses;
pub mod directors;
pub mod grades;
pub mod identity;
pub mod users;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

pub use identity::IdentityContext;
pub use users::{Role, UserProfile};

/// Generic `{message}` acknowledgement.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("email must not be empty")]
    EmptyEmail,

    #[error("malformed record: {0}")]
    Malformed(String),
}
