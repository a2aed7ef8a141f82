//! Request extractors for authentication.
//!
//! # Authentication Flow
//!
//! 1. Client sends `Authorization: Bearer <token>` or the session cookie
//! 2. [`AuthUser`](auth::AuthUser) verifies the token and extracts the email
//! 3. The handler calls [`AuthUser::authorize`](auth::AuthUser::authorize)
//!    with its operation's policy, which resolves the tenant and checks the role
//! 4. The handler runs against the tables of the resolved tenant
//!
//! # Example
//!
//! ```ignore
//! use crate::middleware::auth::AuthUser;
//!
//! async fn list_students(
//!     State(state): State<AppState>,
//!     auth_user: AuthUser,
//! ) -> Result<Json<Vec<UserProfile>>, AppError> {
//!     let ctx = auth_user.authorize(&state, &LIST_STUDENTS).await?;
//!     // ...
//! }
//! ```

pub mod auth;
