pub mod service;

pub use service::{DIRECTORS, RoleScope, STUDENTS, TEACHERS, UserService};
