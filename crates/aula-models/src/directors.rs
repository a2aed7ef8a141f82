//! Institution overview and grouped user listing for directors.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::courses::Enrollment;
use crate::users::{Role, UserProfile};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct InstitutionStats {
    pub total_students: u64,
    pub total_teachers: u64,
    pub total_courses: u64,
    pub total_enrollments: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InstitutionOverview {
    pub institution_name: String,
    pub domain: String,
    pub stats: InstitutionStats,
    /// Latest enrollments, newest first.
    pub recent_enrollments: Vec<Enrollment>,
    pub recent_users: Vec<UserProfile>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UsersByRole {
    pub directores: Vec<UserProfile>,
    pub profesores: Vec<UserProfile>,
    pub estudiantes: Vec<UserProfile>,
    /// Rows whose `rol` is not one of the known roles.
    pub otros: Vec<UserProfile>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RoleCounts {
    pub directores: usize,
    pub profesores: usize,
    pub estudiantes: usize,
    pub otros: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AllUsersResponse {
    pub institution: String,
    pub total_users: usize,
    pub users_by_role: UsersByRole,
    pub role_counts: RoleCounts,
}

impl UsersByRole {
    /// Splits users by role, keeping the input order within each group.
    pub fn group(users: Vec<UserProfile>) -> Self {
        let mut grouped = Self::default();
        for user in users {
            match user.role() {
                Some(Role::Director) => grouped.directores.push(user),
                Some(Role::Profesor) => grouped.profesores.push(user),
                Some(Role::Estudiante) => grouped.estudiantes.push(user),
                None => grouped.otros.push(user),
            }
        }
        grouped
    }

    pub fn counts(&self) -> RoleCounts {
        RoleCounts {
            directores: self.directores.len(),
            profesores: self.profesores.len(),
            estudiantes: self.estudiantes.len(),
            otros: self.otros.len(),
        }
    }
}
