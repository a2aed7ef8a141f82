use serde::{Deserialize, Serialize};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

use aula_models::attendance::{
    Attendance, AttendanceCreate, AttendanceMark, AttendanceSession, AttendanceStatus,
    AttendanceUpdate, Excuse, ExcuseCreate, ExcuseReview, ExcuseStatus,
};
use aula_models::courses::{Course, CourseDto, Enrollment, EnrollmentDto, MyCourse};
use aula_models::directors::{
    AllUsersResponse, InstitutionOverview, InstitutionStats, RoleCounts, UsersByRole,
};
use aula_models::grades::{Grade, GradeCreate, GradeImportResponse, GradeUpdate};
use aula_models::users::{CreateDirectorDto, CreateUserDto, RoleUpdateDto, UpdateUserDto};
use aula_models::{MessageResponse, Role, UserProfile};

use crate::modules::grades::controller::GradeUpload;
use crate::modules::health::controller::{HealthStatus, ServiceInfo};

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub detail: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::health::controller::service_info,
        crate::modules::health::controller::health_check,
        crate::modules::students::controller::get_students,
        crate::modules::students::controller::create_student,
        crate::modules::students::controller::get_student,
        crate::modules::students::controller::update_student,
        crate::modules::students::controller::delete_student,
        crate::modules::students::controller::get_students_by_course,
        crate::modules::teachers::controller::get_teachers,
        crate::modules::teachers::controller::create_teacher,
        crate::modules::teachers::controller::get_teacher,
        crate::modules::teachers::controller::update_teacher,
        crate::modules::teachers::controller::delete_teacher,
        crate::modules::directors::controller::get_overview,
        crate::modules::directors::controller::get_all_users,
        crate::modules::directors::controller::get_directors,
        crate::modules::directors::controller::create_director,
        crate::modules::directors::controller::update_user_role,
        crate::modules::courses::controller::get_courses,
        crate::modules::courses::controller::create_course,
        crate::modules::courses::controller::get_my_courses,
        crate::modules::courses::controller::get_course,
        crate::modules::courses::controller::update_course,
        crate::modules::courses::controller::delete_course,
        crate::modules::courses::controller::get_course_enrollments,
        crate::modules::courses::controller::get_course_students,
        crate::modules::courses::controller::enroll_user,
        crate::modules::courses::controller::unenroll_user,
        crate::modules::courses::controller::assign_teacher,
        crate::modules::grades::controller::get_grades,
        crate::modules::grades::controller::get_grades_by_course,
        crate::modules::grades::controller::create_grades,
        crate::modules::grades::controller::upload_grades,
        crate::modules::grades::controller::update_grade,
        crate::modules::grades::controller::delete_grade,
        crate::modules::attendance::controller::get_attendance,
        crate::modules::attendance::controller::create_attendance,
        crate::modules::attendance::controller::create_attendance_bulk,
        crate::modules::attendance::controller::get_course_attendance,
        crate::modules::attendance::controller::get_student_attendance,
        crate::modules::attendance::controller::get_attendance_record,
        crate::modules::attendance::controller::update_attendance,
        crate::modules::attendance::controller::delete_attendance,
        crate::modules::attendance::controller::get_excuses,
        crate::modules::attendance::controller::create_excuse,
        crate::modules::attendance::controller::review_excuse,
    ),
    components(
        schemas(
            ErrorResponse,
            MessageResponse,
            ServiceInfo,
            HealthStatus,
            Role,
            UserProfile,
            CreateUserDto,
            CreateDirectorDto,
            UpdateUserDto,
            RoleUpdateDto,
            InstitutionStats,
            InstitutionOverview,
            UsersByRole,
            RoleCounts,
            AllUsersResponse,
            Course,
            CourseDto,
            Enrollment,
            EnrollmentDto,
            MyCourse,
            Grade,
            GradeCreate,
            GradeUpdate,
            GradeImportResponse,
            GradeUpload,
            Attendance,
            AttendanceStatus,
            AttendanceCreate,
            AttendanceMark,
            AttendanceSession,
            AttendanceUpdate,
            Excuse,
            ExcuseStatus,
            ExcuseCreate,
            ExcuseReview,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and service info"),
        (name = "Students", description = "Student records of an institution"),
        (name = "Teachers", description = "Teacher records of an institution"),
        (name = "Directors", description = "Institution overview and user administration"),
        (name = "Courses", description = "Courses and enrollments"),
        (name = "Grades", description = "Grades and spreadsheet import"),
        (name = "Attendance", description = "Attendance records and excuses")
    ),
    info(
        title = "Aula API",
        version = "0.1.0",
        description = "Multi-tenant school management API. Each institution is resolved from the caller's email domain.",
        license(
            name = "MIT"
        )
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
