use aula_auth::Policy;
use aula_core::AppError;
use aula_models::courses::{AssignTeacherParams, Course, CourseDto, Enrollment, EnrollmentDto, MyCourse};
use aula_models::{MessageResponse, Role, UserProfile};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use crate::docs::ErrorResponse;
use crate::middleware::auth::AuthUser;
use crate::modules::courses::service::CourseService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

const ANY_MEMBER: Policy = Policy::new(
    &[Role::Director, Role::Profesor, Role::Estudiante],
    "Acceso denegado a los cursos de la institución",
);
const STAFF: Policy = Policy::new(
    &[Role::Director, Role::Profesor],
    "Solo los directores y profesores pueden ver las inscripciones de un curso",
);
const MANAGE: Policy = Policy::new(
    &[Role::Director],
    "Solo los directores pueden gestionar cursos",
);
const ENROLL: Policy = Policy::new(
    &[Role::Director],
    "Solo los directores pueden gestionar inscripciones",
);

#[utoipa::path(
    get,
    path = "/api/courses",
    responses(
        (status = 200, description = "Courses of the institution by name", body = Vec<Course>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Caller has no profile in the institution", body = ErrorResponse)
    ),
    tag = "Courses",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_courses(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<Course>>, AppError> {
    let ctx = auth_user.authorize(&state, &ANY_MEMBER).await?;
    Ok(Json(CourseService::list(state.store(), &ctx).await?))
}

#[utoipa::path(
    post,
    path = "/api/courses",
    request_body = CourseDto,
    responses(
        (status = 201, description = "Course created", body = Course),
        (status = 400, description = "Unknown teacher", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Requires director", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    tag = "Courses",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_course(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CourseDto>,
) -> Result<(StatusCode, Json<Course>), AppError> {
    let ctx = auth_user.authorize(&state, &MANAGE).await?;
    let course = CourseService::create(state.store(), &ctx, dto).await?;
    Ok((StatusCode::CREATED, Json(course)))
}

#[utoipa::path(
    get,
    path = "/api/courses/my-courses",
    responses(
        (status = 200, description = "Courses the caller teaches or is enrolled in", body = Vec<MyCourse>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Caller has no profile in the institution", body = ErrorResponse)
    ),
    tag = "Courses",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_my_courses(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<MyCourse>>, AppError> {
    let ctx = auth_user.authorize(&state, &ANY_MEMBER).await?;
    Ok(Json(CourseService::my_courses(state.store(), &ctx).await?))
}

#[utoipa::path(
    get,
    path = "/api/courses/{id}",
    params(
        ("id" = i64, Path, description = "Course ID")
    ),
    responses(
        (status = 200, description = "Course details", body = Course),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    tag = "Courses",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_course(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Course>, AppError> {
    let ctx = auth_user.authorize(&state, &ANY_MEMBER).await?;
    Ok(Json(CourseService::get(state.store(), &ctx, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/courses/{id}",
    params(
        ("id" = i64, Path, description = "Course ID")
    ),
    request_body = CourseDto,
    responses(
        (status = 200, description = "Course replaced", body = Course),
        (status = 400, description = "Unknown teacher", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Requires director", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    tag = "Courses",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn update_course(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
    ValidatedJson(dto): ValidatedJson<CourseDto>,
) -> Result<Json<Course>, AppError> {
    let ctx = auth_user.authorize(&state, &MANAGE).await?;
    Ok(Json(CourseService::update(state.store(), &ctx, id, dto).await?))
}

#[utoipa::path(
    delete,
    path = "/api/courses/{id}",
    params(
        ("id" = i64, Path, description = "Course ID")
    ),
    responses(
        (status = 200, description = "Course and its enrollments deleted", body = MessageResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Requires director", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    tag = "Courses",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_course(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    let ctx = auth_user.authorize(&state, &MANAGE).await?;
    CourseService::delete(state.store(), &ctx, id).await?;
    Ok(Json(MessageResponse::new("Curso eliminado correctamente")))
}

#[utoipa::path(
    get,
    path = "/api/courses/{id}/enrollments",
    params(
        ("id" = i64, Path, description = "Course ID")
    ),
    responses(
        (status = 200, description = "Enrollments of the course", body = Vec<Enrollment>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Requires director or profesor", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    tag = "Courses",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_course_enrollments(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Enrollment>>, AppError> {
    let ctx = auth_user.authorize(&state, &STAFF).await?;
    Ok(Json(CourseService::enrollments(state.store(), &ctx, id).await?))
}

#[utoipa::path(
    get,
    path = "/api/courses/{id}/students",
    params(
        ("id" = i64, Path, description = "Course ID")
    ),
    responses(
        (status = 200, description = "Students enrolled in the course", body = Vec<UserProfile>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Requires director or profesor", body = ErrorResponse),
        (status = 404, description = "Course not found", body = ErrorResponse)
    ),
    tag = "Courses",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_course_students(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Vec<UserProfile>>, AppError> {
    let ctx = auth_user.authorize(&state, &STAFF).await?;
    Ok(Json(CourseService::students(state.store(), &ctx, id).await?))
}

#[utoipa::path(
    post,
    path = "/api/courses/enroll",
    request_body = EnrollmentDto,
    responses(
        (status = 201, description = "User enrolled", body = Enrollment),
        (status = 400, description = "Already enrolled", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Requires director", body = ErrorResponse),
        (status = 404, description = "User or course not found", body = ErrorResponse)
    ),
    tag = "Courses",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn enroll_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<EnrollmentDto>,
) -> Result<(StatusCode, Json<Enrollment>), AppError> {
    let ctx = auth_user.authorize(&state, &ENROLL).await?;
    let enrollment = CourseService::enroll(state.store(), &ctx, dto).await?;
    Ok((StatusCode::CREATED, Json(enrollment)))
}

#[utoipa::path(
    delete,
    path = "/api/courses/enroll/{inscripcion_id}",
    params(
        ("inscripcion_id" = i64, Path, description = "Enrollment ID")
    ),
    responses(
        (status = 200, description = "Enrollment removed", body = MessageResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Requires director", body = ErrorResponse),
        (status = 404, description = "Enrollment not found", body = ErrorResponse)
    ),
    tag = "Courses",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn unenroll_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(inscripcion_id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    let ctx = auth_user.authorize(&state, &ENROLL).await?;
    CourseService::unenroll(state.store(), &ctx, inscripcion_id).await?;
    Ok(Json(MessageResponse::new("Inscripción eliminada correctamente")))
}

#[utoipa::path(
    post,
    path = "/api/courses/{id}/assign-teacher",
    params(
        ("id" = i64, Path, description = "Course ID"),
        AssignTeacherParams
    ),
    responses(
        (status = 200, description = "Course with its new teacher", body = Course),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Requires director", body = ErrorResponse),
        (status = 404, description = "Course or teacher not found", body = ErrorResponse)
    ),
    tag = "Courses",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn assign_teacher(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
    Query(params): Query<AssignTeacherParams>,
) -> Result<Json<Course>, AppError> {
    let ctx = auth_user.authorize(&state, &MANAGE).await?;
    let course =
        CourseService::assign_teacher(state.store(), &ctx, id, params.profesor_id).await?;
    Ok(Json(course))
}
