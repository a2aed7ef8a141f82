use aula_auth::Policy;
use aula_core::AppError;
use aula_models::users::{CreateUserDto, UpdateUserDto};
use aula_models::{MessageResponse, Role, UserProfile};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use crate::docs::ErrorResponse;
use crate::middleware::auth::AuthUser;
use crate::modules::students::service::StudentService;
use crate::modules::users::{STUDENTS, UserService};
use crate::state::AppState;
use crate::validator::ValidatedJson;

const LIST: Policy = Policy::new(
    &[Role::Director, Role::Profesor],
    "Solo los directores y profesores pueden ver la lista de estudiantes",
);
const DETAIL: Policy = Policy::new(
    &[Role::Director, Role::Profesor],
    "Solo los directores y profesores pueden ver detalles de estudiantes",
);
const BY_COURSE: Policy = Policy::new(
    &[Role::Director, Role::Profesor],
    "Solo los directores y profesores pueden ver estudiantes por curso",
);
const CREATE: Policy = Policy::new(
    &[Role::Director],
    "Solo los directores pueden crear estudiantes",
);
const UPDATE: Policy = Policy::new(
    &[Role::Director],
    "Solo los directores pueden actualizar estudiantes",
);
const DELETE: Policy = Policy::new(
    &[Role::Director],
    "Solo los directores pueden eliminar estudiantes",
);

#[utoipa::path(
    get,
    path = "/api/students",
    responses(
        (status = 200, description = "Students of the caller's institution", body = Vec<UserProfile>),
        (status = 400, description = "Unknown tenant domain", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Requires director or profesor", body = ErrorResponse)
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_students(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<UserProfile>>, AppError> {
    let ctx = auth_user.authorize(&state, &LIST).await?;
    let students = UserService::list_by_role(state.store(), &ctx, STUDENTS).await?;
    Ok(Json(students))
}

#[utoipa::path(
    post,
    path = "/api/students",
    request_body = CreateUserDto,
    responses(
        (status = 201, description = "Student created", body = UserProfile),
        (status = 400, description = "Email outside the institution or already in use", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Requires director", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_student(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateUserDto>,
) -> Result<(StatusCode, Json<UserProfile>), AppError> {
    let ctx = auth_user.authorize(&state, &CREATE).await?;
    let student = UserService::create(
        state.store(),
        &state.gate,
        &ctx,
        dto.into_new_user(Role::Estudiante),
        STUDENTS,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(student)))
}

#[utoipa::path(
    get,
    path = "/api/students/{id}",
    params(
        ("id" = i64, Path, description = "Student ID")
    ),
    responses(
        (status = 200, description = "Student details", body = UserProfile),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Requires director or profesor", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_student(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<UserProfile>, AppError> {
    let ctx = auth_user.authorize(&state, &DETAIL).await?;
    let student = UserService::get_by_role(state.store(), &ctx, id, STUDENTS).await?;
    Ok(Json(student))
}

#[utoipa::path(
    put,
    path = "/api/students/{id}",
    params(
        ("id" = i64, Path, description = "Student ID")
    ),
    request_body = UpdateUserDto,
    responses(
        (status = 200, description = "Student as stored after the update", body = UserProfile),
        (status = 400, description = "No fields or email outside the institution", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Requires director", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn update_student(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
    ValidatedJson(dto): ValidatedJson<UpdateUserDto>,
) -> Result<Json<UserProfile>, AppError> {
    let ctx = auth_user.authorize(&state, &UPDATE).await?;
    let student = UserService::update(state.store(), &state.gate, &ctx, id, dto, STUDENTS).await?;
    Ok(Json(student))
}

#[utoipa::path(
    delete,
    path = "/api/students/{id}",
    params(
        ("id" = i64, Path, description = "Student ID")
    ),
    responses(
        (status = 200, description = "Student deleted", body = MessageResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Requires director", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse)
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_student(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    let ctx = auth_user.authorize(&state, &DELETE).await?;
    UserService::delete(state.store(), &ctx, id, STUDENTS).await?;
    Ok(Json(MessageResponse::new(STUDENTS.deleted)))
}

#[utoipa::path(
    get,
    path = "/api/students/course/{curso_id}",
    params(
        ("curso_id" = i64, Path, description = "Course ID")
    ),
    responses(
        (status = 200, description = "Students enrolled in the course", body = Vec<UserProfile>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Requires director or profesor", body = ErrorResponse)
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_students_by_course(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(curso_id): Path<i64>,
) -> Result<Json<Vec<UserProfile>>, AppError> {
    let ctx = auth_user.authorize(&state, &BY_COURSE).await?;
    let students = StudentService::list_by_course(state.store(), &ctx, curso_id).await?;
    Ok(Json(students))
}
