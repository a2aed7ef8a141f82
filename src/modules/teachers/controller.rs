//! Teacher management. Every operation is reserved to directors.

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
use crate::modules::users::{TEACHERS, UserService};
use crate::state::AppState;
use crate::validator::ValidatedJson;

const LIST: Policy = Policy::new(
    &[Role::Director],
    "Solo los directores pueden ver la lista de profesores",
);
const DETAIL: Policy = Policy::new(
    &[Role::Director],
    "Solo los directores pueden ver detalles de profesores",
);
const CREATE: Policy = Policy::new(&[Role::Director], "Solo los directores pueden crear profesores");
const UPDATE: Policy = Policy::new(
    &[Role::Director],
    "Solo los directores pueden actualizar profesores",
);
const DELETE: Policy = Policy::new(
    &[Role::Director],
    "Solo los directores pueden eliminar profesores",
);

#[utoipa::path(
    get,
    path = "/api/teachers",
    responses(
        (status = 200, description = "Teachers of the caller's institution", body = Vec<UserProfile>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Requires director", body = ErrorResponse)
    ),
    tag = "Teachers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_teachers(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<UserProfile>>, AppError> {
    let ctx = auth_user.authorize(&state, &LIST).await?;
    let teachers = UserService::list_by_role(state.store(), &ctx, TEACHERS).await?;
    Ok(Json(teachers))
}

#[utoipa::path(
    post,
    path = "/api/teachers",
    request_body = CreateUserDto,
    responses(
        (status = 201, description = "Teacher created", body = UserProfile),
        (status = 400, description = "Email outside the institution or already in use", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Requires director", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    tag = "Teachers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_teacher(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateUserDto>,
) -> Result<(StatusCode, Json<UserProfile>), AppError> {
    let ctx = auth_user.authorize(&state, &CREATE).await?;
    let teacher = UserService::create(
        state.store(),
        &state.gate,
        &ctx,
        dto.into_new_user(Role::Profesor),
        TEACHERS,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(teacher)))
}

#[utoipa::path(
    get,
    path = "/api/teachers/{id}",
    params(
        ("id" = i64, Path, description = "Teacher ID")
    ),
    responses(
        (status = 200, description = "Teacher details", body = UserProfile),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Requires director", body = ErrorResponse),
        (status = 404, description = "Teacher not found", body = ErrorResponse)
    ),
    tag = "Teachers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_teacher(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<UserProfile>, AppError> {
    let ctx = auth_user.authorize(&state, &DETAIL).await?;
    let teacher = UserService::get_by_role(state.store(), &ctx, id, TEACHERS).await?;
    Ok(Json(teacher))
}

#[utoipa::path(
    put,
    path = "/api/teachers/{id}",
    params(
        ("id" = i64, Path, description = "Teacher ID")
    ),
    request_body = UpdateUserDto,
    responses(
        (status = 200, description = "Teacher as stored after the update", body = UserProfile),
        (status = 400, description = "No fields or email outside the institution", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Requires director", body = ErrorResponse),
        (status = 404, description = "Teacher not found", body = ErrorResponse)
    ),
    tag = "Teachers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn update_teacher(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
    ValidatedJson(dto): ValidatedJson<UpdateUserDto>,
) -> Result<Json<UserProfile>, AppError> {
    let ctx = auth_user.authorize(&state, &UPDATE).await?;
    let teacher = UserService::update(state.store(), &state.gate, &ctx, id, dto, TEACHERS).await?;
    Ok(Json(teacher))
}

#[utoipa::path(
    delete,
    path = "/api/teachers/{id}",
    params(
        ("id" = i64, Path, description = "Teacher ID")
    ),
    responses(
        (status = 200, description = "Teacher deleted", body = MessageResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Requires director", body = ErrorResponse),
        (status = 404, description = "Teacher not found", body = ErrorResponse)
    ),
    tag = "Teachers",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_teacher(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    let ctx = auth_user.authorize(&state, &DELETE).await?;
    UserService::delete(state.store(), &ctx, id, TEACHERS).await?;
    Ok(Json(MessageResponse::new(TEACHERS.deleted)))
}
