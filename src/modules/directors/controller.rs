use aula_auth::Policy;
use aula_core::AppError;
use aula_models::directors::{AllUsersResponse, InstitutionOverview};
use aula_models::users::{CreateDirectorDto, RoleUpdateDto};
use aula_models::{Role, UserProfile};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use tracing::instrument;

use crate::docs::ErrorResponse;
use crate::middleware::auth::AuthUser;
use crate::modules::directors::service::DirectorService;
use crate::modules::users::{DIRECTORS, UserService};
use crate::state::AppState;
use crate::validator::ValidatedJson;

const OVERVIEW: Policy = Policy::new(
    &[Role::Director],
    "Solo los directores pueden ver el resumen institucional",
);
const ALL_USERS: Policy = Policy::new(
    &[Role::Director],
    "Solo los directores pueden ver todos los usuarios",
);
const LIST: Policy = Policy::new(
    &[Role::Director],
    "Solo los directores pueden ver la lista de directores",
);
const CREATE: Policy = Policy::new(
    &[Role::Director],
    "Solo los directores pueden crear otros directores",
);
const CHANGE_ROLE: Policy = Policy::new(
    &[Role::Director],
    "Solo los directores pueden actualizar roles",
);

#[utoipa::path(
    get,
    path = "/api/directors/overview",
    responses(
        (status = 200, description = "Institution headcounts and recent activity", body = InstitutionOverview),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Requires director", body = ErrorResponse)
    ),
    tag = "Directors",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_overview(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<InstitutionOverview>, AppError> {
    let ctx = auth_user.authorize(&state, &OVERVIEW).await?;
    let overview = DirectorService::overview(state.store(), &state.tenants, &ctx).await?;
    Ok(Json(overview))
}

#[utoipa::path(
    get,
    path = "/api/directors/all-users",
    responses(
        (status = 200, description = "Every user grouped by role", body = AllUsersResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Requires director", body = ErrorResponse)
    ),
    tag = "Directors",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_all_users(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<AllUsersResponse>, AppError> {
    let ctx = auth_user.authorize(&state, &ALL_USERS).await?;
    let users = DirectorService::all_users(state.store(), &state.tenants, &ctx).await?;
    Ok(Json(users))
}

#[utoipa::path(
    get,
    path = "/api/directors",
    responses(
        (status = 200, description = "Directors, newest first", body = Vec<UserProfile>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Requires director", body = ErrorResponse)
    ),
    tag = "Directors",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_directors(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<UserProfile>>, AppError> {
    let ctx = auth_user.authorize(&state, &LIST).await?;
    let directors = UserService::list_recent_by_role(state.store(), &ctx, DIRECTORS).await?;
    Ok(Json(directors))
}

#[utoipa::path(
    post,
    path = "/api/directors",
    request_body = CreateDirectorDto,
    responses(
        (status = 201, description = "Director created", body = UserProfile),
        (status = 400, description = "Email outside the institution or already in use", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Requires director", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    tag = "Directors",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_director(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<CreateDirectorDto>,
) -> Result<(StatusCode, Json<UserProfile>), AppError> {
    let ctx = auth_user.authorize(&state, &CREATE).await?;
    let director =
        UserService::create(state.store(), &state.gate, &ctx, dto.into_new_user(), DIRECTORS)
            .await?;
    Ok((StatusCode::CREATED, Json(director)))
}

#[utoipa::path(
    patch,
    path = "/api/directors/users/{id}/role",
    params(
        ("id" = i64, Path, description = "User ID")
    ),
    request_body = RoleUpdateDto,
    responses(
        (status = 200, description = "User with the new role", body = UserProfile),
        (status = 400, description = "Unknown role", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Requires director", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    ),
    tag = "Directors",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn update_user_role(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
    Json(dto): Json<RoleUpdateDto>,
) -> Result<Json<UserProfile>, AppError> {
    let ctx = auth_user.authorize(&state, &CHANGE_ROLE).await?;
    let role = dto.role().map_err(AppError::bad_request)?;
    let user = UserService::change_role(state.store(), &ctx, id, role).await?;
    Ok(Json(user))
}
