use aula_auth::Policy;
use aula_core::AppError;
use aula_models::attendance::{
    Attendance, AttendanceCreate, AttendanceSession, AttendanceUpdate, CourseAttendanceParams,
    Excuse, ExcuseCreate, ExcuseReview,
};
use aula_models::{MessageResponse, Role};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use crate::docs::ErrorResponse;
use crate::middleware::auth::AuthUser;
use crate::modules::attendance::service::AttendanceService;
use crate::state::AppState;
use crate::validator::ValidatedJson;

const READ: Policy = Policy::new(
    &[Role::Director, Role::Profesor, Role::Estudiante],
    "Acceso denegado a los registros de asistencia",
);
const RECORD: Policy = Policy::new(
    &[Role::Director, Role::Profesor],
    "Solo los directores y profesores pueden registrar asistencia",
);
const DELETE: Policy = Policy::new(
    &[Role::Director],
    "Solo los directores pueden eliminar registros de asistencia",
);
const SUBMIT_EXCUSE: Policy = Policy::new(
    &[Role::Estudiante],
    "Solo los estudiantes pueden enviar excusas",
);
const REVIEW_EXCUSE: Policy = Policy::new(
    &[Role::Director, Role::Profesor],
    "Solo los directores y profesores pueden revisar excusas",
);

#[utoipa::path(
    get,
    path = "/api/attendance",
    responses(
        (status = 200, description = "Attendance visible to the caller", body = Vec<Attendance>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Caller has no profile in the institution", body = ErrorResponse)
    ),
    tag = "Attendance",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_attendance(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<Attendance>>, AppError> {
    let ctx = auth_user.authorize(&state, &READ).await?;
    Ok(Json(AttendanceService::list(state.store(), &ctx).await?))
}

#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = AttendanceCreate,
    responses(
        (status = 201, description = "Attendance recorded", body = Attendance),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Requires director or profesor", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    tag = "Attendance",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_attendance(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<AttendanceCreate>,
) -> Result<(StatusCode, Json<Attendance>), AppError> {
    let ctx = auth_user.authorize(&state, &RECORD).await?;
    let record = AttendanceService::create(state.store(), &ctx, dto).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

#[utoipa::path(
    post,
    path = "/api/attendance/bulk",
    request_body = AttendanceSession,
    responses(
        (status = 201, description = "Whole session recorded", body = Vec<Attendance>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Requires director or profesor", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    tag = "Attendance",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, session))]
pub async fn create_attendance_bulk(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(session): ValidatedJson<AttendanceSession>,
) -> Result<(StatusCode, Json<Vec<Attendance>>), AppError> {
    let ctx = auth_user.authorize(&state, &RECORD).await?;
    let records = AttendanceService::record_session(state.store(), &ctx, session).await?;
    Ok((StatusCode::CREATED, Json(records)))
}

#[utoipa::path(
    get,
    path = "/api/attendance/course/{curso_id}",
    params(
        ("curso_id" = i64, Path, description = "Course ID"),
        CourseAttendanceParams
    ),
    responses(
        (status = 200, description = "Attendance of the course", body = Vec<Attendance>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Requires director or profesor", body = ErrorResponse)
    ),
    tag = "Attendance",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_course_attendance(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(curso_id): Path<i64>,
    Query(params): Query<CourseAttendanceParams>,
) -> Result<Json<Vec<Attendance>>, AppError> {
    let ctx = auth_user.authorize(&state, &RECORD).await?;
    let records =
        AttendanceService::list_by_course(state.store(), &ctx, curso_id, params.fecha).await?;
    Ok(Json(records))
}

#[utoipa::path(
    get,
    path = "/api/attendance/student/{estudiante_id}",
    params(
        ("estudiante_id" = i64, Path, description = "Student ID")
    ),
    responses(
        (status = 200, description = "Attendance of the student", body = Vec<Attendance>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Students may only read their own attendance", body = ErrorResponse)
    ),
    tag = "Attendance",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_student_attendance(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(estudiante_id): Path<i64>,
) -> Result<Json<Vec<Attendance>>, AppError> {
    let ctx = auth_user.authorize(&state, &READ).await?;
    let records =
        AttendanceService::list_by_student(state.store(), &ctx, estudiante_id).await?;
    Ok(Json(records))
}

#[utoipa::path(
    get,
    path = "/api/attendance/{id}",
    params(
        ("id" = i64, Path, description = "Attendance record ID")
    ),
    responses(
        (status = 200, description = "Attendance record", body = Attendance),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Requires director or profesor", body = ErrorResponse),
        (status = 404, description = "Record not found", body = ErrorResponse)
    ),
    tag = "Attendance",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_attendance_record(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<Attendance>, AppError> {
    let ctx = auth_user.authorize(&state, &RECORD).await?;
    Ok(Json(AttendanceService::get(state.store(), &ctx, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/attendance/{id}",
    params(
        ("id" = i64, Path, description = "Attendance record ID")
    ),
    request_body = AttendanceUpdate,
    responses(
        (status = 200, description = "Record updated", body = Attendance),
        (status = 400, description = "No fields to update", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Requires director or profesor", body = ErrorResponse),
        (status = 404, description = "Record not found", body = ErrorResponse)
    ),
    tag = "Attendance",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, update))]
pub async fn update_attendance(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
    ValidatedJson(update): ValidatedJson<AttendanceUpdate>,
) -> Result<Json<Attendance>, AppError> {
    let ctx = auth_user.authorize(&state, &RECORD).await?;
    Ok(Json(
        AttendanceService::update(state.store(), &ctx, id, update).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/attendance/{id}",
    params(
        ("id" = i64, Path, description = "Attendance record ID")
    ),
    responses(
        (status = 200, description = "Record deleted", body = MessageResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Requires director", body = ErrorResponse),
        (status = 404, description = "Record not found", body = ErrorResponse)
    ),
    tag = "Attendance",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_attendance(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    let ctx = auth_user.authorize(&state, &DELETE).await?;
    AttendanceService::delete(state.store(), &ctx, id).await?;
    Ok(Json(MessageResponse::new(
        "Registro de asistencia eliminado correctamente",
    )))
}

#[utoipa::path(
    get,
    path = "/api/attendance/excuses",
    responses(
        (status = 200, description = "Excuses visible to the caller, newest first", body = Vec<Excuse>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Caller has no profile in the institution", body = ErrorResponse)
    ),
    tag = "Attendance",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_excuses(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<Excuse>>, AppError> {
    let ctx = auth_user.authorize(&state, &READ).await?;
    Ok(Json(AttendanceService::list_excuses(state.store(), &ctx).await?))
}

#[utoipa::path(
    post,
    path = "/api/attendance/excuses",
    request_body = ExcuseCreate,
    responses(
        (status = 201, description = "Excuse submitted as pending", body = Excuse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Requires estudiante", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    tag = "Attendance",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, dto))]
pub async fn create_excuse(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<ExcuseCreate>,
) -> Result<(StatusCode, Json<Excuse>), AppError> {
    let ctx = auth_user.authorize(&state, &SUBMIT_EXCUSE).await?;
    let excuse = AttendanceService::submit_excuse(state.store(), &ctx, dto).await?;
    Ok((StatusCode::CREATED, Json(excuse)))
}

#[utoipa::path(
    patch,
    path = "/api/attendance/excuses/{id}",
    params(
        ("id" = i64, Path, description = "Excuse ID")
    ),
    request_body = ExcuseReview,
    responses(
        (status = 200, description = "Excuse reviewed", body = Excuse),
        (status = 400, description = "Not a decision, or already reviewed", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Requires director or profesor", body = ErrorResponse),
        (status = 404, description = "Excuse not found", body = ErrorResponse)
    ),
    tag = "Attendance",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn review_excuse(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
    Json(review): Json<ExcuseReview>,
) -> Result<Json<Excuse>, AppError> {
    let ctx = auth_user.authorize(&state, &REVIEW_EXCUSE).await?;
    Ok(Json(
        AttendanceService::review_excuse(state.store(), &ctx, id, review).await?,
    ))
}
