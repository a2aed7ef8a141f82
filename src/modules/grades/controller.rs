use anyhow::anyhow;
use aula_auth::Policy;
use aula_core::AppError;
use aula_models::grades::{Grade, GradeCreate, GradeImportResponse, GradeUpdate, GradeWriteResponse};
use aula_models::{MessageResponse, Role};
use axum::{
    Json,
    extract::{Multipart, Path, State, multipart::MultipartError},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;
use utoipa::ToSchema;

use crate::docs::ErrorResponse;
use crate::middleware::auth::AuthUser;
use crate::modules::grades::service::GradeService;
use crate::state::AppState;
use crate::validator::ValidatedJsonList;

const UPLOAD_FIELD: &str = "file";

const READ: Policy = Policy::new(
    &[Role::Director, Role::Profesor, Role::Estudiante],
    "Acceso denegado a las notas",
);
const STAFF: Policy = Policy::new(
    &[Role::Director, Role::Profesor],
    "Solo los directores y profesores pueden gestionar notas",
);
const DELETE: Policy = Policy::new(&[Role::Director], "Solo los directores pueden eliminar notas");

/// Multipart body of the upload endpoint.
#[derive(Debug, Deserialize, ToSchema)]
pub struct GradeUpload {
    /// CSV, XLSX or XLS file with a header row.
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

fn multipart_error(err: MultipartError) -> AppError {
    AppError::message(err.status(), err.body_text())
}

#[utoipa::path(
    get,
    path = "/api/grades",
    responses(
        (status = 200, description = "Grades visible to the caller", body = Vec<Grade>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Caller has no profile in the institution", body = ErrorResponse)
    ),
    tag = "Grades",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_grades(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Vec<Grade>>, AppError> {
    let ctx = auth_user.authorize(&state, &READ).await?;
    Ok(Json(GradeService::list(state.store(), &ctx).await?))
}

#[utoipa::path(
    get,
    path = "/api/grades/course/{course_id}",
    params(
        ("course_id" = i64, Path, description = "Course ID")
    ),
    responses(
        (status = 200, description = "Grades of the course", body = Vec<Grade>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Requires director or profesor", body = ErrorResponse)
    ),
    tag = "Grades",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn get_grades_by_course(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(course_id): Path<i64>,
) -> Result<Json<Vec<Grade>>, AppError> {
    let ctx = auth_user.authorize(&state, &STAFF).await?;
    Ok(Json(
        GradeService::list_by_course(state.store(), &ctx, course_id).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/grades",
    request_body = Vec<GradeCreate>,
    responses(
        (status = 201, description = "Grades recorded", body = GradeWriteResponse<Vec<Grade>>),
        (status = 400, description = "Empty or malformed submission", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Requires director or profesor", body = ErrorResponse),
        (status = 422, description = "Validation failed", body = ErrorResponse)
    ),
    tag = "Grades",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, records))]
pub async fn create_grades(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJsonList(records): ValidatedJsonList<GradeCreate>,
) -> Result<(StatusCode, Json<GradeWriteResponse<Vec<Grade>>>), AppError> {
    let ctx = auth_user.authorize(&state, &STAFF).await?;
    let data = GradeService::record(state.store(), &ctx, records).await?;
    Ok((
        StatusCode::CREATED,
        Json(GradeWriteResponse {
            message: "Notas registradas correctamente".to_string(),
            data,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/grades/upload",
    request_body(content = GradeUpload, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File imported; unreadable rows are counted in skipped_rows", body = GradeImportResponse),
        (status = 400, description = "No file or unsupported format", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Requires director or profesor", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse)
    ),
    tag = "Grades",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, multipart))]
pub async fn upload_grades(
    State(state): State<AppState>,
    auth_user: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<GradeImportResponse>, AppError> {
    let ctx = auth_user.authorize(&state, &STAFF).await?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;
        upload = Some((filename, bytes));
        break;
    }

    let (filename, bytes) =
        upload.ok_or_else(|| AppError::bad_request(anyhow!("Archivo no proporcionado")))?;

    let response = GradeService::import(state.store(), &ctx, &filename, &bytes).await?;
    Ok(Json(response))
}

#[utoipa::path(
    put,
    path = "/api/grades/{id}",
    params(
        ("id" = i64, Path, description = "Grade ID")
    ),
    request_body = GradeUpdate,
    responses(
        (status = 200, description = "Grade updated", body = GradeWriteResponse<Grade>),
        (status = 400, description = "No fields to update", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Requires director or profesor", body = ErrorResponse),
        (status = 404, description = "Grade not found", body = ErrorResponse)
    ),
    tag = "Grades",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user, update))]
pub async fn update_grade(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
    Json(update): Json<GradeUpdate>,
) -> Result<Json<GradeWriteResponse<Grade>>, AppError> {
    let ctx = auth_user.authorize(&state, &STAFF).await?;
    let data = GradeService::update(state.store(), &ctx, id, update).await?;
    Ok(Json(GradeWriteResponse {
        message: "Nota actualizada correctamente".to_string(),
        data,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/grades/{id}",
    params(
        ("id" = i64, Path, description = "Grade ID")
    ),
    responses(
        (status = 200, description = "Grade deleted", body = MessageResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Requires director", body = ErrorResponse),
        (status = 404, description = "Grade not found", body = ErrorResponse)
    ),
    tag = "Grades",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_grade(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, AppError> {
    let ctx = auth_user.authorize(&state, &DELETE).await?;
    GradeService::delete(state.store(), &ctx, id).await?;
    Ok(Json(MessageResponse::new("Nota eliminada correctamente")))
}
