use anyhow::anyhow;
use aula_core::{AppError, Entity, TenantTable};
use aula_models::grades::{Grade, GradeCreate, GradeImportResponse, GradeUpdate, NewGrade};
use aula_models::{IdentityContext, Role};
use aula_store::{Query, Store, StoreExt};
use serde_json::Value;
use tracing::{info, instrument};

use crate::metrics::{track_grade_import, track_grades_recorded};
use crate::modules::grades::import::{self, FileFormat};
use crate::modules::users::service::now_timestamp;

const GRADE_NOT_FOUND: &str = "Nota no encontrada";

fn grades(ctx: &IdentityContext) -> TenantTable {
    ctx.schema.table(Entity::Grades)
}

fn stamp_all(records: Vec<GradeCreate>) -> Vec<NewGrade> {
    let registered_at = now_timestamp();
    records
        .into_iter()
        .map(|record| record.stamped(&registered_at))
        .collect()
}

pub struct GradeService;

impl GradeService {
    /// Grades visible to the caller. Students only see their own.
    #[instrument(skip(store, ctx), fields(tenant.schema = %ctx.schema))]
    pub async fn list(store: &dyn Store, ctx: &IdentityContext) -> Result<Vec<Grade>, AppError> {
        let mut query = Query::new().order_desc("registered_at");
        if ctx.is(Role::Estudiante) {
            query = query.eq("student_id", ctx.user_id);
        }
        Ok(store.fetch(&grades(ctx), &query).await?)
    }

    #[instrument(skip(store, ctx), fields(tenant.schema = %ctx.schema))]
    pub async fn list_by_course(
        store: &dyn Store,
        ctx: &IdentityContext,
        course_id: i64,
    ) -> Result<Vec<Grade>, AppError> {
        let query = Query::new()
            .eq("course_id", course_id)
            .order_asc("student_id");
        Ok(store.fetch(&grades(ctx), &query).await?)
    }

    /// Inserts every record in one bulk call.
    #[instrument(skip(store, ctx, records), fields(tenant.schema = %ctx.schema, records = records.len()))]
    pub async fn record(
        store: &dyn Store,
        ctx: &IdentityContext,
        records: Vec<GradeCreate>,
    ) -> Result<Vec<Grade>, AppError> {
        if records.is_empty() {
            return Err(AppError::bad_request(anyhow!("No se enviaron notas para registrar")));
        }
        let inserted: Vec<Grade> = store
            .create_many(&grades(ctx), &stamp_all(records))
            .await?;
        track_grades_recorded("json", inserted.len());
        Ok(inserted)
    }

    /// Reads a CSV or spreadsheet and inserts the readable rows.
    ///
    /// Nothing is written when no row could be read.
    #[instrument(skip(store, ctx, bytes), fields(tenant.schema = %ctx.schema, size = bytes.len()))]
    pub async fn import(
        store: &dyn Store,
        ctx: &IdentityContext,
        filename: &str,
        bytes: &[u8],
    ) -> Result<GradeImportResponse, AppError> {
        let format = FileFormat::from_filename(filename)?;
        let parsed = import::parse(format, bytes)?;
        let skipped_rows = parsed.skipped;

        let inserted: Vec<Grade> = if parsed.rows.is_empty() {
            Vec::new()
        } else {
            store
                .create_many(&grades(ctx), &stamp_all(parsed.rows))
                .await?
        };

        info!(
            inserted = inserted.len(),
            skipped = skipped_rows,
            "Grade file imported"
        );
        track_grade_import(inserted.len(), skipped_rows);

        let message = if inserted.is_empty() {
            "El archivo no contiene filas válidas"
        } else {
            "Archivo procesado e importado correctamente"
        };
        Ok(GradeImportResponse {
            message: message.to_string(),
            inserted_count: inserted.len(),
            inserted,
            skipped_rows,
        })
    }

    #[instrument(skip(store, ctx, update), fields(tenant.schema = %ctx.schema))]
    pub async fn update(
        store: &dyn Store,
        ctx: &IdentityContext,
        id: i64,
        update: GradeUpdate,
    ) -> Result<Grade, AppError> {
        let patch = update.to_patch();
        if patch.is_empty() {
            return Err(AppError::bad_request(anyhow!("No hay campos para actualizar")));
        }
        let updated: Vec<Grade> = store
            .modify(&grades(ctx), &Query::new().eq("id", id), Value::Object(patch))
            .await?;
        updated
            .into_iter()
            .next()
            .ok_or_else(|| AppError::not_found(anyhow!(GRADE_NOT_FOUND)))
    }

    #[instrument(skip(store, ctx), fields(tenant.schema = %ctx.schema))]
    pub async fn delete(store: &dyn Store, ctx: &IdentityContext, id: i64) -> Result<(), AppError> {
        let removed = store
            .delete(&grades(ctx), &Query::new().eq("id", id))
            .await?;
        if removed.is_empty() {
            return Err(AppError::not_found(anyhow!(GRADE_NOT_FOUND)));
        }
        Ok(())
    }
}
