use anyhow::anyhow;
use aula_core::{AppError, Entity, TenantTable};
use aula_models::attendance::{
    Attendance, AttendanceCreate, AttendanceSession, AttendanceStatus, AttendanceUpdate, Excuse,
    ExcuseCreate, ExcuseReview, ExcuseStatus,
};
use aula_models::{IdentityContext, Role};
use aula_store::{Query, Store, StoreExt};
use chrono::NaiveDate;
use serde_json::{Value, json};
use tracing::{info, instrument};

use crate::metrics::{track_attendance_recorded, track_excuse_reviewed};

const RECORD_NOT_FOUND: &str = "Registro de asistencia no encontrado";
const EXCUSE_NOT_FOUND: &str = "Excusa no encontrada";

fn attendance(ctx: &IdentityContext) -> TenantTable {
    ctx.schema.table(Entity::Attendance)
}

fn excuses(ctx: &IdentityContext) -> TenantTable {
    ctx.schema.table(Entity::Excuses)
}

pub struct AttendanceService;

impl AttendanceService {
    /// Attendance visible to the caller, latest sessions first.
    #[instrument(skip(store, ctx), fields(tenant.schema = %ctx.schema))]
    pub async fn list(
        store: &dyn Store,
        ctx: &IdentityContext,
    ) -> Result<Vec<Attendance>, AppError> {
        let mut query = Query::new().order_desc("fecha");
        if ctx.is(Role::Estudiante) {
            query = query.eq("estudiante_id", ctx.user_id);
        }
        Ok(store.fetch(&attendance(ctx), &query).await?)
    }

    #[instrument(skip(store, ctx, dto), fields(tenant.schema = %ctx.schema))]
    pub async fn create(
        store: &dyn Store,
        ctx: &IdentityContext,
        dto: AttendanceCreate,
    ) -> Result<Attendance, AppError> {
        let record: Attendance = store
            .create(&attendance(ctx), &dto.recorded_by(ctx.user_id))
            .await?;
        track_attendance_recorded(1);
        Ok(record)
    }

    /// Records a whole class session in one bulk insert.
    #[instrument(skip(store, ctx, session), fields(tenant.schema = %ctx.schema, curso_id = session.curso_id))]
    pub async fn record_session(
        store: &dyn Store,
        ctx: &IdentityContext,
        session: AttendanceSession,
    ) -> Result<Vec<Attendance>, AppError> {
        let records = session.into_records(ctx.user_id);
        let created: Vec<Attendance> = store.create_many(&attendance(ctx), &records).await?;
        track_attendance_recorded(created.len());
        Ok(created)
    }

    #[instrument(skip(store, ctx), fields(tenant.schema = %ctx.schema))]
    pub async fn list_by_course(
        store: &dyn Store,
        ctx: &IdentityContext,
        curso_id: i64,
        fecha: Option<NaiveDate>,
    ) -> Result<Vec<Attendance>, AppError> {
        let mut query = Query::new().eq("curso_id", curso_id);
        if let Some(fecha) = fecha {
            query = query.eq("fecha", fecha);
        }
        Ok(store
            .fetch(&attendance(ctx), &query.order_desc("fecha"))
            .await?)
    }

    /// Attendance of one student. Students may only ask for their own.
    #[instrument(skip(store, ctx), fields(tenant.schema = %ctx.schema))]
    pub async fn list_by_student(
        store: &dyn Store,
        ctx: &IdentityContext,
        estudiante_id: i64,
    ) -> Result<Vec<Attendance>, AppError> {
        if ctx.is(Role::Estudiante) && ctx.user_id != estudiante_id {
            return Err(AppError::forbidden(anyhow!(
                "Solo puedes ver tu propia asistencia"
            )));
        }
        let query = Query::new()
            .eq("estudiante_id", estudiante_id)
            .order_desc("fecha");
        Ok(store.fetch(&attendance(ctx), &query).await?)
    }

    #[instrument(skip(store, ctx), fields(tenant.schema = %ctx.schema))]
    pub async fn get(
        store: &dyn Store,
        ctx: &IdentityContext,
        id: i64,
    ) -> Result<Attendance, AppError> {
        let query = Query::new().eq("id", id).limit(1);
        store
            .fetch_one(&attendance(ctx), &query)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!(RECORD_NOT_FOUND)))
    }

    #[instrument(skip(store, ctx, update), fields(tenant.schema = %ctx.schema))]
    pub async fn update(
        store: &dyn Store,
        ctx: &IdentityContext,
        id: i64,
        update: AttendanceUpdate,
    ) -> Result<Attendance, AppError> {
        let patch = update.to_patch();
        if patch.is_empty() {
            return Err(AppError::bad_request(anyhow!("No hay campos para actualizar")));
        }
        let updated: Vec<Attendance> = store
            .modify(&attendance(ctx), &Query::new().eq("id", id), Value::Object(patch))
            .await?;
        updated
            .into_iter()
            .next()
            .ok_or_else(|| AppError::not_found(anyhow!(RECORD_NOT_FOUND)))
    }

    #[instrument(skip(store, ctx), fields(tenant.schema = %ctx.schema))]
    pub async fn delete(store: &dyn Store, ctx: &IdentityContext, id: i64) -> Result<(), AppError> {
        let removed = store
            .delete(&attendance(ctx), &Query::new().eq("id", id))
            .await?;
        if removed.is_empty() {
            return Err(AppError::not_found(anyhow!(RECORD_NOT_FOUND)));
        }
        Ok(())
    }

    #[instrument(skip(store, ctx), fields(tenant.schema = %ctx.schema))]
    pub async fn list_excuses(
        store: &dyn Store,
        ctx: &IdentityContext,
    ) -> Result<Vec<Excuse>, AppError> {
        let mut query = Query::new().order_desc("created_at");
        if ctx.is(Role::Estudiante) {
            query = query.eq("estudiante_id", ctx.user_id);
        }
        Ok(store.fetch(&excuses(ctx), &query).await?)
    }

    /// Files an excuse on behalf of the calling student.
    #[instrument(skip(store, ctx, dto), fields(tenant.schema = %ctx.schema))]
    pub async fn submit_excuse(
        store: &dyn Store,
        ctx: &IdentityContext,
        dto: ExcuseCreate,
    ) -> Result<Excuse, AppError> {
        Ok(store
            .create(&excuses(ctx), &dto.submitted_by(ctx.user_id))
            .await?)
    }

    /// Approves or rejects a pending excuse.
    ///
    /// Approval marks the student's attendance for that course and date as
    /// `justificado`.
    #[instrument(skip(store, ctx), fields(tenant.schema = %ctx.schema))]
    pub async fn review_excuse(
        store: &dyn Store,
        ctx: &IdentityContext,
        id: i64,
        review: ExcuseReview,
    ) -> Result<Excuse, AppError> {
        if review.estado == ExcuseStatus::Pendiente {
            return Err(AppError::bad_request(anyhow!(
                "El estado debe ser aprobada o rechazada"
            )));
        }

        let table = excuses(ctx);
        let excuse: Excuse = store
            .fetch_one(&table, &Query::new().eq("id", id).limit(1))
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!(EXCUSE_NOT_FOUND)))?;
        if excuse.estado != ExcuseStatus::Pendiente {
            return Err(AppError::bad_request(anyhow!("La excusa ya fue revisada")));
        }

        let patch = json!({
            "estado": review.estado.as_str(),
            "revisado_por": ctx.user_id,
        });
        let reviewed: Excuse = store
            .modify(&table, &Query::new().eq("id", id), patch)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::not_found(anyhow!(EXCUSE_NOT_FOUND)))?;

        if reviewed.estado == ExcuseStatus::Aprobada {
            let session = Query::new()
                .eq("estudiante_id", reviewed.estudiante_id)
                .eq("curso_id", reviewed.curso_id)
                .eq("fecha", reviewed.fecha);
            let justified = store
                .update(
                    &attendance(ctx),
                    &session,
                    json!({ "estado": AttendanceStatus::Justificado.as_str() }),
                )
                .await?;
            info!(
                excuse_id = id,
                records = justified.len(),
                "Attendance justified by approved excuse"
            );
        }

        track_excuse_reviewed(reviewed.estado.as_str());
        Ok(reviewed)
    }
}
