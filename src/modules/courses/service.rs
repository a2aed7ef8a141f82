use std::collections::HashSet;

use anyhow::anyhow;
use aula_core::{AppError, Entity, TenantTable};
use aula_models::courses::{Course, CourseDto, Enrollment, EnrollmentDto, MyCourse};
use aula_models::{IdentityContext, Role, UserProfile};
use aula_store::{Query, Store, StoreExt};
use serde_json::{Value, json};
use tracing::{debug, instrument};

use crate::metrics::{track_course_created, track_enrollment_created};
use crate::modules::students::service::StudentService;
use crate::modules::users::{TEACHERS, UserService};

const COURSE_NOT_FOUND: &str = "Curso no encontrado";

fn courses(ctx: &IdentityContext) -> TenantTable {
    ctx.schema.table(Entity::Courses)
}

fn enrollments(ctx: &IdentityContext) -> TenantTable {
    ctx.schema.table(Entity::Enrollments)
}

pub struct CourseService;

impl CourseService {
    #[instrument(skip(store, ctx), fields(tenant.schema = %ctx.schema))]
    pub async fn list(store: &dyn Store, ctx: &IdentityContext) -> Result<Vec<Course>, AppError> {
        let query = Query::new().order_asc("nombre");
        Ok(store.fetch(&courses(ctx), &query).await?)
    }

    #[instrument(skip(store, ctx), fields(tenant.schema = %ctx.schema))]
    pub async fn get(
        store: &dyn Store,
        ctx: &IdentityContext,
        id: i64,
    ) -> Result<Course, AppError> {
        let query = Query::new().eq("id", id).limit(1);
        store
            .fetch_one(&courses(ctx), &query)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!(COURSE_NOT_FOUND)))
    }

    async fn ensure_teacher(
        store: &dyn Store,
        ctx: &IdentityContext,
        profesor_id: Option<i64>,
    ) -> Result<(), AppError> {
        let Some(profesor_id) = profesor_id else {
            return Ok(());
        };
        match UserService::get_by_role(store, ctx, profesor_id, TEACHERS).await {
            Ok(_) => Ok(()),
            Err(err) if err.status.is_client_error() => Err(AppError::bad_request(anyhow!(
                "El profesor especificado no existe"
            ))),
            Err(err) => Err(err),
        }
    }

    #[instrument(skip(store, ctx, dto), fields(tenant.schema = %ctx.schema))]
    pub async fn create(
        store: &dyn Store,
        ctx: &IdentityContext,
        dto: CourseDto,
    ) -> Result<Course, AppError> {
        Self::ensure_teacher(store, ctx, dto.profesor_id).await?;

        let course: Course = store
            .create(&courses(ctx), &Value::Object(dto.to_replacement()))
            .await?;
        track_course_created();
        Ok(course)
    }

    /// Replaces every editable column of the course.
    #[instrument(skip(store, ctx, dto), fields(tenant.schema = %ctx.schema))]
    pub async fn update(
        store: &dyn Store,
        ctx: &IdentityContext,
        id: i64,
        dto: CourseDto,
    ) -> Result<Course, AppError> {
        Self::get(store, ctx, id).await?;
        Self::ensure_teacher(store, ctx, dto.profesor_id).await?;

        let updated: Vec<Course> = store
            .modify(
                &courses(ctx),
                &Query::new().eq("id", id),
                Value::Object(dto.to_replacement()),
            )
            .await?;
        updated
            .into_iter()
            .next()
            .ok_or_else(|| AppError::not_found(anyhow!(COURSE_NOT_FOUND)))
    }

    /// Deletes a course together with its enrollments.
    #[instrument(skip(store, ctx), fields(tenant.schema = %ctx.schema))]
    pub async fn delete(store: &dyn Store, ctx: &IdentityContext, id: i64) -> Result<(), AppError> {
        Self::get(store, ctx, id).await?;

        let removed = store
            .delete(&enrollments(ctx), &Query::new().eq("curso_id", id))
            .await?;
        debug!(course_id = id, enrollments = removed.len(), "Removed course enrollments");

        store
            .delete(&courses(ctx), &Query::new().eq("id", id))
            .await?;
        Ok(())
    }

    /// Courses the caller teaches (teachers only) followed by the ones they
    /// are enrolled in. A course appears once, as taught if both apply.
    #[instrument(skip(store, ctx), fields(tenant.schema = %ctx.schema))]
    pub async fn my_courses(
        store: &dyn Store,
        ctx: &IdentityContext,
    ) -> Result<Vec<MyCourse>, AppError> {
        let mut result = Vec::new();
        let mut seen = HashSet::new();

        if ctx.is(Role::Profesor) {
            let query = Query::new()
                .eq("profesor_id", ctx.user_id)
                .order_asc("nombre");
            let taught: Vec<Course> = store.fetch(&courses(ctx), &query).await?;
            for course in taught {
                seen.insert(course.id);
                result.push(MyCourse {
                    course,
                    relacion: "profesor".to_string(),
                });
            }
        }

        let query = Query::new()
            .eq("usuario_id", ctx.user_id)
            .select("curso_id");
        let rows = store.select(&enrollments(ctx), &query).await?;
        let enrolled: Vec<i64> = rows
            .iter()
            .filter_map(|row| row.get("curso_id").and_then(Value::as_i64))
            .filter(|id| !seen.contains(id))
            .collect();

        if !enrolled.is_empty() {
            let query = Query::new().in_list("id", &enrolled).order_asc("nombre");
            let joined: Vec<Course> = store.fetch(&courses(ctx), &query).await?;
            result.extend(joined.into_iter().map(|course| MyCourse {
                course,
                relacion: "inscrito".to_string(),
            }));
        }

        Ok(result)
    }

    #[instrument(skip(store, ctx), fields(tenant.schema = %ctx.schema))]
    pub async fn enrollments(
        store: &dyn Store,
        ctx: &IdentityContext,
        curso_id: i64,
    ) -> Result<Vec<Enrollment>, AppError> {
        Self::get(store, ctx, curso_id).await?;
        let query = Query::new()
            .eq("curso_id", curso_id)
            .order_asc("created_at");
        Ok(store.fetch(&enrollments(ctx), &query).await?)
    }

    #[instrument(skip(store, ctx), fields(tenant.schema = %ctx.schema))]
    pub async fn students(
        store: &dyn Store,
        ctx: &IdentityContext,
        curso_id: i64,
    ) -> Result<Vec<UserProfile>, AppError> {
        Self::get(store, ctx, curso_id).await?;
        StudentService::list_by_course(store, ctx, curso_id).await
    }

    /// Enrolls an existing user of the tenant in an existing course, once.
    #[instrument(skip(store, ctx), fields(tenant.schema = %ctx.schema))]
    pub async fn enroll(
        store: &dyn Store,
        ctx: &IdentityContext,
        dto: EnrollmentDto,
    ) -> Result<Enrollment, AppError> {
        UserService::find_by_id(store, ctx, dto.usuario_id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Usuario no encontrado")))?;
        Self::get(store, ctx, dto.curso_id).await?;

        let table = enrollments(ctx);
        let existing = Query::new()
            .eq("usuario_id", dto.usuario_id)
            .eq("curso_id", dto.curso_id)
            .limit(1);
        if !store.select(&table, &existing).await?.is_empty() {
            return Err(AppError::bad_request(anyhow!(
                "El usuario ya está inscrito en este curso"
            )));
        }

        let enrollment: Enrollment = store.create(&table, &dto).await?;
        track_enrollment_created();
        Ok(enrollment)
    }

    #[instrument(skip(store, ctx), fields(tenant.schema = %ctx.schema))]
    pub async fn unenroll(
        store: &dyn Store,
        ctx: &IdentityContext,
        inscripcion_id: i64,
    ) -> Result<(), AppError> {
        let removed = store
            .delete(&enrollments(ctx), &Query::new().eq("id", inscripcion_id))
            .await?;
        if removed.is_empty() {
            return Err(AppError::not_found(anyhow!("Inscripción no encontrada")));
        }
        Ok(())
    }

    #[instrument(skip(store, ctx), fields(tenant.schema = %ctx.schema))]
    pub async fn assign_teacher(
        store: &dyn Store,
        ctx: &IdentityContext,
        curso_id: i64,
        profesor_id: i64,
    ) -> Result<Course, AppError> {
        Self::get(store, ctx, curso_id).await?;
        UserService::get_by_role(store, ctx, profesor_id, TEACHERS).await?;

        let updated: Vec<Course> = store
            .modify(
                &courses(ctx),
                &Query::new().eq("id", curso_id),
                json!({ "profesor_id": profesor_id }),
            )
            .await?;
        updated
            .into_iter()
            .next()
            .ok_or_else(|| AppError::not_found(anyhow!(COURSE_NOT_FOUND)))
    }
}
