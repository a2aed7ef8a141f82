//! People of one tenant: students, teachers and directors.
//!
//! All three live in `{schema}_usuarios` and differ only by `rol`, so the
//! resource modules share these operations and pass the role they act on.

use anyhow::anyhow;
use aula_auth::AccessGate;
use aula_core::{AppError, Entity, TenantTable};
use aula_models::users::{NewUser, UpdateUserDto};
use aula_models::{IdentityContext, Role, UserProfile};
use aula_store::{Query, Store, StoreExt};
use chrono::{SecondsFormat, Utc};
use serde_json::{Value, json};
use tracing::instrument;

use crate::metrics::{track_role_changed, track_user_created, track_user_deleted};

/// Role a module manages, with the words used in its responses.
#[derive(Debug, Clone, Copy)]
pub struct RoleScope {
    pub role: Role,
    pub noun: &'static str,
    pub not_found: &'static str,
    pub deleted: &'static str,
}

pub const STUDENTS: RoleScope = RoleScope {
    role: Role::Estudiante,
    noun: "estudiante",
    not_found: "Estudiante no encontrado",
    deleted: "Estudiante eliminado correctamente",
};

pub const TEACHERS: RoleScope = RoleScope {
    role: Role::Profesor,
    noun: "profesor",
    not_found: "Profesor no encontrado",
    deleted: "Profesor eliminado correctamente",
};

pub const DIRECTORS: RoleScope = RoleScope {
    role: Role::Director,
    noun: "director",
    not_found: "Director no encontrado",
    deleted: "Director eliminado correctamente",
};

pub(crate) fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn users_table(ctx: &IdentityContext) -> TenantTable {
    ctx.schema.table(Entity::Users)
}

pub struct UserService;

impl UserService {
    /// Users with the scope's role, by surname.
    #[instrument(skip(store, ctx), fields(tenant.schema = %ctx.schema))]
    pub async fn list_by_role(
        store: &dyn Store,
        ctx: &IdentityContext,
        scope: RoleScope,
    ) -> Result<Vec<UserProfile>, AppError> {
        let query = Query::new()
            .eq("rol", scope.role)
            .order_asc("apellido");
        Ok(store.fetch(&users_table(ctx), &query).await?)
    }

    /// Users with the scope's role, newest first.
    #[instrument(skip(store, ctx), fields(tenant.schema = %ctx.schema))]
    pub async fn list_recent_by_role(
        store: &dyn Store,
        ctx: &IdentityContext,
        scope: RoleScope,
    ) -> Result<Vec<UserProfile>, AppError> {
        let query = Query::new()
            .eq("rol", scope.role)
            .order_desc("created_at");
        Ok(store.fetch(&users_table(ctx), &query).await?)
    }

    /// Every user of the tenant, newest first.
    #[instrument(skip(store, ctx), fields(tenant.schema = %ctx.schema))]
    pub async fn list_all(
        store: &dyn Store,
        ctx: &IdentityContext,
    ) -> Result<Vec<UserProfile>, AppError> {
        let query = Query::new().order_desc("created_at");
        Ok(store.fetch(&users_table(ctx), &query).await?)
    }

    #[instrument(skip(store, ctx), fields(tenant.schema = %ctx.schema))]
    pub async fn find_by_id(
        store: &dyn Store,
        ctx: &IdentityContext,
        id: i64,
    ) -> Result<Option<UserProfile>, AppError> {
        let query = Query::new().eq("id", id).limit(1);
        Ok(store.fetch_one(&users_table(ctx), &query).await?)
    }

    /// The user `id` if it has the scope's role, else 404.
    #[instrument(skip(store, ctx), fields(tenant.schema = %ctx.schema))]
    pub async fn get_by_role(
        store: &dyn Store,
        ctx: &IdentityContext,
        id: i64,
        scope: RoleScope,
    ) -> Result<UserProfile, AppError> {
        let query = Query::new().eq("id", id).eq("rol", scope.role).limit(1);
        store
            .fetch_one(&users_table(ctx), &query)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!(scope.not_found)))
    }

    /// Users among `ids` with the given role. No store call for an empty list.
    #[instrument(skip(store, ctx, ids), fields(tenant.schema = %ctx.schema, ids = ids.len()))]
    pub async fn list_by_ids(
        store: &dyn Store,
        ctx: &IdentityContext,
        ids: &[i64],
        role: Role,
    ) -> Result<Vec<UserProfile>, AppError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = Query::new()
            .in_list("id", ids)
            .eq("rol", role)
            .order_asc("apellido");
        Ok(store.fetch(&users_table(ctx), &query).await?)
    }

    /// Inserts a person into the caller's tenant.
    ///
    /// The email must belong to the caller's institution and be unused there.
    #[instrument(skip(store, gate, ctx, new_user), fields(tenant.schema = %ctx.schema, user.email = %new_user.email))]
    pub async fn create(
        store: &dyn Store,
        gate: &AccessGate,
        ctx: &IdentityContext,
        new_user: NewUser,
        scope: RoleScope,
    ) -> Result<UserProfile, AppError> {
        gate.ensure_same_tenant(ctx, &new_user.email, scope.noun)?;

        let table = users_table(ctx);
        let taken = Query::new().eq("email", &new_user.email).limit(1);
        if !store.select(&table, &taken).await?.is_empty() {
            return Err(AppError::bad_request(anyhow!(
                "Ya existe un usuario con el email {}",
                new_user.email
            )));
        }

        let created: UserProfile = store.create(&table, &new_user).await?;
        track_user_created(scope.role.as_str());
        Ok(created)
    }

    /// Applies a partial update and returns the row as stored afterwards.
    #[instrument(skip(store, gate, ctx, dto), fields(tenant.schema = %ctx.schema))]
    pub async fn update(
        store: &dyn Store,
        gate: &AccessGate,
        ctx: &IdentityContext,
        id: i64,
        dto: UpdateUserDto,
        scope: RoleScope,
    ) -> Result<UserProfile, AppError> {
        if let Some(email) = &dto.email {
            gate.ensure_same_tenant(ctx, email, scope.noun)?;
        }

        let mut patch = dto.to_patch();
        if patch.is_empty() {
            return Err(AppError::bad_request(anyhow!("No hay campos para actualizar")));
        }

        Self::get_by_role(store, ctx, id, scope).await?;

        patch.insert("updated_at".to_string(), Value::from(now_timestamp()));
        let query = Query::new().eq("id", id).eq("rol", scope.role);
        store
            .update(&users_table(ctx), &query, Value::Object(patch))
            .await?;

        Self::find_by_id(store, ctx, id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!(scope.not_found)))
    }

    #[instrument(skip(store, ctx), fields(tenant.schema = %ctx.schema))]
    pub async fn delete(
        store: &dyn Store,
        ctx: &IdentityContext,
        id: i64,
        scope: RoleScope,
    ) -> Result<(), AppError> {
        let query = Query::new().eq("id", id).eq("rol", scope.role);
        let removed = store.delete(&users_table(ctx), &query).await?;
        if removed.is_empty() {
            return Err(AppError::not_found(anyhow!(scope.not_found)));
        }
        track_user_deleted(scope.role.as_str());
        Ok(())
    }

    #[instrument(skip(store, ctx), fields(tenant.schema = %ctx.schema))]
    pub async fn change_role(
        store: &dyn Store,
        ctx: &IdentityContext,
        id: i64,
        role: Role,
    ) -> Result<UserProfile, AppError> {
        let patch = json!({ "rol": role.as_str(), "updated_at": now_timestamp() });
        let updated: Vec<UserProfile> = store
            .modify(&users_table(ctx), &Query::new().eq("id", id), patch)
            .await?;
        let user = updated
            .into_iter()
            .next()
            .ok_or_else(|| AppError::not_found(anyhow!("Usuario no encontrado")))?;
        track_role_changed(role.as_str());
        Ok(user)
    }
}
