use aula_core::{AppError, Entity};
use aula_models::{IdentityContext, Role, UserProfile};
use aula_store::{Query, Store};
use serde_json::Value;
use tracing::instrument;

use crate::modules::users::UserService;

pub struct StudentService;

impl StudentService {
    /// Students enrolled in `curso_id`, by surname.
    ///
    /// Teachers enrolled in the course are left out.
    #[instrument(skip(store, ctx), fields(tenant.schema = %ctx.schema))]
    pub async fn list_by_course(
        store: &dyn Store,
        ctx: &IdentityContext,
        curso_id: i64,
    ) -> Result<Vec<UserProfile>, AppError> {
        let query = Query::new().eq("curso_id", curso_id).select("usuario_id");
        let rows = store
            .select(&ctx.schema.table(Entity::Enrollments), &query)
            .await?;

        let ids: Vec<i64> = rows
            .iter()
            .filter_map(|row| row.get("usuario_id").and_then(Value::as_i64))
            .collect();

        UserService::list_by_ids(store, ctx, &ids, Role::Estudiante).await
    }
}
