use aula_core::{AppError, Entity, TenantDirectory};
use aula_models::courses::Enrollment;
use aula_models::directors::{AllUsersResponse, InstitutionOverview, InstitutionStats, UsersByRole};
use aula_models::{IdentityContext, Role, UserProfile};
use aula_store::{Query, Store, StoreExt};
use tracing::instrument;

use crate::modules::users::UserService;

const RECENT_LIMIT: usize = 5;

pub struct DirectorService;

impl DirectorService {
    /// Headcounts and latest activity of the caller's institution.
    #[instrument(skip(store, tenants, ctx), fields(tenant.schema = %ctx.schema))]
    pub async fn overview(
        store: &dyn Store,
        tenants: &TenantDirectory,
        ctx: &IdentityContext,
    ) -> Result<InstitutionOverview, AppError> {
        let users = ctx.schema.table(Entity::Users);
        let courses = ctx.schema.table(Entity::Courses);
        let enrollments = ctx.schema.table(Entity::Enrollments);
        let students = Query::new().eq("rol", Role::Estudiante);
        let teachers = Query::new().eq("rol", Role::Profesor);
        let everything = Query::new();
        let recent = Query::new().order_desc("created_at").limit(RECENT_LIMIT);

        let (total_students, total_teachers, total_courses, total_enrollments) = tokio::try_join!(
            store.count(&users, &students),
            store.count(&users, &teachers),
            store.count(&courses, &everything),
            store.count(&enrollments, &everything),
        )?;

        let (recent_enrollments, recent_users): (Vec<Enrollment>, Vec<UserProfile>) = tokio::try_join!(
            store.fetch(&enrollments, &recent),
            store.fetch(&users, &recent),
        )?;

        Ok(InstitutionOverview {
            institution_name: tenants.institution_name(&ctx.domain),
            domain: ctx.domain.to_string(),
            stats: InstitutionStats {
                total_students,
                total_teachers,
                total_courses,
                total_enrollments,
            },
            recent_enrollments,
            recent_users,
        })
    }

    /// Every user of the institution split by role, newest first within each group.
    #[instrument(skip(store, tenants, ctx), fields(tenant.schema = %ctx.schema))]
    pub async fn all_users(
        store: &dyn Store,
        tenants: &TenantDirectory,
        ctx: &IdentityContext,
    ) -> Result<AllUsersResponse, AppError> {
        let users = UserService::list_all(store, ctx).await?;
        let total_users = users.len();
        let users_by_role = UsersByRole::group(users);
        let role_counts = users_by_role.counts();

        Ok(AllUsersResponse {
            institution: tenants.institution_name(&ctx.domain),
            total_users,
            users_by_role,
            role_counts,
        })
    }
}
