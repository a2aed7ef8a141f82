//! Bootstrapping the first director of a tenant.
//!
//! Every director-only endpoint needs an existing director, so the first one
//! is written straight to the store.

use std::sync::Arc;

use aula_auth::UserLookup;
use aula_core::{Entity, TenantDirectory};
use aula_models::UserProfile;
use aula_models::users::CreateDirectorDto;
use aula_store::{Store, StoreExt};
use validator::Validate;

pub async fn create_director(
    store: Arc<dyn Store>,
    tenants: &TenantDirectory,
    dto: CreateDirectorDto,
) -> Result<UserProfile, Box<dyn std::error::Error>> {
    dto.validate()?;

    let domain = tenants
        .domain_from_email(&dto.email)
        .ok_or_else(|| format!("{} does not belong to a known institution", dto.email))?;
    let schema = tenants.schema_for(domain.as_str());

    let lookup = UserLookup::new(store.clone());
    if lookup.by_email(dto.email.trim(), &schema).await?.is_some() {
        return Err(format!("A user with email {} already exists in {schema}", dto.email).into());
    }

    let created = store
        .create(&schema.table(Entity::Users), &dto.into_new_user())
        .await?;
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use aula_models::Role;
    use aula_store::MemoryStore;

    fn dto(email: &str) -> CreateDirectorDto {
        CreateDirectorDto {
            nombre: "Elena".into(),
            apellido: "Suárez".into(),
            email: email.into(),
        }
    }

    #[tokio::test]
    async fn creates_director_in_email_tenant() {
        let store = MemoryStore::new();
        let tenants = TenantDirectory::default();
        let created = create_director(Arc::new(store.clone()), &tenants, dto("elena@upb.edu.bo"))
            .await
            .unwrap();
        assert_eq!(created.role(), Some(Role::Director));
        let rows = store.rows(&tenants.schema_for("upb.edu.bo").table(Entity::Users));
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn refuses_duplicates_and_unknown_domains() {
        let store = MemoryStore::new();
        let tenants = TenantDirectory::default();
        let shared: Arc<dyn Store> = Arc::new(store.clone());

        create_director(shared.clone(), &tenants, dto("elena@upb.edu.bo"))
            .await
            .unwrap();
        assert!(
            create_director(shared.clone(), &tenants, dto("elena@upb.edu.bo"))
                .await
                .is_err()
        );
        assert!(
            create_director(shared, &tenants, dto("elena@example.com"))
                .await
                .is_err()
        );
        assert_eq!(store.write_count(), 1);
    }
}
