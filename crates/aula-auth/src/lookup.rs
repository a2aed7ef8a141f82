use std::sync::Arc;

use aula_core::{Entity, Schema};
use aula_models::UserProfile;
use aula_store::{Query, Store, StoreError};
use tracing::instrument;

/// Point lookup of a caller's profile inside their tenant.
#[derive(Clone, Debug)]
pub struct UserLookup {
    store: Arc<dyn Store>,
}

impl UserLookup {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// First row of `{schema}_usuarios` whose email matches, or `None`.
    ///
    /// A store failure is an error, never "no such user".
    #[instrument(skip(self), fields(tenant.schema = %schema))]
    pub async fn by_email(
        &self,
        email: &str,
        schema: &Schema,
    ) -> Result<Option<UserProfile>, StoreError> {
        let query = Query::new().eq("email", email).limit(1);
        let row = self
            .store
            .select(&schema.table(Entity::Users), &query)
            .await?
            .into_iter()
            .next();

        row.map(|row| UserProfile::try_from(row).map_err(|e| StoreError::Decode(e.to_string())))
            .transpose()
    }
}
