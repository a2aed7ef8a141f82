//! # Aula Store
//!
//! Access to the tenant tables held by the hosted backend.
//!
//! - [`Store`]: the storage seam every service talks to
//! - [`RestStore`]: implementation over the backend's REST interface
//! - [`Query`]: filters, ordering and limits in the backend's dialect
//! - `MemoryStore`: in-process implementation behind the `test-utils` feature
//!
//! # Example
//!
//! ```ignore
//! use aula_store::{Query, RestStore, Store, StoreExt};
//!
//! let store = RestStore::new(&StoreConfig::from_env()?)?;
//! let users = schema.table(Entity::Users);
//! let students: Vec<UserProfile> = store
//!     .fetch(&users, &Query::new().eq("rol", "estudiante"))
//!     .await?;
//! ```

pub mod error;
#[cfg(any(test, feature = "test-utils"))]
pub mod memory;
pub mod query;
pub mod rest;

use std::fmt;

use async_trait::async_trait;
use aula_core::TenantTable;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use error::StoreError;
#[cfg(any(test, feature = "test-utils"))]
pub use memory::MemoryStore;
pub use query::{Direction, Filter, Order, Query};
pub use rest::RestStore;

/// Row-level operations on one tenant table.
///
/// Writes return the affected rows as stored, so callers can tell "nothing
/// matched" apart from success.
#[async_trait]
pub trait Store: Send + Sync + fmt::Debug {
    async fn select(&self, table: &TenantTable, query: &Query) -> Result<Vec<Value>, StoreError>;

    /// Exact number of rows matching `query`. Ordering and limit are ignored.
    async fn count(&self, table: &TenantTable, query: &Query) -> Result<u64, StoreError>;

    /// Inserts one or more rows. More than one row is sent as a single bulk call.
    async fn insert(&self, table: &TenantTable, rows: Vec<Value>) -> Result<Vec<Value>, StoreError>;

    async fn update(
        &self,
        table: &TenantTable,
        query: &Query,
        patch: Value,
    ) -> Result<Vec<Value>, StoreError>;

    async fn delete(&self, table: &TenantTable, query: &Query) -> Result<Vec<Value>, StoreError>;
}

/// Typed helpers layered over [`Store`].
#[async_trait]
pub trait StoreExt: Store {
    async fn fetch<T>(&self, table: &TenantTable, query: &Query) -> Result<Vec<T>, StoreError>
    where
        T: DeserializeOwned + Send,
    {
        decode_rows(self.select(table, query).await?)
    }

    async fn fetch_one<T>(
        &self,
        table: &TenantTable,
        query: &Query,
    ) -> Result<Option<T>, StoreError>
    where
        T: DeserializeOwned + Send,
    {
        decode_first(self.select(table, query).await?)
    }

    /// Inserts a single record and returns it as stored.
    async fn create<T, R>(&self, table: &TenantTable, record: &T) -> Result<R, StoreError>
    where
        T: Serialize + Sync,
        R: DeserializeOwned + Send,
    {
        let row = serde_json::to_value(record)?;
        decode_first(self.insert(table, vec![row]).await?)?
            .ok_or_else(|| StoreError::Decode("insert returned no representation".to_string()))
    }

    async fn create_many<T, R>(&self, table: &TenantTable, records: &[T]) -> Result<Vec<R>, StoreError>
    where
        T: Serialize + Sync,
        R: DeserializeOwned + Send,
    {
        let rows = records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        decode_rows(self.insert(table, rows).await?)
    }

    async fn modify<R>(
        &self,
        table: &TenantTable,
        query: &Query,
        patch: Value,
    ) -> Result<Vec<R>, StoreError>
    where
        R: DeserializeOwned + Send,
    {
        decode_rows(self.update(table, query, patch).await?)
    }
}

impl<S: Store + ?Sized> StoreExt for S {}

pub fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, StoreError> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(StoreError::from))
        .collect()
}

pub fn decode_first<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Option<T>, StoreError> {
    rows.into_iter()
        .next()
        .map(|row| serde_json::from_value(row).map_err(StoreError::from))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Row {
        id: i64,
    }

    #[test]
    fn decode_first_takes_first_row() {
        let rows = vec![json!({"id": 1}), json!({"id": 2})];
        assert_eq!(decode_first::<Row>(rows).unwrap(), Some(Row { id: 1 }));
        assert_eq!(decode_first::<Row>(vec![]).unwrap(), None);
    }

    #[test]
    fn decode_rows_reports_shape_errors() {
        let err = decode_rows::<Row>(vec![json!({"id": "x"})]).unwrap_err();
        assert!(matches!(err, StoreError::Decode(_)));
    }
}
