//! In-process [`Store`] for tests.
//!
//! Evaluates the same filters, ordering and limits as the REST backend over
//! JSON rows held in memory, assigns ids and `created_at` on insert, and
//! counts write calls so tests can assert that a rejected request never
//! reached the store.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use aula_core::TenantTable;
use chrono::{Duration, SecondsFormat, Utc};
use serde_json::{Map, Value, json};

use crate::{Direction, Filter, Query, Store, StoreError};

#[derive(Debug, Default)]
struct State {
    tables: HashMap<String, Vec<Value>>,
    next_id: i64,
    sequence: i64,
    reads: usize,
    writes: usize,
    unavailable: bool,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Adds a row directly, bypassing the write counter. Returns it as stored.
    pub fn seed(&self, table: &TenantTable, row: Value) -> Value {
        let mut state = self.lock();
        let row = state.stamp(row);
        state
            .tables
            .entry(table.to_string())
            .or_default()
            .push(row.clone());
        row
    }

    pub fn rows(&self, table: &TenantTable) -> Vec<Value> {
        self.lock()
            .tables
            .get(table.as_str())
            .cloned()
            .unwrap_or_default()
    }

    /// Number of insert, update and delete calls received.
    pub fn write_count(&self) -> usize {
        self.lock().writes
    }

    pub fn read_count(&self) -> usize {
        self.lock().reads
    }

    /// Makes every subsequent call fail with a 503, as an unreachable backend would.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.lock().unavailable = unavailable;
    }
}

impl State {
    fn check(&self) -> Result<(), StoreError> {
        if self.unavailable {
            Err(StoreError::Status {
                status: 503,
                message: "service unavailable".to_string(),
            })
        } else {
            Ok(())
        }
    }

    fn stamp(&mut self, row: Value) -> Value {
        let mut object = match row {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        if !object.get("id").is_some_and(Value::is_i64) {
            self.next_id += 1;
            object.insert("id".to_string(), json!(self.next_id));
        } else if let Some(id) = object.get("id").and_then(Value::as_i64) {
            self.next_id = self.next_id.max(id);
        }
        if !object.contains_key("created_at") {
            self.sequence += 1;
            let at = Utc::now() + Duration::milliseconds(self.sequence);
            object.insert("created_at".to_string(), json!(at.to_rfc3339_opts(SecondsFormat::Micros, true)));
        }
        Value::Object(object)
    }

    fn matching(&self, table: &TenantTable, query: &Query) -> Vec<Value> {
        let mut rows: Vec<Value> = self
            .tables
            .get(table.as_str())
            .map(|rows| {
                rows.iter()
                    .filter(|row| matches(row, query.filters()))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = query.order() {
            rows.sort_by(|a, b| {
                let ord = compare(a.get(&order.column), b.get(&order.column));
                match order.direction {
                    Direction::Asc => ord,
                    Direction::Desc => ord.reverse(),
                }
            });
        }
        if let Some(limit) = query.limit_value() {
            rows.truncate(limit);
        }
        if let Some(columns) = query.columns().filter(|c| *c != "*") {
            let wanted: Vec<&str> = columns.split(',').map(str::trim).collect();
            rows = rows
                .into_iter()
                .map(|row| project(row, &wanted))
                .collect();
        }
        rows
    }
}

fn project(row: Value, columns: &[&str]) -> Value {
    match row {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(k, _)| columns.contains(&k.as_str()))
                .collect(),
        ),
        other => other,
    }
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a.cmp(b),
    }
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a.and_then(scalar), b.and_then(scalar)) {
        (Some(x), Some(y)) => compare_text(&x, &y),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

fn matches(row: &Value, filters: &[Filter]) -> bool {
    filters.iter().all(|filter| {
        let Some(actual) = row.get(filter.column()).and_then(scalar) else {
            return false;
        };
        match filter {
            Filter::Eq { value, .. } => compare_text(&actual, value) == Ordering::Equal,
            Filter::In { values, .. } => values
                .iter()
                .any(|v| compare_text(&actual, v) == Ordering::Equal),
            Filter::Gte { value, .. } => compare_text(&actual, value) != Ordering::Less,
            Filter::Lte { value, .. } => compare_text(&actual, value) != Ordering::Greater,
        }
    })
}

#[async_trait]
impl Store for MemoryStore {
    async fn select(&self, table: &TenantTable, query: &Query) -> Result<Vec<Value>, StoreError> {
        let mut state = self.lock();
        state.check()?;
        state.reads += 1;
        Ok(state.matching(table, query))
    }

    async fn count(&self, table: &TenantTable, query: &Query) -> Result<u64, StoreError> {
        let mut state = self.lock();
        state.check()?;
        state.reads += 1;
        let unbounded = Query::new();
        let rows = state.matching(table, &unbounded);
        Ok(rows
            .iter()
            .filter(|row| matches(row, query.filters()))
            .count() as u64)
    }

    async fn insert(&self, table: &TenantTable, rows: Vec<Value>) -> Result<Vec<Value>, StoreError> {
        let mut state = self.lock();
        state.check()?;
        state.writes += 1;
        let stored: Vec<Value> = rows.into_iter().map(|row| state.stamp(row)).collect();
        state
            .tables
            .entry(table.to_string())
            .or_default()
            .extend(stored.iter().cloned());
        Ok(stored)
    }

    async fn update(
        &self,
        table: &TenantTable,
        query: &Query,
        patch: Value,
    ) -> Result<Vec<Value>, StoreError> {
        let mut state = self.lock();
        state.check()?;
        state.writes += 1;
        let Value::Object(patch) = patch else {
            return Err(StoreError::status(400, "patch body must be an object"));
        };
        let mut updated = Vec::new();
        if let Some(rows) = state.tables.get_mut(table.as_str()) {
            for row in rows.iter_mut().filter(|row| matches(row, query.filters())) {
                if let Value::Object(map) = row {
                    for (k, v) in &patch {
                        map.insert(k.clone(), v.clone());
                    }
                }
                updated.push(row.clone());
            }
        }
        Ok(updated)
    }

    async fn delete(&self, table: &TenantTable, query: &Query) -> Result<Vec<Value>, StoreError> {
        let mut state = self.lock();
        state.check()?;
        state.writes += 1;
        let mut removed = Vec::new();
        if let Some(rows) = state.tables.get_mut(table.as_str()) {
            let (gone, kept): (Vec<Value>, Vec<Value>) = rows
                .drain(..)
                .partition(|row| matches(row, query.filters()));
            *rows = kept;
            removed = gone;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aula_core::{Entity, TenantDirectory};

    fn users() -> TenantTable {
        TenantDirectory::default()
            .schema_for("ucb.edu.bo")
            .table(Entity::Users)
    }

    #[tokio::test]
    async fn test_insert_assigns_ids_and_counts_writes() {
        let store = MemoryStore::new();
        let rows = store
            .insert(&users(), vec![json!({"email": "a@ucb.edu.bo"}), json!({"email": "b@ucb.edu.bo"})])
            .await
            .unwrap();
        assert_eq!(rows[0]["id"], 1);
        assert_eq!(rows[1]["id"], 2);
        assert!(rows[0]["created_at"].is_string());
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_filters_order_and_limit() {
        let store = MemoryStore::new();
        for (i, rol) in ["estudiante", "profesor", "estudiante", "estudiante"].iter().enumerate() {
            store.seed(&users(), json!({"nombre": format!("u{i}"), "rol": rol}));
        }
        let q = Query::new()
            .eq("rol", "estudiante")
            .order_desc("created_at")
            .limit(2);
        let rows = store.select(&users(), &q).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["nombre"], "u3");
        assert_eq!(rows[1]["nombre"], "u2");
        assert_eq!(store.count(&users(), &q).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_in_filter_and_projection() {
        let store = MemoryStore::new();
        store.seed(&users(), json!({"id": 10, "rol": "estudiante"}));
        store.seed(&users(), json!({"id": 11, "rol": "profesor"}));
        store.seed(&users(), json!({"id": 12, "rol": "estudiante"}));
        let q = Query::new()
            .in_list("id", [10, 11, 12])
            .eq("rol", "estudiante")
            .select("id");
        let rows = store.select(&users(), &q).await.unwrap();
        assert_eq!(rows, vec![json!({"id": 10}), json!({"id": 12})]);
    }

    #[tokio::test]
    async fn test_update_and_delete_return_affected_rows() {
        let store = MemoryStore::new();
        let row = store.seed(&users(), json!({"nombre": "Ana", "rol": "estudiante"}));
        let id = row["id"].as_i64().unwrap();

        let updated = store
            .update(&users(), &Query::new().eq("id", id), json!({"nombre": "Ana María"}))
            .await
            .unwrap();
        assert_eq!(updated[0]["nombre"], "Ana María");

        let none = store
            .delete(&users(), &Query::new().eq("id", id + 100))
            .await
            .unwrap();
        assert!(none.is_empty());

        let gone = store.delete(&users(), &Query::new().eq("id", id)).await.unwrap();
        assert_eq!(gone.len(), 1);
        assert!(store.rows(&users()).is_empty());
    }

    #[tokio::test]
    async fn test_range_filters_on_dates() {
        let store = MemoryStore::new();
        let table = TenantDirectory::default()
            .schema_for("ucb.edu.bo")
            .table(Entity::Attendance);
        store.seed(&table, json!({"fecha": "2024-03-01"}));
        store.seed(&table, json!({"fecha": "2024-03-15"}));
        store.seed(&table, json!({"fecha": "2024-04-02"}));
        let q = Query::new().gte("fecha", "2024-03-01").lte("fecha", "2024-03-31");
        assert_eq!(store.count(&table, &q).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_unavailable_store_fails() {
        let store = MemoryStore::new();
        store.set_unavailable(true);
        let err = store.select(&users(), &Query::new()).await.unwrap_err();
        assert!(matches!(err, StoreError::Status { status: 503, .. }));
    }
}
