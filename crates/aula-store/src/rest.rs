//! REST client for the hosted backend.
//!
//! Every call is authenticated with the service key and carries its own
//! deadline. Failures are returned immediately; nothing is retried.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use aula_config::{StoreConfig, StoreTimeouts};
use aula_core::TenantTable;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use tracing::{debug, error, instrument};

use crate::{Query, Store, StoreError};

/// Store backed by the `/rest/v1` interface.
#[derive(Clone)]
pub struct RestStore {
    http: Client,
    base_url: String,
    timeouts: StoreTimeouts,
}

impl std::fmt::Debug for RestStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestStore")
            .field("base_url", &self.base_url)
            .field("timeouts", &self.timeouts)
            .finish_non_exhaustive()
    }
}

impl RestStore {
    /// Builds the client with the `apikey` and bearer headers preset.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Transport` if the key is not a valid header value
    /// or the HTTP client cannot be built.
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&config.service_key)
            .map_err(|e| StoreError::Transport(format!("invalid service key: {e}")))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.service_key))
            .map_err(|e| StoreError::Transport(format!("invalid service key: {e}")))?;
        headers.insert("apikey", key);
        headers.insert(reqwest::header::AUTHORIZATION, bearer);
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );

        let http = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(StoreError::from_reqwest)?;

        Ok(Self {
            http,
            base_url: config.rest_url(),
            timeouts: config.timeouts,
        })
    }

    fn url(&self, table: &TenantTable) -> String {
        format!("{}/{}", self.base_url, table)
    }

    async fn send(
        &self,
        op: &'static str,
        request: RequestBuilder,
        timeout: Duration,
    ) -> Result<Response, StoreError> {
        let started = Instant::now();
        let result = request.timeout(timeout).send().await;
        let elapsed = started.elapsed().as_secs_f64();

        let outcome = match result {
            Ok(response) if response.status().is_success() => Ok(response),
            Ok(response) => {
                let status = response.status().as_u16();
                let body = response.text().await.unwrap_or_default();
                Err(StoreError::status(status, &body))
            }
            Err(e) => Err(StoreError::from_reqwest(e)),
        };

        let label = if outcome.is_ok() { "ok" } else { "error" };
        metrics::counter!("store_requests_total", "op" => op, "status" => label).increment(1);
        metrics::histogram!("store_request_duration_seconds", "op" => op).record(elapsed);

        match &outcome {
            Ok(_) => debug!(store.op = op, elapsed_s = elapsed, "store call completed"),
            Err(e) => error!(store.op = op, error = %e, "store call failed"),
        }
        outcome
    }

    async fn rows(response: Response) -> Result<Vec<Value>, StoreError> {
        let body = response.text().await.map_err(StoreError::from_reqwest)?;
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }
        match serde_json::from_str::<Value>(&body)? {
            Value::Array(rows) => Ok(rows),
            Value::Null => Ok(Vec::new()),
            row @ Value::Object(_) => Ok(vec![row]),
            other => Err(StoreError::Decode(format!("expected rows, got {other}"))),
        }
    }
}

/// Total from a `Content-Range` header such as `0-24/318` or `*/0`.
pub fn parse_content_range_total(header: &str) -> Result<u64, StoreError> {
    header
        .rsplit('/')
        .next()
        .and_then(|total| total.trim().parse().ok())
        .ok_or_else(|| StoreError::Decode(format!("unusable Content-Range: {header}")))
}

#[async_trait]
impl Store for RestStore {
    #[instrument(skip(self, query), fields(store.operation = "SELECT", store.table = %table))]
    async fn select(&self, table: &TenantTable, query: &Query) -> Result<Vec<Value>, StoreError> {
        let request = self.http.get(self.url(table)).query(&query.to_params());
        let response = self.send("select", request, self.timeouts.read).await?;
        Self::rows(response).await
    }

    #[instrument(skip(self, query), fields(store.operation = "COUNT", store.table = %table))]
    async fn count(&self, table: &TenantTable, query: &Query) -> Result<u64, StoreError> {
        let mut params = query.filter_params();
        params.push(("select".to_string(), "id".to_string()));
        let request = self
            .http
            .get(self.url(table))
            .header("Prefer", "count=exact")
            .query(&params);
        let response = self.send("count", request, self.timeouts.read).await?;

        let header = response
            .headers()
            .get(reqwest::header::CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| StoreError::Decode("missing Content-Range header".to_string()))?;
        parse_content_range_total(header)
    }

    #[instrument(skip(self, rows), fields(store.operation = "INSERT", store.table = %table, store.rows = rows.len()))]
    async fn insert(&self, table: &TenantTable, rows: Vec<Value>) -> Result<Vec<Value>, StoreError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let (op, timeout) = if rows.len() > 1 {
            ("bulk_insert", self.timeouts.bulk)
        } else {
            ("insert", self.timeouts.write)
        };
        let request = self
            .http
            .post(self.url(table))
            .header("Prefer", "return=representation")
            .json(&rows);
        let response = self.send(op, request, timeout).await?;
        Self::rows(response).await
    }

    #[instrument(skip(self, query, patch), fields(store.operation = "UPDATE", store.table = %table))]
    async fn update(
        &self,
        table: &TenantTable,
        query: &Query,
        patch: Value,
    ) -> Result<Vec<Value>, StoreError> {
        let request = self
            .http
            .patch(self.url(table))
            .header("Prefer", "return=representation")
            .query(&query.filter_params())
            .json(&patch);
        let response = self.send("update", request, self.timeouts.write).await?;
        Self::rows(response).await
    }

    #[instrument(skip(self, query), fields(store.operation = "DELETE", store.table = %table))]
    async fn delete(&self, table: &TenantTable, query: &Query) -> Result<Vec<Value>, StoreError> {
        let request = self
            .http
            .delete(self.url(table))
            .header("Prefer", "return=representation")
            .query(&query.filter_params());
        let response = self.send("delete", request, self.timeouts.write).await?;
        Self::rows(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> StoreConfig {
        StoreConfig {
            url: "https://demo.supabase.co".to_string(),
            anon_key: "anon".to_string(),
            service_key: "service".to_string(),
            timeouts: StoreTimeouts::default(),
        }
    }

    #[test]
    fn test_content_range_total() {
        assert_eq!(parse_content_range_total("0-24/318").unwrap(), 318);
        assert_eq!(parse_content_range_total("*/0").unwrap(), 0);
        assert!(parse_content_range_total("0-24/*").is_err());
    }

    #[test]
    fn test_builds_table_urls() {
        let store = RestStore::new(&config()).unwrap();
        let table = aula_core::TenantDirectory::default()
            .schema_for("ucb.edu.bo")
            .table(aula_core::Entity::Courses);
        assert_eq!(
            store.url(&table),
            "https://demo.supabase.co/rest/v1/tenant_ucb_cursos"
        );
    }

    #[test]
    fn test_debug_hides_client_internals() {
        let store = RestStore::new(&config()).unwrap();
        let debug = format!("{store:?}");
        assert!(debug.contains("RestStore"));
        assert!(!debug.contains("service"));
    }

    #[test]
    fn test_rejects_unprintable_key() {
        let mut bad = config();
        bad.service_key = "line\nbreak".to_string();
        assert!(matches!(
            RestStore::new(&bad),
            Err(StoreError::Transport(_))
        ));
    }
}
