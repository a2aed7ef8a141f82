#![allow(dead_code)]

use std::sync::Arc;

use aula::config::{
    AppConfig, CorsConfig, JwtConfig, RateLimitConfig, ServerConfig, StoreConfig, StoreTimeouts,
};
use aula::router::init_router;
use aula::state::AppState;
use aula_auth::TokenValidator;
use aula_core::{Entity, TenantDirectory, TenantTable};
use aula_store::MemoryStore;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

pub const TEST_SECRET: &str = "test-secret-for-integration-tests";

pub struct TestApp {
    pub store: MemoryStore,
    pub tokens: TokenValidator,
    config: AppConfig,
}

pub fn test_config() -> AppConfig {
    AppConfig {
        jwt: JwtConfig::with_secret(TEST_SECRET),
        store: StoreConfig {
            url: "http://store.invalid".to_string(),
            anon_key: "anon".to_string(),
            service_key: "service".to_string(),
            timeouts: StoreTimeouts::default(),
        },
        cors: CorsConfig::default(),
        rate_limit: RateLimitConfig::disabled(),
        server: ServerConfig::default(),
    }
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: AppConfig) -> Self {
        Self {
            store: MemoryStore::new(),
            tokens: TokenValidator::new(&config.jwt),
            config,
        }
    }

    /// Fresh router over the shared store; `oneshot` consumes it.
    pub fn router(&self) -> Router {
        let state = AppState::new(self.config.clone(), Arc::new(self.store.clone()));
        init_router(state)
    }

    pub fn token(&self, email: &str) -> String {
        self.tokens.issue_token(email, None).unwrap()
    }
}

pub fn table(email_domain: &str, entity: Entity) -> TenantTable {
    TenantDirectory::default()
        .schema_for(email_domain)
        .table(entity)
}

pub fn ucb(entity: Entity) -> TenantTable {
    table("ucb.edu.bo", entity)
}

/// Seeds a profile into the tenant of `email` and returns its id.
pub fn seed_user(app: &TestApp, email: &str, rol: &str, apellido: &str) -> i64 {
    let domain = email.rsplit('@').next().unwrap_or_default();
    let row = app.store.seed(
        &table(domain, Entity::Users),
        json!({
            "nombre": "Test",
            "apellido": apellido,
            "email": email,
            "rol": rol,
        }),
    );
    row["id"].as_i64().unwrap()
}

pub async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.router().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

pub fn get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

pub fn delete(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, token: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub const BOUNDARY: &str = "aula-test-boundary";

/// `multipart/form-data` request with a single `file` part.
pub fn upload(uri: &str, token: &str, filename: &str, contents: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(contents);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}
