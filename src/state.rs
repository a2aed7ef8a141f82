use std::sync::Arc;

use aula_auth::{AccessGate, TokenValidator};
use aula_core::TenantDirectory;
use aula_store::{RestStore, Store};

use crate::config::{AppConfig, CorsConfig, JwtConfig, RateLimitConfig, ServerConfig};

/// Immutable state shared by every request.
#[derive(Clone, Debug)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub gate: AccessGate,
    pub tenants: TenantDirectory,
    pub tokens: TokenValidator,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
    pub rate_limit_config: RateLimitConfig,
    pub server_config: ServerConfig,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn Store>) -> Self {
        let tenants = TenantDirectory::default();
        Self {
            gate: AccessGate::new(tenants.clone(), store.clone()),
            tokens: TokenValidator::new(&config.jwt),
            store,
            tenants,
            jwt_config: config.jwt,
            cors_config: config.cors,
            rate_limit_config: config.rate_limit,
            server_config: config.server,
        }
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }
}

/// Builds the production state backed by the REST store.
pub fn init_app_state(config: AppConfig) -> anyhow::Result<AppState> {
    let store = RestStore::new(&config.store)?;
    Ok(AppState::new(config, Arc::new(store)))
}
