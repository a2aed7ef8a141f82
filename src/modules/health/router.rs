use axum::{Router, routing::get};

use crate::modules::health::controller::{health_check, service_info};
use crate::state::AppState;

pub fn init_health_router() -> Router<AppState> {
    Router::new()
        .route("/", get(service_info))
        .route("/health", get(health_check))
}
