use std::sync::Arc;

use axum::{
    Router,
    routing::{MethodRouter, get, post, put},
};
use tower_governor::GovernorLayer;

use crate::config::RateLimitConfig;
use crate::state::AppState;

use super::controller::{
    create_grades, delete_grade, get_grades, get_grades_by_course, update_grade, upload_grades,
};

/// Handlers of the collection path, also mounted with a trailing slash.
pub fn grades_collection() -> MethodRouter<AppState> {
    get(get_grades).post(create_grades)
}

/// Grade routes. File uploads get their own, stricter rate limit.
pub fn init_grades_router(rate_limit: &RateLimitConfig) -> Router<AppState> {
    let upload = match rate_limit.upload_governor_config() {
        Some(config) if rate_limit.enabled => {
            post(upload_grades).layer(GovernorLayer::new(Arc::new(config)))
        }
        _ => post(upload_grades),
    };

    Router::new()
        .route("/", grades_collection())
        .route("/course/{course_id}", get(get_grades_by_course))
        .route("/upload", upload)
        .route("/{id}", put(update_grade).delete(delete_grade))
}
