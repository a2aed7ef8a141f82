use axum::{
    Router,
    routing::{MethodRouter, get},
};

use crate::state::AppState;

use super::controller::{create_teacher, delete_teacher, get_teacher, get_teachers, update_teacher};

/// Handlers of the collection path, also mounted with a trailing slash.
pub fn teachers_collection() -> MethodRouter<AppState> {
    get(get_teachers).post(create_teacher)
}

pub fn init_teachers_router() -> Router<AppState> {
    Router::new()
        .route("/", teachers_collection())
        .route(
            "/{id}",
            get(get_teacher).put(update_teacher).delete(delete_teacher),
        )
}
