use axum::{
    Router,
    routing::{MethodRouter, get, patch},
};

use crate::state::AppState;

use super::controller::{
    create_director, get_all_users, get_directors, get_overview, update_user_role,
};

/// Handlers of the collection path, also mounted with a trailing slash.
pub fn directors_collection() -> MethodRouter<AppState> {
    get(get_directors).post(create_director)
}

pub fn init_directors_router() -> Router<AppState> {
    Router::new()
        .route("/", directors_collection())
        .route("/overview", get(get_overview))
        .route("/all-users", get(get_all_users))
        .route("/users/{id}/role", patch(update_user_role))
}
