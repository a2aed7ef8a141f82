use axum::{
    Router,
    routing::{MethodRouter, get},
};

use crate::state::AppState;

use super::controller::{
    create_student, delete_student, get_student, get_students, get_students_by_course,
    update_student,
};

/// Handlers of the collection path, also mounted with a trailing slash.
pub fn students_collection() -> MethodRouter<AppState> {
    get(get_students).post(create_student)
}

pub fn init_students_router() -> Router<AppState> {
    Router::new()
        .route("/", students_collection())
        .route(
            "/{id}",
            get(get_student).put(update_student).delete(delete_student),
        )
        .route("/course/{curso_id}", get(get_students_by_course))
}
