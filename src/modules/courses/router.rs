use axum::{
    Router,
    routing::{MethodRouter, delete, get, post},
};

use crate::state::AppState;

use super::controller::{
    assign_teacher, create_course, delete_course, enroll_user, get_course,
    get_course_enrollments, get_course_students, get_courses, get_my_courses, unenroll_user,
    update_course,
};

/// Handlers of the collection path, also mounted with a trailing slash.
pub fn courses_collection() -> MethodRouter<AppState> {
    get(get_courses).post(create_course)
}

pub fn init_courses_router() -> Router<AppState> {
    Router::new()
        .route("/", courses_collection())
        .route("/my-courses", get(get_my_courses))
        .route("/enroll", post(enroll_user))
        .route("/enroll/{inscripcion_id}", delete(unenroll_user))
        .route(
            "/{id}",
            get(get_course).put(update_course).delete(delete_course),
        )
        .route("/{id}/enrollments", get(get_course_enrollments))
        .route("/{id}/students", get(get_course_students))
        .route("/{id}/assign-teacher", post(assign_teacher))
}
