use axum::{
    Router,
    routing::{MethodRouter, get, patch, post},
};

use crate::modules::attendance::controller::{
    create_attendance, create_attendance_bulk, create_excuse, delete_attendance, get_attendance,
    get_attendance_record, get_course_attendance, get_excuses, get_student_attendance,
    review_excuse, update_attendance,
};
use crate::state::AppState;

/// Handlers of the collection path, also mounted with a trailing slash.
pub fn attendance_collection() -> MethodRouter<AppState> {
    get(get_attendance).post(create_attendance)
}

pub fn init_attendance_router() -> Router<AppState> {
    Router::new()
        .route("/", attendance_collection())
        .route("/bulk", post(create_attendance_bulk))
        .route("/course/{curso_id}", get(get_course_attendance))
        .route("/student/{estudiante_id}", get(get_student_attendance))
        .route("/excuses", get(get_excuses).post(create_excuse))
        .route("/excuses/{id}", patch(review_excuse))
        .route(
            "/{id}",
            get(get_attendance_record)
                .put(update_attendance)
                .delete(delete_attendance),
        )
}
