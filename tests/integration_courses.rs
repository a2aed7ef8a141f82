mod common;

use aula_core::Entity;
use axum::http::StatusCode;
use common::{TestApp, delete, get, json_request, seed_user, send, ucb};
use serde_json::json;

fn director(app: &TestApp) -> String {
    seed_user(app, "dir@ucb.edu.bo", "director", "Rojas");
    app.token("dir@ucb.edu.bo")
}

#[tokio::test]
async fn test_course_lifecycle_with_enrollment() {
    let app = TestApp::new();
    let token = director(&app);
    let teacher = seed_user(&app, "prof@ucb.edu.bo", "profesor", "Vargas");
    let student = seed_user(&app, "est@ucb.edu.bo", "estudiante", "Arce");

    let request = json_request(
        "POST",
        "/api/courses",
        &token,
        json!({"nombre": "Álgebra", "codigo": "MAT-101", "profesor_id": teacher}),
    );
    let (status, course) = send(&app, request).await;
    assert_eq!(status, StatusCode::CREATED);
    let course_id = course["id"].as_i64().unwrap();

    let request = json_request(
        "POST",
        "/api/courses/enroll",
        &token,
        json!({"usuario_id": student, "curso_id": course_id}),
    );
    let (status, enrollment) = send(&app, request).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, get(&format!("/api/courses/{course_id}/students"), &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["email"], "est@ucb.edu.bo");

    let student_token = app.token("est@ucb.edu.bo");
    let (status, body) = send(&app, get("/api/courses/my-courses", &student_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["nombre"], "Álgebra");
    assert_eq!(body[0]["relacion"], "inscrito");

    let teacher_token = app.token("prof@ucb.edu.bo");
    let (_, body) = send(&app, get("/api/courses/my-courses", &teacher_token)).await;
    assert_eq!(body[0]["relacion"], "profesor");

    let enrollment_id = enrollment["id"].as_i64().unwrap();
    let (status, body) = send(
        &app,
        delete(&format!("/api/courses/enroll/{enrollment_id}"), &token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Inscripción eliminada correctamente");
    assert!(app.store.rows(&ucb(Entity::Enrollments)).is_empty());
}

#[tokio::test]
async fn test_duplicate_enrollment_is_rejected() {
    let app = TestApp::new();
    let token = director(&app);
    let student = seed_user(&app, "est@ucb.edu.bo", "estudiante", "Arce");
    app.store.seed(&ucb(Entity::Courses), json!({"id": 50, "nombre": "Física"}));
    app.store.seed(
        &ucb(Entity::Enrollments),
        json!({"usuario_id": student, "curso_id": 50}),
    );

    let request = json_request(
        "POST",
        "/api/courses/enroll",
        &token,
        json!({"usuario_id": student, "curso_id": 50}),
    );
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "El usuario ya está inscrito en este curso");
    assert_eq!(app.store.write_count(), 0);
}

#[tokio::test]
async fn test_unknown_teacher_is_rejected() {
    let app = TestApp::new();
    let token = director(&app);

    let request = json_request(
        "POST",
        "/api/courses",
        &token,
        json!({"nombre": "Álgebra", "profesor_id": 777}),
    );
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "El profesor especificado no existe");
}

#[tokio::test]
async fn test_assign_teacher_by_query() {
    let app = TestApp::new();
    let token = director(&app);
    let teacher = seed_user(&app, "prof@ucb.edu.bo", "profesor", "Vargas");
    app.store.seed(&ucb(Entity::Courses), json!({"id": 50, "nombre": "Física"}));

    let request = json_request(
        "POST",
        &format!("/api/courses/50/assign-teacher?profesor_id={teacher}"),
        &token,
        json!({}),
    );
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profesor_id"], teacher);
}

#[tokio::test]
async fn test_delete_course_removes_enrollments() {
    let app = TestApp::new();
    let token = director(&app);
    app.store.seed(&ucb(Entity::Courses), json!({"id": 50, "nombre": "Física"}));
    app.store.seed(&ucb(Entity::Enrollments), json!({"usuario_id": 3, "curso_id": 50}));
    app.store.seed(&ucb(Entity::Enrollments), json!({"usuario_id": 3, "curso_id": 51}));

    let (status, _) = send(&app, delete("/api/courses/50", &token)).await;
    assert_eq!(status, StatusCode::OK);

    assert!(app.store.rows(&ucb(Entity::Courses)).is_empty());
    assert_eq!(app.store.rows(&ucb(Entity::Enrollments)).len(), 1);

    let (status, body) = send(&app, get("/api/courses/50", &token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Curso no encontrado");
}

#[tokio::test]
async fn test_student_cannot_manage_courses() {
    let app = TestApp::new();
    seed_user(&app, "est@ucb.edu.bo", "estudiante", "Arce");
    let token = app.token("est@ucb.edu.bo");

    let (status, _) = send(&app, get("/api/courses", &token)).await;
    assert_eq!(status, StatusCode::OK);

    let request = json_request("POST", "/api/courses", &token, json!({"nombre": "Hackeo"}));
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, get("/api/courses/1/enrollments", &token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
