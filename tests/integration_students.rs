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
async fn test_create_student_as_director() {
    let app = TestApp::new();
    let token = director(&app);

    let request = json_request(
        "POST",
        "/api/students",
        &token,
        json!({
            "nombre": "Lucía",
            "apellido": "Mamani",
            "email": "lucia@ucb.edu.bo",
            "telefono": "",
            "fecha_nacimiento": "2005-03-14"
        }),
    );
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], "lucia@ucb.edu.bo");
    assert_eq!(body["rol"], "estudiante");
    assert_eq!(body["fecha_nacimiento"], "2005-03-14");
    assert!(body["telefono"].is_null());
    assert_eq!(app.store.rows(&ucb(Entity::Users)).len(), 2);
}

#[tokio::test]
async fn test_cross_tenant_student_is_rejected_without_writes() {
    let app = TestApp::new();
    let token = director(&app);

    let request = json_request(
        "POST",
        "/api/students",
        &token,
        json!({"nombre": "Luis", "apellido": "Paz", "email": "luis@upb.edu.bo"}),
    );
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["detail"],
        "El email del estudiante debe pertenecer al mismo dominio institucional"
    );
    assert_eq!(app.store.write_count(), 0);
}

#[tokio::test]
async fn test_duplicate_email_is_rejected() {
    let app = TestApp::new();
    let token = director(&app);
    seed_user(&app, "lucia@ucb.edu.bo", "estudiante", "Mamani");

    let request = json_request(
        "POST",
        "/api/students",
        &token,
        json!({"nombre": "Lucía", "apellido": "Mamani", "email": "lucia@ucb.edu.bo"}),
    );
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Ya existe un usuario con el email lucia@ucb.edu.bo");
    assert_eq!(app.store.write_count(), 0);
}

#[tokio::test]
async fn test_invalid_body_is_unprocessable() {
    let app = TestApp::new();
    let token = director(&app);

    let request = json_request(
        "POST",
        "/api/students",
        &token,
        json!({"nombre": "", "apellido": "Mamani", "email": "not-an-email"}),
    );
    let (status, _) = send(&app, request).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(app.store.write_count(), 0);
}

#[tokio::test]
async fn test_list_students_ordered_by_last_name() {
    let app = TestApp::new();
    let token = director(&app);
    seed_user(&app, "c@ucb.edu.bo", "estudiante", "Zeballos");
    seed_user(&app, "a@ucb.edu.bo", "estudiante", "Arce");
    seed_user(&app, "p@ucb.edu.bo", "profesor", "Banzer");

    let (status, body) = send(&app, get("/api/students", &token)).await;

    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["apellido"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Arce", "Zeballos"]);
}

#[tokio::test]
async fn test_profesor_can_list_but_not_create() {
    let app = TestApp::new();
    seed_user(&app, "prof@ucb.edu.bo", "profesor", "Vargas");
    let token = app.token("prof@ucb.edu.bo");

    let (status, _) = send(&app, get("/api/students", &token)).await;
    assert_eq!(status, StatusCode::OK);

    let request = json_request(
        "POST",
        "/api/students",
        &token,
        json!({"nombre": "Lucía", "apellido": "Mamani", "email": "lucia@ucb.edu.bo"}),
    );
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["detail"], "Solo los directores pueden crear estudiantes");
}

#[tokio::test]
async fn test_update_then_fetch_student() {
    let app = TestApp::new();
    let token = director(&app);
    let id = seed_user(&app, "lucia@ucb.edu.bo", "estudiante", "Mamani");

    let request = json_request(
        "PUT",
        &format!("/api/students/{id}"),
        &token,
        json!({"telefono": "70000000", "direccion": "Av. Arce 123"}),
    );
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["telefono"], "70000000");
    assert!(body["updated_at"].is_string());

    let (status, body) = send(&app, get(&format!("/api/students/{id}"), &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["direccion"], "Av. Arce 123");
    assert_eq!(body["apellido"], "Mamani");
}

#[tokio::test]
async fn test_empty_update_is_rejected() {
    let app = TestApp::new();
    let token = director(&app);
    let id = seed_user(&app, "lucia@ucb.edu.bo", "estudiante", "Mamani");

    let request = json_request("PUT", &format!("/api/students/{id}"), &token, json!({}));
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "No hay campos para actualizar");
}

#[tokio::test]
async fn test_teacher_id_is_not_a_student() {
    let app = TestApp::new();
    let token = director(&app);
    let teacher = seed_user(&app, "prof@ucb.edu.bo", "profesor", "Vargas");

    let (status, body) = send(&app, get(&format!("/api/students/{teacher}"), &token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Estudiante no encontrado");

    let (status, _) = send(&app, delete(&format!("/api/students/{teacher}"), &token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(app.store.rows(&ucb(Entity::Users)).len(), 2);
}

#[tokio::test]
async fn test_delete_student() {
    let app = TestApp::new();
    let token = director(&app);
    let id = seed_user(&app, "lucia@ucb.edu.bo", "estudiante", "Mamani");

    let (status, body) = send(&app, delete(&format!("/api/students/{id}"), &token)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Estudiante eliminado correctamente");
    assert_eq!(app.store.rows(&ucb(Entity::Users)).len(), 1);
}

#[tokio::test]
async fn test_students_by_course() {
    let app = TestApp::new();
    let token = director(&app);
    let enrolled = seed_user(&app, "a@ucb.edu.bo", "estudiante", "Arce");
    seed_user(&app, "b@ucb.edu.bo", "estudiante", "Bolivar");
    let teacher = seed_user(&app, "p@ucb.edu.bo", "profesor", "Vargas");
    app.store.seed(
        &ucb(Entity::Enrollments),
        json!({"usuario_id": enrolled, "curso_id": 40}),
    );
    app.store.seed(
        &ucb(Entity::Enrollments),
        json!({"usuario_id": teacher, "curso_id": 40}),
    );

    let (status, body) = send(&app, get("/api/students/course/40", &token)).await;

    assert_eq!(status, StatusCode::OK);
    let students = body.as_array().unwrap();
    assert_eq!(students.len(), 1);
    assert_eq!(students[0]["email"], "a@ucb.edu.bo");
}

#[tokio::test]
async fn test_teachers_are_director_only() {
    let app = TestApp::new();
    let token = director(&app);

    let request = json_request(
        "POST",
        "/api/teachers",
        &token,
        json!({"nombre": "Mario", "apellido": "Vargas", "email": "mario@ucb.edu.bo"}),
    );
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["rol"], "profesor");

    seed_user(&app, "prof@ucb.edu.bo", "profesor", "Quiroga");
    let teacher_token = app.token("prof@ucb.edu.bo");
    let (status, _) = send(&app, get("/api/teachers", &teacher_token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, get("/api/teachers", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);
}
