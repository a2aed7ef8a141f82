mod common;

use aula_core::Entity;
use axum::http::StatusCode;
use common::{TestApp, get, json_request, seed_user, send, ucb};
use serde_json::json;

const COLLECTIONS: &[&str] = &[
    "/api/students",
    "/api/teachers",
    "/api/directors",
    "/api/courses",
    "/api/grades",
    "/api/attendance",
];

#[tokio::test]
async fn test_collections_answer_with_and_without_trailing_slash() {
    let app = TestApp::new();
    seed_user(&app, "dir@ucb.edu.bo", "director", "Rojas");
    let token = app.token("dir@ucb.edu.bo");

    for path in COLLECTIONS {
        for uri in [path.to_string(), format!("{path}/")] {
            let (status, body) = send(&app, get(&uri, &token)).await;
            assert_eq!(status, StatusCode::OK, "GET {uri}");
            assert!(body.is_array(), "GET {uri} returned {body}");
        }
    }
}

#[tokio::test]
async fn test_profesor_cannot_create_director_at_slash_path() {
    let app = TestApp::new();
    seed_user(&app, "prof@ucb.edu.bo", "profesor", "Quispe");
    let token = app.token("prof@ucb.edu.bo");

    let request = json_request(
        "POST",
        "/api/directors/",
        &token,
        json!({"nombre": "Nuevo", "apellido": "Director", "email": "nuevo@ucb.edu.bo"}),
    );
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["detail"], "Solo los directores pueden crear otros directores");
    assert_eq!(app.store.write_count(), 0);
}

#[tokio::test]
async fn test_director_lists_and_creates_students_at_slash_path() {
    let app = TestApp::new();
    seed_user(&app, "dir@ucb.edu.bo", "director", "Rojas");
    seed_user(&app, "ana@ucb.edu.bo", "estudiante", "Choque");
    let token = app.token("dir@ucb.edu.bo");

    let (status, body) = send(&app, get("/api/students/", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["email"], "ana@ucb.edu.bo");

    let request = json_request(
        "POST",
        "/api/students/",
        &token,
        json!({"nombre": "Lucía", "apellido": "Mamani", "email": "lucia@ucb.edu.bo"}),
    );
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["rol"], "estudiante");
    assert_eq!(app.store.rows(&ucb(Entity::Users)).len(), 3);
}

#[tokio::test]
async fn test_slash_path_still_requires_credentials() {
    let app = TestApp::new();
    let request = axum::http::Request::builder()
        .uri("/api/teachers/")
        .body(axum::body::Body::empty())
        .unwrap();

    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], "Token no proporcionado");
}
