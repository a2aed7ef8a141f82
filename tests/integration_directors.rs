mod common;

use aula_core::Entity;
use axum::http::StatusCode;
use common::{TestApp, get, json_request, seed_user, send, ucb};
use serde_json::json;

fn director(app: &TestApp) -> String {
    seed_user(app, "dir@ucb.edu.bo", "director", "Rojas");
    app.token("dir@ucb.edu.bo")
}

#[tokio::test]
async fn test_overview_counts_only_own_tenant() {
    let app = TestApp::new();
    let token = director(&app);
    seed_user(&app, "a@ucb.edu.bo", "estudiante", "Arce");
    seed_user(&app, "b@ucb.edu.bo", "estudiante", "Bolivar");
    seed_user(&app, "p@ucb.edu.bo", "profesor", "Vargas");
    seed_user(&app, "x@upb.edu.bo", "estudiante", "Otro");
    app.store.seed(&ucb(Entity::Courses), json!({"nombre": "Física"}));

    let (status, body) = send(&app, get("/api/directors/overview", &token)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["institution_name"], "Universidad Católica Boliviana");
    assert_eq!(body["domain"], "ucb.edu.bo");
    assert_eq!(body["stats"]["total_students"], 2);
    assert_eq!(body["stats"]["total_teachers"], 1);
    assert_eq!(body["stats"]["total_courses"], 1);
    assert_eq!(body["stats"]["total_enrollments"], 0);
    assert_eq!(body["recent_users"][0]["email"], "p@ucb.edu.bo");
}

#[tokio::test]
async fn test_all_users_grouped_by_role() {
    let app = TestApp::new();
    let token = director(&app);
    seed_user(&app, "a@ucb.edu.bo", "estudiante", "Arce");
    seed_user(&app, "p@ucb.edu.bo", "profesor", "Vargas");
    seed_user(&app, "s@ucb.edu.bo", "secretaria", "Luna");

    let (status, body) = send(&app, get("/api/directors/all-users", &token)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_users"], 4);
    assert_eq!(
        body["role_counts"],
        json!({"directores": 1, "profesores": 1, "estudiantes": 1, "otros": 1})
    );
    assert_eq!(body["users_by_role"]["otros"][0]["rol"], "secretaria");
}

#[tokio::test]
async fn test_create_director() {
    let app = TestApp::new();
    let token = director(&app);

    let request = json_request(
        "POST",
        "/api/directors",
        &token,
        json!({"nombre": "Elena", "apellido": "Soria", "email": "elena@ucb.edu.bo"}),
    );
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["rol"], "director");

    let (status, body) = send(&app, get("/api/directors", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["email"], "elena@ucb.edu.bo");
}

#[tokio::test]
async fn test_change_role() {
    let app = TestApp::new();
    let token = director(&app);
    let id = seed_user(&app, "a@ucb.edu.bo", "estudiante", "Arce");

    let request = json_request(
        "PATCH",
        &format!("/api/directors/users/{id}/role"),
        &token,
        json!({"new_role": "profesor"}),
    );
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rol"], "profesor");
    let (_, teachers) = send(&app, get("/api/teachers", &token)).await;
    assert_eq!(teachers[0]["email"], "a@ucb.edu.bo");
}

#[tokio::test]
async fn test_change_to_unknown_role_is_rejected() {
    let app = TestApp::new();
    let token = director(&app);
    let id = seed_user(&app, "a@ucb.edu.bo", "estudiante", "Arce");

    let request = json_request(
        "PATCH",
        &format!("/api/directors/users/{id}/role"),
        &token,
        json!({"new_role": "rector"}),
    );
    let (status, _) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.store.write_count(), 0);
}

#[tokio::test]
async fn test_change_role_of_missing_user() {
    let app = TestApp::new();
    let token = director(&app);

    let request = json_request(
        "PATCH",
        "/api/directors/users/999/role",
        &token,
        json!({"new_role": "director"}),
    );
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Usuario no encontrado");
}
