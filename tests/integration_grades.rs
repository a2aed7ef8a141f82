mod common;

use aula_core::Entity;
use axum::http::StatusCode;
use common::{TestApp, get, json_request, seed_user, send, ucb, upload};
use serde_json::json;

fn teacher(app: &TestApp) -> String {
    seed_user(app, "prof@ucb.edu.bo", "profesor", "Vargas");
    app.token("prof@ucb.edu.bo")
}

#[tokio::test]
async fn test_upload_inserts_valid_rows_and_counts_the_rest() {
    let app = TestApp::new();
    let token = teacher(&app);
    let csv = b"student_id,course_id,grade\n1,2,85\n3,2,abc\n";

    let (status, body) = send(&app, upload("/api/grades/upload", &token, "notas.csv", csv)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["inserted_count"], 1);
    assert_eq!(body["skipped_rows"], 1);
    assert_eq!(body["inserted"][0]["student_id"], 1);
    assert_eq!(body["message"], "Archivo procesado e importado correctamente");
    assert_eq!(app.store.rows(&ucb(Entity::Grades)).len(), 1);
}

#[tokio::test]
async fn test_upload_rejects_unsupported_format() {
    let app = TestApp::new();
    let token = teacher(&app);

    let (status, body) =
        send(&app, upload("/api/grades/upload", &token, "notas.pdf", b"%PDF-1.4")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Formato de archivo no soportado. Use CSV o XLSX.");
    assert_eq!(app.store.write_count(), 0);
}

#[tokio::test]
async fn test_upload_requires_staff() {
    let app = TestApp::new();
    seed_user(&app, "est@ucb.edu.bo", "estudiante", "Arce");
    let token = app.token("est@ucb.edu.bo");

    let (status, _) = send(
        &app,
        upload("/api/grades/upload", &token, "notas.csv", b"student_id,course_id,grade\n1,2,85\n"),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(app.store.write_count(), 0);
}

#[tokio::test]
async fn test_bulk_grades_and_student_visibility() {
    let app = TestApp::new();
    let token = teacher(&app);
    let own = seed_user(&app, "est@ucb.edu.bo", "estudiante", "Arce");

    let request = json_request(
        "POST",
        "/api/grades",
        &token,
        json!([
            {"student_id": own, "course_id": 2, "grade": 90},
            {"student_id": own + 100, "course_id": 2, "grade": 40, "subject": "Parcial"}
        ]),
    );
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Notas registradas correctamente");
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(app.store.write_count(), 1);

    let student_token = app.token("est@ucb.edu.bo");
    let (status, body) = send(&app, get("/api/grades", &student_token)).await;
    assert_eq!(status, StatusCode::OK);
    let grades = body.as_array().unwrap();
    assert_eq!(grades.len(), 1);
    assert_eq!(grades[0]["student_id"], own);

    let (_, body) = send(&app, get("/api/grades/course/2", &token)).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_empty_bulk_is_rejected() {
    let app = TestApp::new();
    let token = teacher(&app);

    let (status, _) = send(&app, json_request("POST", "/api/grades", &token, json!([]))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.store.write_count(), 0);
}

#[tokio::test]
async fn test_update_missing_grade() {
    let app = TestApp::new();
    let token = teacher(&app);

    let request = json_request("PUT", "/api/grades/404", &token, json!({"grade": 70}));
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Nota no encontrada");
}
