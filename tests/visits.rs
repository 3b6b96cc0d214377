mod common;

use axum::http::StatusCode;
use common::{assert_json, location, user, visit, TestApp};
use serde_json::json;
use travels::models::Gender;

async fn app_with_refs() -> TestApp {
    let app = TestApp::new().await;
    app.insert_user(&user(1, Gender::Male, 0)).await;
    app.insert_user(&user(2, Gender::Female, 0)).await;
    app.insert_location(&location(1, "Tower", "France", 12)).await;
    app
}

#[tokio::test]
async fn create_then_get_visit() {
    let app = app_with_refs().await;
    let body = r#"{"id": 10, "location": 1, "user": 2, "visited_at": 1500, "mark": 0}"#;

    let resp = app.post_json("/visits/new", body).await;
    assert_eq!(assert_json(resp, StatusCode::OK).await, json!({}));

    let json = assert_json(app.get("/visits/10").await, StatusCode::OK).await;
    assert_eq!(
        json,
        json!({"id": 10, "location": 1, "user": 2, "visited_at": 1500, "mark": 0})
    );
}

#[tokio::test]
async fn create_with_unknown_reference_is_server_error() {
    let app = app_with_refs().await;
    let body = r#"{"id": 10, "location": 7, "user": 2, "visited_at": 1500, "mark": 3}"#;

    let resp = app.post_json("/visits/new", body).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(app.get("/visits/10").await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_with_out_of_range_mark_is_rejected() {
    let app = app_with_refs().await;

    let body = r#"{"id": 10, "location": 1, "user": 2, "visited_at": 1500, "mark": 300}"#;
    let resp = app.post_json("/visits/new", body).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body = r#"{"id": 10, "location": 1, "user": 2, "visited_at": 1500, "mark": 9}"#;
    let resp = app.post_json("/visits/new", body).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn update_moves_visit_to_another_user() {
    let app = app_with_refs().await;
    app.insert_visit(&visit(1, 1, 1, 100, 4)).await;

    let resp = app.post_json("/visits/1", r#"{"user": 2, "mark": 1}"#).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let json = assert_json(app.get("/visits/1").await, StatusCode::OK).await;
    assert_eq!(
        json,
        json!({"id": 1, "location": 1, "user": 2, "visited_at": 100, "mark": 1})
    );

    let json = assert_json(app.get("/users/1/visits").await, StatusCode::OK).await;
    assert_eq!(json, json!({"visits": []}));
}

#[tokio::test]
async fn update_missing_visit_is_not_found() {
    let app = app_with_refs().await;
    let resp = app.post_json("/visits/5", r#"{"mark": 1}"#).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_missing_visit_is_not_found() {
    let app = app_with_refs().await;
    assert_eq!(app.get("/visits/5").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.get("/visits/-5").await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_reports_ok() {
    let app = TestApp::new().await;
    let resp = app.get("/health").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(common::body_string(resp).await, "ok");
}
