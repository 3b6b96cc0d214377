#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;

use travels::models::{Gender, Location, User, Visit};

pub struct TestApp {
    pub router: Router,
    pub db: SqlitePool,
}

impl TestApp {
    pub async fn new() -> Self {
        let db = memory_pool().await;
        let router = travels::build_app(db.clone());
        Self { router, db }
    }

    /// Send a request through the app and return the response.
    pub async fn request(&self, req: Request<Body>) -> Response {
        tower::ServiceExt::oneshot(self.router.clone(), req)
            .await
            .unwrap()
    }

    pub async fn get(&self, uri: &str) -> Response {
        let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.request(req).await
    }

    /// Send a POST request with a JSON body.
    pub async fn post_json(&self, uri: &str, body: &str) -> Response {
        let req = Request::builder()
            .uri(uri)
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.request(req).await
    }

    pub async fn insert_user(&self, user: &User) {
        travels::store::insert(&self.db, user)
            .await
            .expect("Failed to create test user");
    }

    pub async fn insert_location(&self, location: &Location) {
        travels::store::insert(&self.db, location)
            .await
            .expect("Failed to create test location");
    }

    pub async fn insert_visit(&self, visit: &Visit) {
        travels::store::insert(&self.db, visit)
            .await
            .expect("Failed to create test visit");
    }
}

/// Single-connection in-memory database with the schema applied.
pub async fn memory_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("Failed to create in-memory SQLite pool");

    travels::db::apply_schema(&pool, Path::new("schema.sql"))
        .await
        .expect("Failed to apply schema");

    pool
}

pub fn user(id: u32, gender: Gender, birth_date: i32) -> User {
    User {
        id,
        email: format!("user{id}@example.com"),
        first_name: "First".to_string(),
        last_name: "Last".to_string(),
        gender,
        birth_date,
    }
}

pub fn location(id: u32, place: &str, country: &str, distance: u32) -> Location {
    Location {
        id,
        place: place.to_string(),
        country: country.to_string(),
        city: "City".to_string(),
        distance,
    }
}

pub fn visit(id: u32, location: u32, user: u32, visited_at: i32, mark: u8) -> Visit {
    Visit {
        id,
        location,
        user,
        visited_at,
        mark,
    }
}

/// Read the full response body as a String.
pub async fn body_string(resp: Response) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(resp: Response) -> serde_json::Value {
    serde_json::from_str(&body_string(resp).await).unwrap()
}

/// Assert the status and return the JSON body.
pub async fn assert_json(resp: Response, expected_status: StatusCode) -> serde_json::Value {
    assert_eq!(resp.status(), expected_status);
    let content_type = resp
        .headers()
        .get("content-type")
        .expect("JSON responses carry a content type")
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("application/json"), "got {content_type}");
    body_json(resp).await
}
