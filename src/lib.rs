pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod loader;
pub mod models;
pub mod query;
pub mod routes;
pub mod store;

use axum::{routing::get, Router};
use sqlx::SqlitePool;
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
}

async fn health() -> &'static str {
    "ok"
}

/// Build the full Axum application router.
///
/// Caller is responsible for applying the schema (and any bulk load) on
/// `pool` beforehand.
pub fn build_app(pool: SqlitePool) -> Router {
    let state = AppState { db: pool };

    Router::new()
        .route("/health", get(health))
        .merge(routes::users::router())
        .merge(routes::locations::router())
        .merge(routes::visits::router())
        .layer(
            TraceLayer::new_for_http()
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
