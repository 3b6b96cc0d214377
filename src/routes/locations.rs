use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::error::AppError;
use crate::models::{AverageFilter, AverageMark, Location, LocationPatch};
use crate::store;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/locations/new", post(create_location))
        .route("/locations/{id}", get(get_location).post(update_location))
        .route("/locations/{id}/avg", get(average_mark))
}

async fn get_location(
    State(state): State<AppState>,
    id: Result<Path<u32>, PathRejection>,
) -> Result<Json<Location>, AppError> {
    let Path(id) = id?;
    let location = store::fetch::<Location>(&state.db, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(location))
}

// An unknown location has no visits, so it averages to 0 rather than 404.
async fn average_mark(
    State(state): State<AppState>,
    id: Result<Path<u32>, PathRejection>,
    filter: Result<Query<AverageFilter>, QueryRejection>,
) -> Result<Json<AverageMark>, AppError> {
    let Path(id) = id?;
    let Query(filter) = filter?;

    let average = store::location_average(&state.db, id, &filter).await?;
    Ok(Json(average))
}

async fn create_location(
    State(state): State<AppState>,
    payload: Result<Json<Location>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(location) = payload?;
    store::insert(&state.db, &location).await?;
    Ok(Json(json!({})))
}

async fn update_location(
    State(state): State<AppState>,
    id: Result<Path<u32>, PathRejection>,
    payload: Result<Json<LocationPatch>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Path(id) = id?;
    let Json(patch) = payload?;

    if store::update(&state.db, id, &patch).await? == 0 {
        return Err(AppError::NotFound);
    }
    Ok(Json(json!({})))
}
