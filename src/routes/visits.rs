use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::error::AppError;
use crate::models::{Visit, VisitPatch};
use crate::store;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/visits/new", post(create_visit))
        .route("/visits/{id}", get(get_visit).post(update_visit))
}

async fn get_visit(
    State(state): State<AppState>,
    id: Result<Path<u32>, PathRejection>,
) -> Result<Json<Visit>, AppError> {
    let Path(id) = id?;
    let visit = store::fetch::<Visit>(&state.db, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(visit))
}

async fn create_visit(
    State(state): State<AppState>,
    payload: Result<Json<Visit>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(visit) = payload?;
    store::insert(&state.db, &visit).await?;
    Ok(Json(json!({})))
}

async fn update_visit(
    State(state): State<AppState>,
    id: Result<Path<u32>, PathRejection>,
    payload: Result<Json<VisitPatch>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Path(id) = id?;
    let Json(patch) = payload?;

    if store::update(&state.db, id, &patch).await? == 0 {
        return Err(AppError::NotFound);
    }
    Ok(Json(json!({})))
}
