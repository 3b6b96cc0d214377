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
use crate::models::{Places, User, UserPatch, VisitFilter};
use crate::store;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/new", post(create_user))
        .route("/users/{id}", get(get_user).post(update_user))
        .route("/users/{id}/visits", get(list_visits))
}

async fn get_user(
    State(state): State<AppState>,
    id: Result<Path<u32>, PathRejection>,
) -> Result<Json<User>, AppError> {
    let Path(id) = id?;
    let user = store::fetch::<User>(&state.db, id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok(Json(user))
}

async fn list_visits(
    State(state): State<AppState>,
    id: Result<Path<u32>, PathRejection>,
    filter: Result<Query<VisitFilter>, QueryRejection>,
) -> Result<Json<Places>, AppError> {
    let Path(id) = id?;
    let Query(filter) = filter?;

    if store::fetch::<User>(&state.db, id).await?.is_none() {
        return Err(AppError::NotFound);
    }

    let visits = store::user_visits(&state.db, id, &filter).await?;
    Ok(Json(Places { visits }))
}

async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<User>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(user) = payload?;
    store::insert(&state.db, &user).await?;
    Ok(Json(json!({})))
}

async fn update_user(
    State(state): State<AppState>,
    id: Result<Path<u32>, PathRejection>,
    payload: Result<Json<UserPatch>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Path(id) = id?;
    let Json(patch) = payload?;

    if store::update(&state.db, id, &patch).await? == 0 {
        return Err(AppError::NotFound);
    }
    Ok(Json(json!({})))
}
