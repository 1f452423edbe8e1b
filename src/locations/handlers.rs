use axum::{extract::State, routing::get, Json, Router};
use tracing::{instrument, warn};

use super::dto::{HistoryResponse, SearchForm, SearchResponse};
use super::repo::LocationRepo;
use super::services;
use crate::{auth::session::AuthUser, error::AppError, forms::JsonForm, state::AppState};

pub fn search_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(empty_search).post(public_search))
        .route("/memberhome", get(member_home).post(member_search))
        .route("/search_history", get(search_history).post(search_history))
}

pub async fn empty_search() -> Json<SearchResponse> {
    Json(SearchResponse::default())
}

#[instrument(skip(state))]
pub async fn public_search(
    State(state): State<AppState>,
    JsonForm(form): JsonForm<SearchForm>,
) -> Result<Json<SearchResponse>, AppError> {
    let postal_code = form.postal_code()?;
    let report = services::search(state.weather.as_ref(), postal_code).await?;
    Ok(Json(SearchResponse::found(report, None)))
}

pub async fn member_home(AuthUser(_): AuthUser) -> Json<SearchResponse> {
    Json(SearchResponse::default())
}

#[instrument(skip(state))]
pub async fn member_search(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    JsonForm(form): JsonForm<SearchForm>,
) -> Result<Json<SearchResponse>, AppError> {
    let postal_code = form.postal_code()?;
    let (report, location) = services::search_and_record(
        state.store.as_ref(),
        state.weather.as_ref(),
        user_id,
        postal_code,
    )
    .await?;
    Ok(Json(SearchResponse::found(report, Some(location))))
}

/// Every location recorded by every user. Not scoped to the caller and
/// needs no session.
#[instrument(skip(state))]
pub async fn search_history(
    State(state): State<AppState>,
) -> Result<Json<HistoryResponse>, AppError> {
    let locations = state.store.list_all_locations().await?;
    // TODO: scope to the session user once the history page is members-only
    warn!(count = locations.len(), "serving unscoped search history");
    Ok(Json(HistoryResponse { locations }))
}
