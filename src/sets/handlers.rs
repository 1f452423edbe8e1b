use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::dto::{
    Choice, ChoicesResponse, DeletedResponse, NewSetForm, NicknameForm, NicknameFormResponse,
    SetResponse, SetView, SetsResponse,
};
use super::services;
use crate::{
    auth::session::AuthUser, error::AppError, forms::JsonForm, locations::repo::LocationRepo,
    state::AppState,
};

pub fn set_routes() -> Router<AppState> {
    Router::new()
        .route("/newset", get(new_set_choices).post(new_set))
        .route("/sets", get(list_sets).post(list_sets))
        .route("/set/:id", get(view_set))
        .route("/delete/:name", get(delete_set).post(delete_set))
        .route("/nickname/:name", get(nickname_form).post(rename_set))
}

#[instrument(skip(state))]
pub async fn new_set_choices(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ChoicesResponse>, AppError> {
    let choices = state
        .store
        .list_locations_by_user(user_id)
        .await?
        .into_iter()
        .map(|l| Choice {
            id: l.id,
            label: l.city,
        })
        .collect();
    Ok(Json(ChoicesResponse { choices }))
}

#[instrument(skip(state))]
pub async fn new_set(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    JsonForm(form): JsonForm<NewSetForm>,
) -> Result<Json<SetResponse>, AppError> {
    let set = services::create_from_form(state.store.as_ref(), user_id, form).await?;
    Ok(Json(SetResponse {
        set,
        redirect: "/sets".into(),
    }))
}

#[instrument(skip(state))]
pub async fn list_sets(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<SetsResponse>, AppError> {
    let sets = state.store.list_sets(user_id).await?;
    Ok(Json(SetsResponse { sets }))
}

#[instrument(skip(state))]
pub async fn view_set(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<Json<SetView>, AppError> {
    let set_id = Uuid::parse_str(&id).map_err(|_| AppError::NotFound("set"))?;
    let view =
        services::view_set(state.store.as_ref(), state.weather.as_ref(), user_id, set_id).await?;
    Ok(Json(view))
}

#[instrument(skip(state))]
pub async fn delete_set(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(name): Path<String>,
) -> Result<Json<DeletedResponse>, AppError> {
    let set = services::delete_set(state.store.as_ref(), user_id, &name).await?;
    Ok(Json(DeletedResponse {
        message: format!("Deleted set <{}>", set.name),
        redirect: "/sets".into(),
    }))
}

pub async fn nickname_form(
    AuthUser(_): AuthUser,
    Path(name): Path<String>,
) -> Json<NicknameFormResponse> {
    Json(NicknameFormResponse {
        set: name,
        fields: &["nickname"],
    })
}

#[instrument(skip(state))]
pub async fn rename_set(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(name): Path<String>,
    JsonForm(form): JsonForm<NicknameForm>,
) -> Result<Json<SetResponse>, AppError> {
    let set = services::rename_set(state.store.as_ref(), user_id, &name, form).await?;
    Ok(Json(SetResponse {
        set,
        redirect: "/sets".into(),
    }))
}
