use axum::{
    extract::{FromRef, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{info, instrument};

use crate::{
    auth::{
        dto::{
            FormDescription, LoginForm, LoginResponse, MessageResponse, NextQuery, PublicUser,
            RegisterForm,
        },
        services,
        session::{AuthUser, SessionKeys},
    },
    error::AppError,
    forms::JsonForm,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_form).post(login))
        .route("/logout", get(logout))
        .route("/register", get(register_form).post(register))
}

/// Only same-site paths are followed after login.
fn safe_next(next: Option<&str>) -> String {
    match next {
        Some(n) if n.starts_with('/') && !n.starts_with("//") && !n.contains('\\') => n.to_string(),
        _ => "/memberhome".to_string(),
    }
}

pub async fn login_form() -> Json<FormDescription> {
    Json(FormDescription {
        form: "login",
        fields: &["email", "password", "remember_me"],
    })
}

pub async fn register_form() -> Json<FormDescription> {
    Json(FormDescription {
        form: "register",
        fields: &["email", "username", "password", "password2"],
    })
}

#[instrument(skip(state, jar, payload))]
pub async fn login(
    State(state): State<AppState>,
    Query(query): Query<NextQuery>,
    jar: CookieJar,
    JsonForm(payload): JsonForm<LoginForm>,
) -> Result<(CookieJar, Json<LoginResponse>), AppError> {
    let user = services::authenticate(state.store.as_ref(), &payload).await?;

    let keys = SessionKeys::from_ref(&state);
    let token = keys.sign(user.id, payload.remember_me)?;
    let jar = keys.start(jar, token, payload.remember_me);

    Ok((
        jar,
        Json(LoginResponse {
            message: format!("Welcome, {}!", user.username),
            redirect: safe_next(query.next.as_deref()),
            user: PublicUser {
                id: user.id,
                username: user.username,
                email: user.email,
            },
        }),
    ))
}

#[instrument(skip(state, jar))]
pub async fn logout(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    let jar = SessionKeys::from_ref(&state).end(jar);
    info!(%user_id, "user logged out");
    (
        jar,
        Json(MessageResponse {
            message: "You have been logged out".into(),
            redirect: "/".into(),
        }),
    )
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    JsonForm(payload): JsonForm<RegisterForm>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    services::register(state.store.as_ref(), payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "You can now log in!".into(),
            redirect: "/login".into(),
        }),
    ))
}
