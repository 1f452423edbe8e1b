use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::forms::FieldErrors;
use crate::weather::WeatherError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("validation failed")]
    Validation(FieldErrors),
    #[error("Invalid username or password.")]
    InvalidCredentials,
    #[error("login required")]
    Unauthorized,
    #[error("{message}")]
    MalformedBody { status: StatusCode, message: String },
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("no weather found for postal code {0}")]
    UnknownPostalCode(String),
    #[error("Weather service unavailable, please try again later.")]
    WeatherUnavailable(#[source] WeatherError),
    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::MalformedBody { .. } => "MALFORMED_BODY",
            Self::NotFound(_) => "NOT_FOUND",
            Self::UnknownPostalCode(_) => "UNKNOWN_POSTAL_CODE",
            Self::WeatherUnavailable(_) => "WEATHER_UNAVAILABLE",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// Maps an upstream failure for `postal_code` to what the client sees.
    pub fn from_weather(postal_code: &str, e: WeatherError) -> Self {
        match e {
            WeatherError::NotFound => Self::UnknownPostalCode(postal_code.to_string()),
            other => Self::WeatherUnavailable(other),
        }
    }
}

impl From<FieldErrors> for AppError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::MalformedBody {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InvalidCredentials | Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::MalformedBody { status, .. } => *status,
            Self::NotFound(_) | Self::UnknownPostalCode(_) => StatusCode::NOT_FOUND,
            Self::WeatherUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let mut body = json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        match &self {
            Self::Validation(errors) => body["errors"] = json!(errors),
            Self::WeatherUnavailable(e) => {
                tracing::warn!(error = %e, "weather service unavailable");
                body["retryable"] = json!(e.is_retryable());
            }
            Self::Internal(e) => tracing::error!(error = ?e, kind = "INTERNAL", "internal error"),
            _ => {}
        }
        (status, Json(body)).into_response()
    }
}

/// Router fallback for unknown paths.
pub async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"kind": "NOT_FOUND", "message": "page not found"})),
    )
        .into_response()
}
