use tracing::info;
use uuid::Uuid;

use super::repo::LocationRepo;
use super::repo_types::Location;
use crate::error::AppError;
use crate::store::Store;
use crate::weather::{WeatherApi, WeatherReport};

/// Looks up current weather without recording anything.
pub async fn search(weather: &dyn WeatherApi, postal_code: &str) -> Result<WeatherReport, AppError> {
    weather
        .lookup(postal_code)
        .await
        .map_err(|e| AppError::from_weather(postal_code, e))
}

/// Looks up `postal_code` and records a new location for `user_id`.
///
/// Repeated codes each get their own row. Nothing is written when the
/// lookup fails.
pub async fn search_and_record(
    store: &dyn Store,
    weather: &dyn WeatherApi,
    user_id: Uuid,
    postal_code: &str,
) -> Result<(WeatherReport, Location), AppError> {
    let report = search(weather, postal_code).await?;
    let location = store
        .record_location(user_id, postal_code, &report.city)
        .await?;
    info!(%user_id, location_id = %location.id, zip = %postal_code, "location recorded");
    Ok((report, location))
}
