//! OpenWeatherMap current-weather client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use super::types::{WeatherError, WeatherReport};
use super::WeatherApi;
use crate::config::WeatherConfig;

#[derive(Clone)]
pub struct OwmClient {
    client: Client,
    base_url: String,
    api_key: String,
    country: String,
}

impl OwmClient {
    pub fn new(config: &WeatherConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            country: config.country.clone(),
        })
    }

    #[cfg(test)]
    fn with_timeout(base_url: &str, timeout: Duration) -> Self {
        Self {
            client: Client::builder().timeout(timeout).build().unwrap(),
            base_url: base_url.to_string(),
            api_key: "test-key".into(),
            country: "us".into(),
        }
    }
}

#[async_trait]
impl WeatherApi for OwmClient {
    #[instrument(skip(self))]
    async fn lookup(&self, postal_code: &str) -> Result<WeatherReport, WeatherError> {
        let zip = format!("{},{}", postal_code, self.country);
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[("zip", zip.as_str()), ("appid", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "weather request failed");
                WeatherError::from(e)
            })?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            debug!("upstream has no weather for postal code");
            return Err(WeatherError::NotFound);
        }
        if !status.is_success() {
            warn!(%status, "weather service returned error status");
            return Err(WeatherError::Status(status.as_u16()));
        }

        let text = resp.text().await?;
        let raw: Value =
            serde_json::from_str(&text).map_err(|e| WeatherError::Malformed(e.to_string()))?;
        let report = WeatherReport::from_raw(raw)?;
        debug!(city = %report.city, condition = %report.condition, "weather fetched");
        Ok(report)
    }
}
