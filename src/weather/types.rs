use serde_json::Value;

/// One current-conditions answer for a postal code.
#[derive(Debug, Clone)]
pub struct WeatherReport {
    pub city: String,
    pub temperature_kelvin: f64,
    pub condition: String,
    /// Upstream body, unmodified.
    pub raw: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("weather request timed out")]
    Timeout,
    #[error("weather request failed: {0}")]
    Transport(String),
    #[error("no weather for this postal code")]
    NotFound,
    #[error("weather service returned status {0}")]
    Status(u16),
    #[error("malformed weather response: {0}")]
    Malformed(String),
}

impl WeatherError {
    /// Whether trying the same request again later may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout | Self::Transport(_) => true,
            Self::Status(code) => *code >= 500 || *code == 429,
            Self::NotFound | Self::Malformed(_) => false,
        }
    }
}

impl From<reqwest::Error> for WeatherError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Transport(e.to_string())
        }
    }
}

impl WeatherReport {
    /// Picks `name`, `main.temp` and `weather[0].main` out of an OpenWeatherMap body.
    pub fn from_raw(raw: Value) -> Result<Self, WeatherError> {
        let city = raw
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| WeatherError::Malformed("missing name".into()))?
            .to_string();
        let temperature_kelvin = raw
            .pointer("/main/temp")
            .and_then(Value::as_f64)
            .ok_or_else(|| WeatherError::Malformed("missing main.temp".into()))?;
        let condition = raw
            .pointer("/weather/0/main")
            .and_then(Value::as_str)
            .ok_or_else(|| WeatherError::Malformed("missing weather[0].main".into()))?
            .to_string();
        Ok(Self {
            city,
            temperature_kelvin,
            condition,
            raw,
        })
    }
}
