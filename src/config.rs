use serde::Deserialize;

pub const DEFAULT_OWM_BASE_URL: &str = "http://api.openweathermap.org/data/2.5/weather";

/// Upper bounds on session lifetimes. Anything longer is clamped.
pub const MAX_SESSION_TTL_MINUTES: i64 = 60 * 24 * 365;
pub const MAX_REMEMBER_DAYS: i64 = 10 * 365;

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub remember_days: i64,
    pub cookie_secure: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherConfig {
    pub base_url: String,
    pub api_key: String,
    /// Appended to every postal code, e.g. `02134,us`.
    pub country: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub session: SessionConfig,
    pub weather: WeatherConfig,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let session = SessionConfig {
            secret: std::env::var("SESSION_SECRET")?,
            issuer: std::env::var("SESSION_ISSUER").unwrap_or_else(|_| "weatherdash".into()),
            audience: std::env::var("SESSION_AUDIENCE")
                .unwrap_or_else(|_| "weatherdash-users".into()),
            ttl_minutes: env_or::<i64>("SESSION_TTL_MINUTES", 60 * 12).clamp(1, MAX_SESSION_TTL_MINUTES),
            remember_days: env_or::<i64>("SESSION_REMEMBER_DAYS", 30).clamp(1, MAX_REMEMBER_DAYS),
            cookie_secure: env_or("COOKIE_SECURE", false),
        };
        let weather = WeatherConfig {
            base_url: std::env::var("OWM_BASE_URL").unwrap_or_else(|_| DEFAULT_OWM_BASE_URL.into()),
            api_key: std::env::var("OWM_API_KEY")?,
            country: std::env::var("OWM_COUNTRY").unwrap_or_else(|_| "us".into()),
            timeout_secs: env_or("WEATHER_TIMEOUT_SECS", 10),
        };
        Ok(Self {
            database_url,
            db_max_connections: env_or("DB_MAX_CONNECTIONS", 10),
            session,
            weather,
        })
    }
}
