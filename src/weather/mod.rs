use async_trait::async_trait;

pub mod client;
#[cfg(test)]
pub mod fake;
pub mod types;
pub mod units;

pub use client::OwmClient;
pub use types::{WeatherError, WeatherReport};
pub use units::kelvin_to_fahrenheit;

/// Current conditions by postal code.
#[async_trait]
pub trait WeatherApi: Send + Sync {
    async fn lookup(&self, postal_code: &str) -> Result<WeatherReport, WeatherError>;
}
