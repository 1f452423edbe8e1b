use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use super::{WeatherApi, WeatherError, WeatherReport};

/// Canned answers keyed by postal code; unknown codes answer `NotFound`.
#[derive(Default)]
pub struct FakeWeather {
    cities: Mutex<HashMap<String, (String, f64, String)>>,
    failure: Mutex<Option<fn() -> WeatherError>>,
    calls: AtomicUsize,
}

impl FakeWeather {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, zip: &str, city: &str, kelvin: f64, condition: &str) -> Self {
        self.cities
            .lock()
            .unwrap()
            .insert(zip.into(), (city.into(), kelvin, condition.into()));
        self
    }

    pub fn failing(self, make: fn() -> WeatherError) -> Self {
        *self.failure.lock().unwrap() = Some(make);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WeatherApi for FakeWeather {
    async fn lookup(&self, postal_code: &str) -> Result<WeatherReport, WeatherError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(make) = *self.failure.lock().unwrap() {
            return Err(make());
        }
        let entry = self.cities.lock().unwrap().get(postal_code).cloned();
        let (city, temp, condition) = entry.ok_or(WeatherError::NotFound)?;
        WeatherReport::from_raw(json!({
            "name": city,
            "main": {"temp": temp},
            "weather": [{"main": condition}]
        }))
    }
}
