use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::forms::{self, FieldErrors};
use crate::locations::repo_types::Location;
use crate::weather::{kelvin_to_fahrenheit, WeatherReport};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchForm {
    pub loc: String,
}

impl SearchForm {
    /// The trimmed postal code, or the field errors.
    pub fn postal_code(&self) -> Result<&str, FieldErrors> {
        let mut errors = FieldErrors::new();
        if forms::postal_code(&mut errors, "loc", &self.loc) {
            Ok(self.loc.trim())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WeatherSummary {
    pub city: String,
    pub temperature_f: f64,
    pub condition: String,
}

impl From<&WeatherReport> for WeatherSummary {
    fn from(r: &WeatherReport) -> Self {
        Self {
            city: r.city.clone(),
            temperature_f: kelvin_to_fahrenheit(r.temperature_kelvin),
            condition: r.condition.clone(),
        }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct SearchResponse {
    pub results: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<WeatherSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl SearchResponse {
    pub fn found(report: WeatherReport, location: Option<Location>) -> Self {
        Self {
            summary: Some(WeatherSummary::from(&report)),
            results: Some(report.raw),
            location,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub locations: Vec<Location>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_response_has_null_results_only() {
        let json = serde_json::to_value(SearchResponse::default()).unwrap();
        assert_eq!(json, json!({"results": null}));
    }

    #[test]
    fn summary_converts_temperature() {
        let report = WeatherReport::from_raw(json!({
            "name": "Ann Arbor", "main": {"temp": 300.4}, "weather": [{"main": "Clear"}]
        }))
        .unwrap();
        let resp = SearchResponse::found(report, None);
        let summary = resp.summary.unwrap();
        assert_eq!(summary.temperature_f, 80.3);
        assert_eq!(summary.condition, "Clear");
        assert_eq!(resp.results.unwrap()["name"], "Ann Arbor");
    }

    #[test]
    fn search_form_trims_and_validates() {
        let form = SearchForm { loc: " 02134 ".into() };
        assert_eq!(form.postal_code().unwrap(), "02134");
        let form = SearchForm { loc: "2134".into() };
        assert!(form.postal_code().unwrap_err().has("loc"));
    }
}
