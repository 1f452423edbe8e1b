use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::forms::{self, FieldErrors};
use crate::sets::repo_types::{SetSummary, WeatherSet};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NewSetForm {
    pub name: String,
    /// Location ids as sent. Each is checked against the owner's locations.
    pub loc_picks: Vec<String>,
}

impl NewSetForm {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if forms::required(&mut errors, "name", &self.name) {
            forms::length(&mut errors, "name", self.name.trim(), 1, 255);
        }
        errors
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NicknameForm {
    pub nickname: String,
}

impl NicknameForm {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if forms::required(&mut errors, "nickname", &self.nickname) {
            forms::length(&mut errors, "nickname", self.nickname.trim(), 1, 255);
        }
        errors
    }
}

#[derive(Debug, Serialize)]
pub struct Choice {
    pub id: Uuid,
    pub label: String,
}

#[derive(Debug, Serialize)]
pub struct ChoicesResponse {
    pub choices: Vec<Choice>,
}

#[derive(Debug, Serialize)]
pub struct SetResponse {
    pub set: WeatherSet,
    pub redirect: String,
}

#[derive(Debug, Serialize)]
pub struct SetsResponse {
    pub sets: Vec<SetSummary>,
}

#[derive(Debug, Serialize)]
pub struct LocationWeather {
    pub id: Uuid,
    pub zip: String,
    pub city: String,
    pub temperature_f: f64,
    pub condition: String,
}

#[derive(Debug, Serialize)]
pub struct SetView {
    pub set: WeatherSet,
    pub locations: Vec<LocationWeather>,
}

#[derive(Debug, Serialize)]
pub struct NicknameFormResponse {
    pub set: String,
    pub fields: &'static [&'static str],
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub message: String,
    pub redirect: String,
}
