//! Field-level validation shared by the request forms.
//!
//! Each form collects every failing rule into [`FieldErrors`] so a client can
//! show messages next to the offending inputs.

use std::collections::BTreeMap;

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

use crate::error::AppError;

/// `Json<T>` whose rejection is an [`AppError`], so a body that does not
/// deserialize still gets the JSON error shape.
#[derive(Debug)]
pub struct JsonForm<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for JsonForm<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(JsonForm(value))
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<&'static str, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

lazy_static! {
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z][A-Za-z0-9_.]*$").unwrap();
}

pub const USERNAME_MESSAGE: &str =
    "Usernames must have only letters, numbers, dots or underscores";
pub const POSTAL_CODE_MESSAGE: &str = "Please enter 5 digit zipcodes";

/// Fails with "This field is required." on blank input. Returns whether it passed.
pub fn required(errors: &mut FieldErrors, field: &'static str, value: &str) -> bool {
    if value.trim().is_empty() {
        errors.add(field, "This field is required.");
        return false;
    }
    true
}

pub fn length(errors: &mut FieldErrors, field: &'static str, value: &str, min: usize, max: usize) -> bool {
    let n = value.chars().count();
    if n < min || n > max {
        errors.add(
            field,
            format!("Field must be between {} and {} characters long.", min, max),
        );
        return false;
    }
    true
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn email(errors: &mut FieldErrors, field: &'static str, value: &str) -> bool {
    if !is_valid_email(value) {
        errors.add(field, "Invalid email address.");
        return false;
    }
    true
}

pub fn username(errors: &mut FieldErrors, field: &'static str, value: &str) -> bool {
    if !USERNAME_RE.is_match(value) {
        errors.add(field, USERNAME_MESSAGE);
        return false;
    }
    true
}

pub fn equal_to(errors: &mut FieldErrors, field: &'static str, value: &str, other: &str, message: &str) -> bool {
    if value != other {
        errors.add(field, message);
        return false;
    }
    true
}

/// Five ASCII digits, leading zeros kept.
///
/// The check is on the typed characters, never on a numeric conversion:
/// `"02134"` parses to 2134 which has four digits but is a valid code.
pub fn is_postal_code(value: &str) -> bool {
    value.len() == 5 && value.bytes().all(|b| b.is_ascii_digit())
}

pub fn postal_code(errors: &mut FieldErrors, field: &'static str, value: &str) -> bool {
    if !required(errors, field, value) {
        return false;
    }
    if !is_postal_code(value.trim()) {
        errors.add(field, POSTAL_CODE_MESSAGE);
        return false;
    }
    true
}
