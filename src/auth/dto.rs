use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::forms::{self, FieldErrors};

/// Request body for user registration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub email: String,
    pub username: String,
    pub password: String,
    pub password2: String,
}

impl RegisterForm {
    pub fn normalize(mut self) -> Self {
        self.email = self.email.trim().to_lowercase();
        self.username = self.username.trim().to_string();
        self
    }

    /// Structural rules only; uniqueness needs the store.
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();

        if forms::required(&mut errors, "email", &self.email)
            && forms::length(&mut errors, "email", &self.email, 1, 64)
        {
            forms::email(&mut errors, "email", &self.email);
        }

        if forms::required(&mut errors, "username", &self.username)
            && forms::length(&mut errors, "username", &self.username, 1, 64)
        {
            forms::username(&mut errors, "username", &self.username);
        }

        if forms::required(&mut errors, "password", &self.password) {
            forms::equal_to(
                &mut errors,
                "password",
                &self.password,
                &self.password2,
                "Passwords must match",
            );
        }
        forms::required(&mut errors, "password2", &self.password2);

        errors
    }
}

/// Request body for login.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub remember_me: bool,
}

impl LoginForm {
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if forms::required(&mut errors, "email", &self.email)
            && forms::length(&mut errors, "email", &self.email, 1, 64)
        {
            forms::email(&mut errors, "email", &self.email);
        }
        forms::required(&mut errors, "password", &self.password);
        errors
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// Public part of the user returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub redirect: String,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
    pub redirect: String,
}

/// What a client needs to draw a form.
#[derive(Debug, Serialize)]
pub struct FormDescription {
    pub form: &'static str,
    pub fields: &'static [&'static str],
}
