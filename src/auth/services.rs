use tracing::{info, warn};

use super::dto::{LoginForm, RegisterForm};
use super::password::{hash_password, verify_password};
use super::repo::UserRepo;
use super::repo_types::User;
use crate::error::AppError;
use crate::forms::FieldErrors;

pub const EMAIL_TAKEN: &str = "Email already registered.";
pub const USERNAME_TAKEN: &str = "Username already taken";

/// Validates `form`, including uniqueness, and creates the user.
pub async fn register<S>(store: &S, form: RegisterForm) -> Result<User, AppError>
where
    S: UserRepo + ?Sized,
{
    let form = form.normalize();
    let mut errors = form.validate();

    if !errors.has("email") && store.find_by_email(&form.email).await?.is_some() {
        errors.add("email", EMAIL_TAKEN);
    }
    if !errors.has("username") && store.find_by_username(&form.username).await?.is_some() {
        errors.add("username", USERNAME_TAKEN);
    }
    if !errors.is_empty() {
        warn!(fields = ?errors, "registration rejected");
        return Err(errors.into());
    }

    let hash = hash_password(&form.password)?;
    match store.create_user(&form.username, &form.email, &hash).await? {
        Some(user) => {
            info!(user_id = %user.id, username = %user.username, "user registered");
            Ok(user)
        }
        None => {
            // lost a race with a concurrent registration
            warn!(email = %form.email, "registration conflicted on insert");
            let errors = if store.find_by_username(&form.username).await?.is_some() {
                FieldErrors::single("username", USERNAME_TAKEN)
            } else {
                FieldErrors::single("email", EMAIL_TAKEN)
            };
            Err(errors.into())
        }
    }
}

/// Checks credentials. Unknown email and wrong password fail identically.
pub async fn authenticate<S>(store: &S, form: &LoginForm) -> Result<User, AppError>
where
    S: UserRepo + ?Sized,
{
    form.validate().into_result()?;
    let email = form.email.trim().to_lowercase();

    let Some(user) = store.find_by_email(&email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(AppError::InvalidCredentials);
    };

    if !verify_password(&form.password, &user.password_hash)? {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    info!(user_id = %user.id, "user logged in");
    Ok(user)
}
