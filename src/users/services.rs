use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::users::dto::{LoginRequest, LoginUser, PublicUser, RegisterRequest};
use crate::users::password::{hash_password, verify_password};
use crate::users::repo::UserStore;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

// Emails are compared case-insensitively; lowercase before every store call.
fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub async fn list_users(store: &dyn UserStore) -> Result<Vec<PublicUser>, ApiError> {
    let users = store.list().await?;
    Ok(users.into_iter().map(PublicUser::from).collect())
}

pub async fn get_user(store: &dyn UserStore, id: i64) -> Result<PublicUser, ApiError> {
    match store.get_by_id(id).await? {
        Some(user) => Ok(PublicUser::from(user)),
        None => Err(ApiError::NotFound),
    }
}

pub async fn register_user(
    store: &dyn UserStore,
    mut payload: RegisterRequest,
) -> Result<i64, ApiError> {
    payload.email = normalize_email(&payload.email);

    if payload.username.trim().is_empty() {
        return Err(ApiError::InvalidInput("Username is required".into()));
    }
    if payload.password.is_empty() {
        return Err(ApiError::InvalidInput("Password is required".into()));
    }
    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err(ApiError::InvalidInput("Invalid email".into()));
    }

    let hash = hash_password(&payload.password).map_err(ApiError::Unavailable)?;

    // The unique constraint is the arbiter: concurrent registrations with the
    // same email race on it and exactly one insert wins.
    let id = store
        .create(&payload.username, &payload.email, &hash)
        .await?;

    info!(user_id = id, email = %payload.email, "user registered");
    Ok(id)
}

pub async fn login(store: &dyn UserStore, mut payload: LoginRequest) -> Result<LoginUser, ApiError> {
    payload.email = normalize_email(&payload.email);

    if payload.email.is_empty() {
        return Err(ApiError::InvalidInput("Email is required".into()));
    }
    if payload.password.is_empty() {
        return Err(ApiError::InvalidInput("Password is required".into()));
    }

    // Unknown email and wrong password collapse into the same error so the
    // response never reveals which emails are registered.
    let user = match store.find_by_email(&payload.email).await? {
        Some(u) => u,
        None => {
            warn!(email = %payload.email, "login unknown email");
            return Err(ApiError::InvalidCredentials);
        }
    };

    if !verify_password(&payload.password, &user.password_hash) {
        warn!(email = %payload.email, user_id = user.id, "login invalid password");
        return Err(ApiError::InvalidCredentials);
    }

    info!(user_id = user.id, email = %user.email, "user logged in");
    Ok(LoginUser::from(user))
}
