use lazy_static::lazy_static;
use regex::Regex;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::{
    auth::{
        dto::{ChangePasswordRequest, CreateUserRequest},
        password::{hash_password, verify_password},
        repo_types::User,
    },
    error::{ApiError, ApiResult},
};

pub const MIN_PASSWORD_LEN: usize = 6;

lazy_static! {
    static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_.@-]{3,64}$").unwrap();
}

pub(crate) fn normalize_username(raw: &str) -> ApiResult<String> {
    let username = raw.trim();
    if !USERNAME_RE.is_match(username) {
        return Err(ApiError::validation(
            "Username must be 3-64 characters of letters, digits, '.', '_', '-' or '@'",
        ));
    }
    Ok(username.to_string())
}

pub(crate) fn validate_password(password: &str) -> ApiResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

fn normalize_full_name(raw: Option<String>) -> Option<String> {
    raw.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}

/// Checks a username/password pair; the same error covers unknown user and bad password.
pub async fn authenticate(db: &SqlitePool, username: &str, password: &str) -> ApiResult<User> {
    let rejected = || ApiError::unauthorized("Incorrect username or password");

    let Some(user) = User::find_by_username(db, username.trim()).await? else {
        warn!(%username, "login unknown username");
        return Err(rejected());
    };
    if !verify_password(password, &user.hashed_password)? {
        warn!(user_id = user.id, "login invalid password");
        return Err(rejected());
    }
    Ok(user)
}

pub async fn create_user(db: &SqlitePool, req: CreateUserRequest) -> ApiResult<User> {
    let username = normalize_username(&req.username)?;
    validate_password(&req.password)?;

    if User::find_by_username(db, &username).await?.is_some() {
        warn!(%username, "username already registered");
        return Err(ApiError::conflict("Username already registered"));
    }

    let hash = hash_password(&req.password)?;
    let full_name = normalize_full_name(req.full_name);
    let user = User::create(
        db,
        &username,
        full_name.as_deref(),
        &hash,
        req.role.unwrap_or_default(),
    )
    .await
    .map_err(|e| match ApiError::from(e) {
        // lost a race against a concurrent insert of the same username
        ApiError::Conflict(_) => ApiError::conflict("Username already registered"),
        other => other,
    })?;

    info!(user_id = user.id, username = %user.username, role = ?user.role, "user created");
    Ok(user)
}

pub async fn change_password(
    db: &SqlitePool,
    user: &User,
    req: ChangePasswordRequest,
) -> ApiResult<()> {
    if !verify_password(&req.old_password, &user.hashed_password)? {
        warn!(user_id = user.id, "password change with wrong current password");
        return Err(ApiError::bad_request("Incorrect current password"));
    }
    validate_password(&req.new_password)?;

    let hash = hash_password(&req.new_password)?;
    User::set_password(db, user.id, &hash).await?;
    info!(user_id = user.id, "password changed");
    Ok(())
}
