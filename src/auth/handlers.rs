use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{info, instrument};

use crate::{
    auth::{
        dto::{ChangePasswordRequest, CreateUserRequest, JwtKeys, PublicUser, TokenForm, TokenResponse},
        extractors::{AdminUser, CurrentUser},
        services,
    },
    error::ApiResult,
    extract::{ApiForm, ApiJson},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new().route("/token", post(login_for_access_token))
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/", post(create_user))
        .route("/users/me", get(read_me))
        .route("/users/me/password", put(change_password))
}

#[instrument(skip(state, form), fields(username = %form.username))]
pub async fn login_for_access_token(
    State(state): State<AppState>,
    ApiForm(form): ApiForm<TokenForm>,
) -> ApiResult<Json<TokenResponse>> {
    let user = services::authenticate(&state.db, &form.username, &form.password).await?;

    let access_token = JwtKeys::from_ref(&state).sign(&user.username)?;
    info!(user_id = user.id, "user logged in");
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".into(),
    }))
}

#[instrument(skip(state, admin, payload), fields(admin_id = admin.id))]
pub async fn create_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ApiJson(payload): ApiJson<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<PublicUser>)> {
    let user = services::create_user(&state.db, payload).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

pub async fn read_me(CurrentUser(user): CurrentUser) -> Json<PublicUser> {
    Json(user.into())
}

#[instrument(skip(state, user, payload), fields(user_id = user.id))]
pub async fn change_password(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(payload): ApiJson<ChangePasswordRequest>,
) -> ApiResult<Json<Value>> {
    services::change_password(&state.db, &user, payload).await?;
    Ok(Json(json!({ "ok": true })))
}
