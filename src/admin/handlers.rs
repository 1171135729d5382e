use axum::{
    extract::State,
    response::Response,
    routing::{delete, get, patch},
    Json, Router,
};
use serde_json::{json, Value};
use time::{macros::format_description, OffsetDateTime};
use tracing::{info, instrument};

use crate::{
    admin::{
        dto::{SummaryResponse, UpdateRoleRequest, UpsertRateRequest},
        repo_types::AnnualRate,
        services,
    },
    auth::{dto::PublicUser, extractors::AdminUser, repo_types::User},
    entries::repo_types::EntryWithOwner,
    error::ApiResult,
    export::{render_workbook, xlsx_response},
    extract::{ApiJson, ApiPath},
    state::AppState,
};

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(list_users))
        .route("/admin/users/:id", patch(update_role).delete(delete_user))
        .route("/admin/entries/:id", delete(delete_entry))
        .route("/admin/rates", get(list_rates).post(upsert_rate))
        .route("/admin/export", get(export_all))
        .route("/admin/summary", get(summary))
}

#[instrument(skip(state, _admin))]
pub async fn list_users(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> ApiResult<Json<Vec<PublicUser>>> {
    let users = User::list_all(&state.db).await?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}

#[instrument(skip(state, admin, body), fields(admin_id = admin.id))]
pub async fn update_role(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(body): ApiJson<UpdateRoleRequest>,
) -> ApiResult<Json<PublicUser>> {
    let user = services::update_role(&state.db, &state.config.admin.username, id, body.role).await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, admin), fields(admin_id = admin.id))]
pub async fn delete_user(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Value>> {
    services::delete_user(&state.db, &state.config.admin.username, id).await?;
    Ok(Json(json!({ "ok": true })))
}

#[instrument(skip(state, admin), fields(admin_id = admin.id))]
pub async fn delete_entry(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Value>> {
    services::delete_any_entry(&state.db, id).await?;
    Ok(Json(json!({ "ok": true })))
}

#[instrument(skip(state, _admin))]
pub async fn list_rates(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> ApiResult<Json<Vec<AnnualRate>>> {
    Ok(Json(AnnualRate::list_desc(&state.db).await?))
}

#[instrument(skip(state, admin), fields(admin_id = admin.id))]
pub async fn upsert_rate(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ApiJson(body): ApiJson<UpsertRateRequest>,
) -> ApiResult<Json<AnnualRate>> {
    Ok(Json(services::upsert_rate(&state.db, &body).await?))
}

#[instrument(skip(state, admin), fields(admin_id = admin.id))]
pub async fn export_all(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
) -> ApiResult<Response> {
    let rows = EntryWithOwner::list(&state.db, None, None).await?;
    let body = render_workbook(state.locale, &rows)?;
    info!(rows = rows.len(), "full export rendered");

    let stamp = OffsetDateTime::now_utc()
        .date()
        .format(format_description!("[year][month][day]"))
        .map_err(anyhow::Error::from)?;
    Ok(xlsx_response(&format!("horas_export_{stamp}.xlsx"), body))
}

#[instrument(skip(state, _admin))]
pub async fn summary(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> ApiResult<Json<SummaryResponse>> {
    Ok(Json(services::summary(&state.db).await?))
}
