use axum::{
    extract::State,
    http::StatusCode,
    response::Response,
    routing::{delete, get},
    Json, Router,
};
use serde_json::{json, Value};
use time::OffsetDateTime;
use tracing::{info, instrument};

use crate::{
    auth::extractors::CurrentUser,
    entries::{
        dto::{CreateEntryRequest, ListQuery, MonthQuery, MonthlyStat},
        repo_types::WorkEntry,
        services,
    },
    error::ApiResult,
    export::{render_workbook, xlsx_response},
    extract::{ApiJson, ApiPath, ApiQuery},
    state::AppState,
};

pub fn entry_routes() -> Router<AppState> {
    Router::new()
        .route("/entries/", get(list_entries).post(create_entry))
        .route("/entries/:id", delete(delete_entry))
        .route("/entries/stats/monthly", get(monthly_stats))
}

pub fn export_routes() -> Router<AppState> {
    Router::new().route("/export/month", get(export_month))
}

#[instrument(skip(state, user, body), fields(user_id = user.id))]
pub async fn create_entry(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(body): ApiJson<CreateEntryRequest>,
) -> ApiResult<(StatusCode, Json<WorkEntry>)> {
    let new = body.validate()?;
    let entry = services::create_entry(&state.db, user.id, new).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn list_entries(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiQuery(q): ApiQuery<ListQuery>,
) -> ApiResult<Json<Vec<WorkEntry>>> {
    let rows = services::list_entries(&state.db, user.id, &q).await?;
    Ok(Json(rows))
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn delete_entry(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<Value>> {
    services::delete_entry(&state.db, user.id, id).await?;
    Ok(Json(json!({ "ok": true })))
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn monthly_stats(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<MonthlyStat>>> {
    let today = OffsetDateTime::now_utc().date();
    let stats = services::monthly_stats(&state.db, state.locale, user.id, today).await?;
    Ok(Json(stats))
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn export_month(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiQuery(q): ApiQuery<MonthQuery>,
) -> ApiResult<Response> {
    let rows = services::month_export_rows(&state.db, user.id, q.year, q.month).await?;
    let body = render_workbook(state.locale, &rows)?;
    info!(rows = rows.len(), year = q.year, month = q.month, "month export rendered");

    let filename = format!("horas_{}_{:04}_{:02}.xlsx", user.username, q.year, q.month);
    Ok(xlsx_response(&filename, body))
}
