use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::{
    admin::{
        dto::{RecentActivity, SummaryResponse, UpsertRateRequest},
        repo_types::AnnualRate,
    },
    auth::repo_types::{Role, User},
    entries::repo_types::{EntryWithOwner, WorkEntry},
    error::{ApiError, ApiResult},
};

pub const RECENT_ACTIVITY_LIMIT: i64 = 5;

/// Deletes a user and, by cascade, their entries. The primary admin is never deletable.
pub async fn delete_user(db: &SqlitePool, primary_admin: &str, user_id: i64) -> ApiResult<()> {
    let user = User::find_by_id(db, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if user.username == primary_admin {
        warn!(user_id, "refused to delete primary admin");
        return Err(ApiError::forbidden("The primary admin account cannot be deleted"));
    }

    if !User::delete(db, user_id).await? {
        return Err(ApiError::not_found("User not found"));
    }
    info!(user_id, username = %user.username, "user deleted");
    Ok(())
}

pub async fn update_role(
    db: &SqlitePool,
    primary_admin: &str,
    user_id: i64,
    role: Role,
) -> ApiResult<User> {
    let user = User::find_by_id(db, user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if user.username == primary_admin && role != Role::Admin {
        warn!(user_id, "refused to demote primary admin");
        return Err(ApiError::forbidden("The primary admin account cannot be demoted"));
    }

    let updated = User::set_role(db, user_id, role)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    info!(user_id, role = ?updated.role, "user role updated");
    Ok(updated)
}

pub async fn upsert_rate(db: &SqlitePool, req: &UpsertRateRequest) -> ApiResult<AnnualRate> {
    let rate = req.validate()?;
    let stored = AnnualRate::upsert(db, rate.year, rate.rate).await?;
    info!(year = stored.year, rate = stored.rate, "annual rate stored");
    Ok(stored)
}

pub async fn summary(db: &SqlitePool) -> ApiResult<SummaryResponse> {
    let total_users = User::count(db).await?;
    let total_entries = WorkEntry::count(db).await?;
    let recent_activity = EntryWithOwner::recent(db, RECENT_ACTIVITY_LIMIT)
        .await?
        .into_iter()
        .map(RecentActivity::from)
        .collect();
    Ok(SummaryResponse {
        total_users,
        total_entries,
        recent_activity,
    })
}

pub async fn delete_any_entry(db: &SqlitePool, entry_id: i64) -> ApiResult<()> {
    if !WorkEntry::delete_any(db, entry_id).await? {
        return Err(ApiError::not_found("Entry not found"));
    }
    info!(entry_id, "work entry deleted by admin");
    Ok(())
}
