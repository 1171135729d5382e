use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    admin::repo_types::AnnualRate,
    auth::repo_types::Role,
    dates::iso_date,
    entries::repo_types::EntryWithOwner,
    error::{ApiError, ApiResult},
};

pub const MIN_RATE_YEAR: i64 = 1900;
pub const MAX_RATE_YEAR: i64 = 9999;

/// Body of `POST /admin/rates`.
#[derive(Debug, Deserialize)]
pub struct UpsertRateRequest {
    pub year: i64,
    pub rate: f64,
}

impl UpsertRateRequest {
    pub fn validate(&self) -> ApiResult<AnnualRate> {
        if !(MIN_RATE_YEAR..=MAX_RATE_YEAR).contains(&self.year) {
            return Err(ApiError::validation(format!(
                "Year must be between {MIN_RATE_YEAR} and {MAX_RATE_YEAR}"
            )));
        }
        if !self.rate.is_finite() || self.rate < 0.0 {
            return Err(ApiError::validation("Rate must be a non-negative number"));
        }
        Ok(AnnualRate {
            year: self.year,
            rate: self.rate,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecentActivity {
    pub worker: String,
    pub username: String,
    #[serde(with = "iso_date")]
    pub date: Date,
    pub task: String,
}

impl From<EntryWithOwner> for RecentActivity {
    fn from(e: EntryWithOwner) -> Self {
        Self {
            worker: e.worker().to_string(),
            username: e.username,
            date: e.date,
            task: e.task,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub total_users: i64,
    pub total_entries: i64,
    pub recent_activity: Vec<RecentActivity>,
}
