use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    dates::iso_date,
    entries::repo_types::{NewWorkEntry, Shift},
    error::{ApiError, ApiResult},
};

pub const MAX_TASK_LEN: usize = 64;
pub const DEFAULT_LIMIT: i64 = 100;
pub const MAX_LIMIT: i64 = 1000;

#[derive(Debug, Deserialize)]
pub struct CreateEntryRequest {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub shift: Shift,
    pub task: String,
    pub amount: f64,
}

impl CreateEntryRequest {
    pub fn validate(self) -> ApiResult<NewWorkEntry> {
        let task = self.task.trim().to_string();
        if task.is_empty() {
            return Err(ApiError::validation("Task must not be empty"));
        }
        if task.chars().count() > MAX_TASK_LEN {
            return Err(ApiError::validation(format!(
                "Task must be at most {MAX_TASK_LEN} characters"
            )));
        }
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(ApiError::validation("Amount must be a non-negative number of hours"));
        }
        Ok(NewWorkEntry {
            date: self.date,
            shift: self.shift,
            task,
            amount: self.amount,
        })
    }
}

/// Query of `GET /entries/`. `year` and `month` go together.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub skip: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub year: Option<i32>,
    pub month: Option<u8>,
}

fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

impl ListQuery {
    pub fn offset(&self) -> i64 {
        self.skip.max(0)
    }

    pub fn clamped_limit(&self) -> i64 {
        self.limit.clamp(1, MAX_LIMIT)
    }

    pub fn month_filter(&self) -> ApiResult<Option<(i32, u8)>> {
        match (self.year, self.month) {
            (Some(y), Some(m)) => Ok(Some((y, m))),
            (None, None) => Ok(None),
            _ => Err(ApiError::validation("year and month must be given together")),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub year: i32,
    pub month: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyStat {
    pub year: i32,
    pub month: u8,
    pub label: String,
    pub hours: f64,
    pub rate: f64,
    pub euros: f64,
}
