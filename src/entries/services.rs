use sqlx::SqlitePool;
use time::Date;
use tracing::{debug, info};

use crate::{
    admin::repo_types::AnnualRate,
    dates::{month_bounds, trailing_months},
    entries::{
        dto::{ListQuery, MonthlyStat},
        repo_types::{EntryWithOwner, NewWorkEntry, WorkEntry},
    },
    error::{ApiError, ApiResult},
    locale::Locale,
};

pub const STATS_MONTHS: usize = 6;

pub(crate) fn checked_month_bounds(year: i32, month: u8) -> ApiResult<(Date, Date)> {
    month_bounds(year, month).map_err(|e| ApiError::validation(e.to_string()))
}

pub async fn create_entry(db: &SqlitePool, user_id: i64, new: NewWorkEntry) -> ApiResult<WorkEntry> {
    let entry = WorkEntry::create(db, user_id, &new).await?;
    info!(entry_id = entry.id, user_id, date = %entry.date, amount = entry.amount, "work entry created");
    Ok(entry)
}

pub async fn list_entries(db: &SqlitePool, user_id: i64, q: &ListQuery) -> ApiResult<Vec<WorkEntry>> {
    let (limit, offset) = (q.clamped_limit(), q.offset());
    let rows = match q.month_filter()? {
        Some((year, month)) => {
            let (from, to) = checked_month_bounds(year, month)?;
            WorkEntry::list_by_user_between(db, user_id, from, to, limit, offset).await?
        }
        None => WorkEntry::list_by_user(db, user_id, limit, offset).await?,
    };
    Ok(rows)
}

/// 404 both when the entry is missing and when someone else owns it.
pub async fn delete_entry(db: &SqlitePool, user_id: i64, entry_id: i64) -> ApiResult<()> {
    if !WorkEntry::delete_owned(db, entry_id, user_id).await? {
        return Err(ApiError::not_found("Entry not found"));
    }
    info!(entry_id, user_id, "work entry deleted");
    Ok(())
}

/// Hours and euros for the [`STATS_MONTHS`] months ending with `today`'s month, oldest first.
pub async fn monthly_stats(
    db: &SqlitePool,
    locale: &Locale,
    user_id: i64,
    today: Date,
) -> ApiResult<Vec<MonthlyStat>> {
    let months = trailing_months(today, STATS_MONTHS);
    let (Some(&(first_year, first_month)), Some(&(last_year, last_month))) =
        (months.first(), months.last())
    else {
        return Ok(Vec::new());
    };

    let (from, _) = checked_month_bounds(first_year, first_month as u8)?;
    let (_, to) = checked_month_bounds(last_year, last_month as u8)?;

    let hours = WorkEntry::hours_by_month(db, user_id, from, to).await?;
    let rates = AnnualRate::for_years(db, first_year as i64, last_year as i64).await?;

    let stats = months
        .into_iter()
        .map(|(year, month)| {
            let key = format!("{year:04}-{:02}", month as u8);
            let hours = hours
                .iter()
                .find(|(ym, _)| *ym == key)
                .map(|(_, h)| *h)
                .unwrap_or(0.0);
            let rate = rates.get(&(year as i64)).copied().unwrap_or(0.0);
            MonthlyStat {
                year,
                month: month as u8,
                label: locale.month_label(month).to_string(),
                hours,
                rate,
                euros: hours * rate,
            }
        })
        .collect::<Vec<_>>();

    debug!(user_id, months = stats.len(), "monthly stats computed");
    Ok(stats)
}

pub async fn month_export_rows(
    db: &SqlitePool,
    user_id: i64,
    year: i32,
    month: u8,
) -> ApiResult<Vec<EntryWithOwner>> {
    let range = checked_month_bounds(year, month)?;
    Ok(EntryWithOwner::list(db, Some(user_id), Some(range)).await?)
}
