use anyhow::Context;
use sqlx::{Sqlite, SqlitePool, Transaction};
use time::{Date, OffsetDateTime};

use crate::entries::repo_types::{EntryWithOwner, NewWorkEntry, WorkEntry};

const ENTRY_COLUMNS: &str = "id, date, shift, task, amount, created_at, user_id";

const JOINED_COLUMNS: &str = r#"
    e.id, e.date, e.shift, e.task, e.amount, e.created_at, e.user_id,
    u.username, u.full_name
"#;

/// Whole-second UTC timestamp, so stored text sorts chronologically.
fn now_utc() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    now.replace_nanosecond(0).unwrap_or(now)
}

impl WorkEntry {
    pub async fn create(db: &SqlitePool, user_id: i64, new: &NewWorkEntry) -> anyhow::Result<WorkEntry> {
        let entry = sqlx::query_as::<_, WorkEntry>(&format!(
            r#"
            INSERT INTO work_entries (date, shift, task, amount, created_at, user_id)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING {ENTRY_COLUMNS}
            "#
        ))
        .bind(new.date)
        .bind(new.shift)
        .bind(&new.task)
        .bind(new.amount)
        .bind(now_utc())
        .bind(user_id)
        .fetch_one(db)
        .await
        .context("insert work entry")?;
        Ok(entry)
    }

    pub async fn insert_tx(
        tx: &mut Transaction<'_, Sqlite>,
        user_id: i64,
        new: &NewWorkEntry,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO work_entries (date, shift, task, amount, created_at, user_id)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(new.date)
        .bind(new.shift)
        .bind(&new.task)
        .bind(new.amount)
        .bind(now_utc())
        .bind(user_id)
        .execute(&mut **tx)
        .await
        .context("insert work entry")?;
        Ok(())
    }

    /// Caller's entries in insertion order.
    pub async fn list_by_user(
        db: &SqlitePool,
        user_id: i64,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<WorkEntry>> {
        let rows = sqlx::query_as::<_, WorkEntry>(&format!(
            r#"
            SELECT {ENTRY_COLUMNS}
            FROM work_entries
            WHERE user_id = ?1
            ORDER BY id ASC
            LIMIT ?2 OFFSET ?3
            "#
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
        .context("list work entries")?;
        Ok(rows)
    }

    /// Caller's entries with `from <= date <= to`, newest date first.
    pub async fn list_by_user_between(
        db: &SqlitePool,
        user_id: i64,
        from: Date,
        to: Date,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<WorkEntry>> {
        let rows = sqlx::query_as::<_, WorkEntry>(&format!(
            r#"
            SELECT {ENTRY_COLUMNS}
            FROM work_entries
            WHERE user_id = ?1 AND date BETWEEN ?2 AND ?3
            ORDER BY date DESC, id DESC
            LIMIT ?4 OFFSET ?5
            "#
        ))
        .bind(user_id)
        .bind(from)
        .bind(to)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await
        .context("list work entries by month")?;
        Ok(rows)
    }

    /// Deletes only when `user_id` owns the entry.
    pub async fn delete_owned(db: &SqlitePool, id: i64, user_id: i64) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM work_entries WHERE id = ?1 AND user_id = ?2")
            .bind(id)
            .bind(user_id)
            .execute(db)
            .await
            .context("delete owned work entry")?;
        Ok(res.rows_affected() > 0)
    }

    pub async fn delete_any(db: &SqlitePool, id: i64) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM work_entries WHERE id = ?1")
            .bind(id)
            .execute(db)
            .await
            .context("delete work entry")?;
        Ok(res.rows_affected() > 0)
    }

    pub async fn delete_all_for_user_tx(
        tx: &mut Transaction<'_, Sqlite>,
        user_id: i64,
    ) -> anyhow::Result<u64> {
        let res = sqlx::query("DELETE FROM work_entries WHERE user_id = ?1")
            .bind(user_id)
            .execute(&mut **tx)
            .await
            .context("clear work entries")?;
        Ok(res.rows_affected())
    }

    pub async fn count(db: &SqlitePool) -> anyhow::Result<i64> {
        let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM work_entries")
            .fetch_one(db)
            .await
            .context("count work entries")?;
        Ok(n)
    }

    /// Hour totals per `YYYY-MM` for one user within `[from, to]`.
    pub async fn hours_by_month(
        db: &SqlitePool,
        user_id: i64,
        from: Date,
        to: Date,
    ) -> anyhow::Result<Vec<(String, f64)>> {
        let rows = sqlx::query_as::<_, (String, f64)>(
            r#"
            SELECT substr(date, 1, 7) AS ym, COALESCE(SUM(amount), 0.0) AS hours
            FROM work_entries
            WHERE user_id = ?1 AND date BETWEEN ?2 AND ?3
            GROUP BY ym
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(db)
        .await
        .context("sum hours by month")?;
        Ok(rows)
    }
}

impl EntryWithOwner {
    /// Every entry joined with its owner, optionally narrowed to one user and a date range.
    pub async fn list(
        db: &SqlitePool,
        user_id: Option<i64>,
        range: Option<(Date, Date)>,
    ) -> anyhow::Result<Vec<EntryWithOwner>> {
        let (from, to) = range.unzip();
        let rows = sqlx::query_as::<_, EntryWithOwner>(&format!(
            r#"
            SELECT {JOINED_COLUMNS}
            FROM work_entries e
            JOIN users u ON u.id = e.user_id
            WHERE (?1 IS NULL OR e.user_id = ?1)
              AND (?2 IS NULL OR e.date >= ?2)
              AND (?3 IS NULL OR e.date <= ?3)
            ORDER BY e.date ASC, u.username ASC, e.id ASC
            "#
        ))
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(db)
        .await
        .context("list entries with owners")?;
        Ok(rows)
    }

    pub async fn recent(db: &SqlitePool, limit: i64) -> anyhow::Result<Vec<EntryWithOwner>> {
        let rows = sqlx::query_as::<_, EntryWithOwner>(&format!(
            r#"
            SELECT {JOINED_COLUMNS}
            FROM work_entries e
            JOIN users u ON u.id = e.user_id
            ORDER BY e.created_at DESC, e.id DESC
            LIMIT ?1
            "#
        ))
        .bind(limit)
        .fetch_all(db)
        .await
        .context("recent entries")?;
        Ok(rows)
    }
}
