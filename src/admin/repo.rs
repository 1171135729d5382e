use std::collections::HashMap;

use anyhow::Context;
use sqlx::SqlitePool;

use crate::admin::repo_types::AnnualRate;

impl AnnualRate {
    pub async fn upsert(db: &SqlitePool, year: i64, rate: f64) -> anyhow::Result<AnnualRate> {
        let row = sqlx::query_as::<_, AnnualRate>(
            r#"
            INSERT INTO annual_rates (year, rate)
            VALUES (?1, ?2)
            ON CONFLICT (year) DO UPDATE SET rate = excluded.rate
            RETURNING year, rate
            "#,
        )
        .bind(year)
        .bind(rate)
        .fetch_one(db)
        .await
        .context("upsert annual rate")?;
        Ok(row)
    }

    pub async fn list_desc(db: &SqlitePool) -> anyhow::Result<Vec<AnnualRate>> {
        let rows = sqlx::query_as::<_, AnnualRate>(
            "SELECT year, rate FROM annual_rates ORDER BY year DESC",
        )
        .fetch_all(db)
        .await
        .context("list annual rates")?;
        Ok(rows)
    }

    /// Rates for `from..=to` keyed by year; missing years are simply absent.
    pub async fn for_years(db: &SqlitePool, from: i64, to: i64) -> anyhow::Result<HashMap<i64, f64>> {
        let rows = sqlx::query_as::<_, AnnualRate>(
            "SELECT year, rate FROM annual_rates WHERE year BETWEEN ?1 AND ?2",
        )
        .bind(from)
        .bind(to)
        .fetch_all(db)
        .await
        .context("load annual rates")?;
        Ok(rows.into_iter().map(|r| (r.year, r.rate)).collect())
    }
}
