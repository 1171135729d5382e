//! Demo-data generator and database housekeeping used by the CLI.

use std::path::Path;

use anyhow::Context;
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use sqlx::SqlitePool;
use time::{util::days_in_year_month, Date, Month};
use tracing::{info, warn};

use crate::{
    auth::{
        password::hash_password,
        repo_types::{Role, User},
    },
    dates::trailing_months,
    entries::repo_types::{NewWorkEntry, Shift, WorkEntry},
};

pub const DEMO_USERS: [&str; 2] = ["demo1", "demo2"];
pub const DEMO_PASSWORD: &str = "demo123";
pub const DEMO_TASKS: [&str; 4] = ["Sacos", "Quemadores", "Filtros", "Otros"];
pub const DEMO_MONTHS: usize = 6;

/// Random entries for one month: 8-12 distinct days up to `max_day`,
/// roughly 20-30 hours in total, each amount rounded to half an hour.
pub fn generate_month<R: Rng>(rng: &mut R, year: i32, month: Month, max_day: u8) -> Vec<NewWorkEntry> {
    let wanted = rng.gen_range(8..=12);
    let total_hours: f64 = rng.gen_range(20.0..30.0);

    let possible: Vec<u8> = (1..=max_day).collect();
    let mut days: Vec<u8> = if possible.len() < wanted {
        possible
    } else {
        possible.choose_multiple(rng, wanted).copied().collect()
    };
    days.sort_unstable();
    if days.is_empty() {
        return Vec::new();
    }

    let base = total_hours / days.len() as f64;
    days.into_iter()
        .filter_map(|day| Date::from_calendar_date(year, month, day).ok())
        .map(|date| {
            let hours = base * rng.gen_range(0.8..1.2);
            NewWorkEntry {
                date,
                shift: *Shift::ALL.choose(rng).unwrap_or(&Shift::Morning),
                task: DEMO_TASKS.choose(rng).unwrap_or(&"Otros").to_string(),
                amount: (hours * 2.0).round() / 2.0,
            }
        })
        .collect()
}

/// Recreates the demo accounts' last [`DEMO_MONTHS`] months of entries in one transaction.
pub async fn seed_demo(db: &SqlitePool, today: Date) -> anyhow::Result<()> {
    let mut rng = StdRng::from_entropy();
    let hash = hash_password(DEMO_PASSWORD)?;

    let mut tx = db.begin().await.context("begin seed transaction")?;
    for username in DEMO_USERS {
        let full_name = format!("Usuario {}", capitalize(username));
        let user = User::upsert_tx(&mut tx, username, Some(&full_name), &hash, Role::User).await?;
        let cleared = WorkEntry::delete_all_for_user_tx(&mut tx, user.id).await?;
        info!(%username, user_id = user.id, cleared, "demo user ready");

        for (year, month) in trailing_months(today, DEMO_MONTHS) {
            let max_day = if (year, month) == (today.year(), today.month()) {
                today.day()
            } else {
                days_in_year_month(year, month)
            };
            let entries = generate_month(&mut rng, year, month, max_day);
            for entry in &entries {
                WorkEntry::insert_tx(&mut tx, user.id, entry).await?;
            }
            let hours: f64 = entries.iter().map(|e| e.amount).sum();
            info!(%username, year, month = u8::from(month), entries = entries.len(), hours, "month seeded");
        }
    }
    tx.commit().await.context("commit seed transaction")?;
    Ok(())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Prints what the database holds; used by `horas db-status`.
pub async fn print_status(db_path: &Path, admin_username: &str) -> anyhow::Result<()> {
    println!("database: {}", db_path.display());
    println!("configured admin: {admin_username}");
    if !db_path.exists() {
        println!("database file does not exist");
        return Ok(());
    }

    let db = SqlitePool::connect_with(
        sqlx::sqlite::SqliteConnectOptions::new()
            .filename(db_path)
            .read_only(true),
    )
    .await
    .context("open database read-only")?;

    let users = User::list_all(&db).await?;
    let entries = WorkEntry::count(&db).await?;
    println!("users: {}, entries: {entries}", users.len());
    for u in users {
        println!("  #{:<4} {:<24} {:?}", u.id, u.username, u.role);
    }
    db.close().await;
    Ok(())
}

/// Deletes the database file and its WAL/SHM companions.
pub fn reset_database(db_path: &Path) -> anyhow::Result<bool> {
    let mut removed = false;
    for suffix in ["", "-wal", "-shm"] {
        let mut os = db_path.as_os_str().to_owned();
        os.push(suffix);
        let path = Path::new(&os);
        if path.exists() {
            std::fs::remove_file(path).with_context(|| format!("remove {}", path.display()))?;
            removed = true;
        }
    }
    if removed {
        warn!(path = %db_path.display(), "database deleted; it is recreated on next start");
    } else {
        info!(path = %db_path.display(), "no database file to delete");
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_month_respects_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let entries = generate_month(&mut rng, 2024, Month::February, 29);
            assert!((8..=12).contains(&entries.len()));

            let mut days: Vec<u8> = entries.iter().map(|e| e.date.day()).collect();
            let n = days.len();
            days.dedup();
            assert_eq!(days.len(), n, "days must be distinct");

            for e in &entries {
                assert_eq!(e.date.month(), Month::February);
                assert!(e.amount >= 0.0);
                assert_eq!((e.amount * 2.0).fract(), 0.0);
                assert!(DEMO_TASKS.contains(&e.task.as_str()));
            }
        }
    }

    #[test]
    fn early_in_month_uses_every_elapsed_day() {
        let mut rng = StdRng::seed_from_u64(1);
        let entries = generate_month(&mut rng, 2024, Month::March, 3);
        let days: Vec<u8> = entries.iter().map(|e| e.date.day()).collect();
        assert_eq!(days, vec![1, 2, 3]);
    }

    #[test]
    fn reset_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("horas.db");
        assert!(!reset_database(&path).unwrap());
        std::fs::write(&path, b"x").unwrap();
        std::fs::write(dir.path().join("horas.db-wal"), b"x").unwrap();
        assert!(reset_database(&path).unwrap());
        assert!(!path.exists());
        assert!(!dir.path().join("horas.db-wal").exists());
    }

    #[test]
    fn capitalizes_demo_names() {
        assert_eq!(capitalize("demo1"), "Demo1");
        assert_eq!(capitalize(""), "");
    }
}
