use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::warn;

use crate::{config::AppConfig, db, locale::Locale};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    pub locale: &'static Locale,
}

impl AppState {
    /// Connects, migrates and resolves the locale table.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let pool = db::connect(&config).await?;
        db::migrate(&pool).await?;
        Ok(Self::from_parts(pool, Arc::new(config)))
    }

    pub fn from_parts(db: SqlitePool, config: Arc<AppConfig>) -> Self {
        let locale = Locale::for_tag(&config.locale).unwrap_or_else(|| {
            warn!(locale = %config.locale, "unknown locale; falling back to default");
            Locale::default_table()
        });
        Self { db, config, locale }
    }
}
