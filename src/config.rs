use std::path::PathBuf;

use rand::{distributions::Alphanumeric, Rng};
use serde::Deserialize;
use tracing::warn;

pub const DB_FILE_NAME: &str = "horas.db";
/// Upper bound for `JWT_TTL_MINUTES`: 30 days.
pub const MAX_TTL_MINUTES: i64 = 30 * 24 * 60;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

impl JwtConfig {
    /// Token lifetime, clamped to `1..=MAX_TTL_MINUTES` minutes.
    pub fn ttl(&self) -> std::time::Duration {
        let minutes = self.ttl_minutes.clamp(1, MAX_TTL_MINUTES) as u64;
        std::time::Duration::from_secs(minutes.saturating_mul(60))
    }
}

/// Credentials the primary admin account is reconciled to on startup.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminSeed {
    pub username: String,
    pub password: String,
    pub full_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub db_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
    pub admin: AdminSeed,
    pub locale: String,
}

impl AppConfig {
    /// Defaults rooted at `data_dir`, with nothing read from the environment.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            db_max_connections: 5,
            host: "0.0.0.0".into(),
            port: 8080,
            jwt: JwtConfig {
                secret: random_secret(),
                issuer: "horas".into(),
                audience: "horas-users".into(),
                ttl_minutes: 30,
            },
            admin: AdminSeed {
                username: "admin".into(),
                password: "admin123".into(),
                full_name: "System Admin".into(),
            },
            locale: "es".into(),
        }
    }

    pub fn from_env() -> anyhow::Result<Self> {
        let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".into());
        let mut cfg = Self::with_data_dir(data_dir);

        if let Some(n) = parsed_var::<u32>("DB_MAX_CONNECTIONS") {
            cfg.db_max_connections = n.max(1);
        }
        if let Ok(host) = std::env::var("APP_HOST") {
            cfg.host = host;
        }
        if let Ok(port) = std::env::var("APP_PORT") {
            cfg.port = port.parse()?;
        }

        match std::env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => cfg.jwt.secret = secret,
            _ => warn!("JWT_SECRET not set; tokens will not survive a restart"),
        }
        if let Ok(issuer) = std::env::var("JWT_ISSUER") {
            cfg.jwt.issuer = issuer;
        }
        if let Ok(audience) = std::env::var("JWT_AUDIENCE") {
            cfg.jwt.audience = audience;
        }
        if let Some(ttl) = parsed_var::<i64>("JWT_TTL_MINUTES") {
            if !(1..=MAX_TTL_MINUTES).contains(&ttl) {
                warn!(ttl, max = MAX_TTL_MINUTES, "JWT_TTL_MINUTES out of range; clamping");
            }
            cfg.jwt.ttl_minutes = ttl.clamp(1, MAX_TTL_MINUTES);
        }

        if let Ok(username) = std::env::var("ADMIN_USER") {
            cfg.admin.username = username.trim().to_string();
        }
        match std::env::var("ADMIN_PASSWORD") {
            Ok(password) if !password.is_empty() => cfg.admin.password = password,
            _ => warn!("ADMIN_PASSWORD not set; using the default admin password"),
        }
        if let Ok(full_name) = std::env::var("ADMIN_FULL_NAME") {
            cfg.admin.full_name = full_name;
        }
        if let Ok(locale) = std::env::var("APP_LOCALE") {
            cfg.locale = locale;
        }

        Ok(cfg)
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }
}

fn parsed_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}

fn random_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(48)
        .map(char::from)
        .collect()
}
