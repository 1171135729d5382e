use sqlx::SqlitePool;
use tracing::info;

use crate::{
    auth::{
        password::hash_password,
        repo_types::{Role, User},
    },
    config::AdminSeed,
};

/// Brings the configured admin account to the configured state: created if
/// missing, password reset to the configured secret, role forced to admin.
/// Safe to run any number of times.
pub async fn reconcile_admin(db: &SqlitePool, seed: &AdminSeed) -> anyhow::Result<User> {
    let username = seed.username.trim();
    anyhow::ensure!(!username.is_empty(), "admin username must not be empty");
    anyhow::ensure!(!seed.password.is_empty(), "admin password must not be empty");

    let hash = hash_password(&seed.password)?;
    let full_name = Some(seed.full_name.as_str()).filter(|n| !n.trim().is_empty());

    let mut tx = db.begin().await?;
    let user = User::upsert_tx(&mut tx, username, full_name, &hash, Role::Admin).await?;
    tx.commit().await?;

    info!(user_id = user.id, %username, "admin account reconciled");
    Ok(user)
}
