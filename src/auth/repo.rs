use anyhow::Context;
use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::auth::repo_types::{Role, User};

const USER_COLUMNS: &str = "id, username, full_name, hashed_password, role";

impl User {
    pub async fn find_by_username(db: &SqlitePool, username: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?1"
        ))
        .bind(username)
        .fetch_optional(db)
        .await
        .context("find user by username")?;
        Ok(user)
    }

    pub async fn find_by_id(db: &SqlitePool, id: i64) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await
        .context("find user by id")?;
        Ok(user)
    }

    pub async fn create(
        db: &SqlitePool,
        username: &str,
        full_name: Option<&str>,
        hashed_password: &str,
        role: Role,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, full_name, hashed_password, role)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(username)
        .bind(full_name)
        .bind(hashed_password)
        .bind(role)
        .fetch_one(db)
        .await
        .context("insert user")?;
        Ok(user)
    }

    pub async fn list_all(db: &SqlitePool) -> anyhow::Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id ASC"
        ))
        .fetch_all(db)
        .await
        .context("list users")?;
        Ok(users)
    }

    pub async fn count(db: &SqlitePool) -> anyhow::Result<i64> {
        let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(db)
            .await
            .context("count users")?;
        Ok(n)
    }

    pub async fn set_password(db: &SqlitePool, id: i64, hashed_password: &str) -> anyhow::Result<()> {
        sqlx::query("UPDATE users SET hashed_password = ?1 WHERE id = ?2")
            .bind(hashed_password)
            .bind(id)
            .execute(db)
            .await
            .context("update password")?;
        Ok(())
    }

    /// Returns `None` when no such user exists.
    pub async fn set_role(db: &SqlitePool, id: i64, role: Role) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET role = ?1 WHERE id = ?2 RETURNING {USER_COLUMNS}"
        ))
        .bind(role)
        .bind(id)
        .fetch_optional(db)
        .await
        .context("update role")?;
        Ok(user)
    }

    /// Deletes the user; their work entries go with them (`ON DELETE CASCADE`).
    pub async fn delete(db: &SqlitePool, id: i64) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM users WHERE id = ?1")
            .bind(id)
            .execute(db)
            .await
            .context("delete user")?;
        Ok(res.rows_affected() > 0)
    }

    /// Insert-or-update keyed by username, used by admin reconciliation and seeding.
    pub async fn upsert_tx(
        tx: &mut Transaction<'_, Sqlite>,
        username: &str,
        full_name: Option<&str>,
        hashed_password: &str,
        role: Role,
    ) -> anyhow::Result<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, full_name, hashed_password, role)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (username) DO UPDATE
               SET hashed_password = excluded.hashed_password,
                   role = excluded.role,
                   full_name = COALESCE(users.full_name, excluded.full_name)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(username)
        .bind(full_name)
        .bind(hashed_password)
        .bind(role)
        .fetch_one(&mut **tx)
        .await
        .context("upsert user")?;
        Ok(user)
    }
}
