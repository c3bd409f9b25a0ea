use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

/// Durable client-local credential storage. The session transport is
/// cookie-based; tokens stored here exist only for the legacy non-cookie
/// path and are written and deleted by the auth client, never read back
/// into a request.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn store_token(&self, name: &str, token: &str) -> Result<()>;
    async fn load_token(&self, name: &str) -> Result<Option<String>>;
    async fn load_token_record(&self, name: &str) -> Result<Option<StoredToken>>;
    async fn clear_token(&self, name: &str) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredToken {
    pub name: String,
    pub token: String,
    pub stored_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        let storage = Self { pool };
        storage.ensure_tokens_table().await?;
        Ok(storage)
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    async fn ensure_tokens_table(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS auth_tokens (
                name      TEXT NOT NULL PRIMARY KEY,
                token     TEXT NOT NULL,
                stored_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("failed to ensure auth_tokens table exists")?;
        Ok(())
    }
}

#[async_trait]
impl TokenStore for Storage {
    async fn store_token(&self, name: &str, token: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO auth_tokens (name, token, stored_at) VALUES (?, ?, ?)
             ON CONFLICT(name) DO UPDATE SET token=excluded.token, stored_at=excluded.stored_at",
        )
        .bind(name)
        .bind(token)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to store token {name}"))?;
        Ok(())
    }

    async fn load_token(&self, name: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT token FROM auth_tokens WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get::<String, _>(0)))
    }

    async fn load_token_record(&self, name: &str) -> Result<Option<StoredToken>> {
        let row = sqlx::query("SELECT name, token, stored_at FROM auth_tokens WHERE name = ?")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| StoredToken {
            name: r.get("name"),
            token: r.get("token"),
            stored_at: r.get("stored_at"),
        }))
    }

    async fn clear_token(&self, name: &str) -> Result<()> {
        sqlx::query("DELETE FROM auth_tokens WHERE name = ?")
            .bind(name)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to clear token {name}"))?;
        Ok(())
    }
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path_from_url(database_url) else {
        return Ok(());
    };
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    Ok(())
}

fn sqlite_path_from_url(database_url: &str) -> Option<PathBuf> {
    let raw = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    if raw.is_empty() || raw == ":memory:" {
        return None;
    }
    Some(Path::new(raw).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
