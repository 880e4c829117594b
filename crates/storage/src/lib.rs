use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tokio::sync::RwLock;
use tracing::debug;

/// Keys of the single session namespace. The string forms match the
/// preference names the mobile client persisted, so an exported store can be
/// read back unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionKey {
    Token,
    Email,
    EmailVerified,
    ProfileSetup,
}

impl SessionKey {
    pub const ALL: [SessionKey; 4] = [
        SessionKey::Token,
        SessionKey::Email,
        SessionKey::EmailVerified,
        SessionKey::ProfileSetup,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SessionKey::Token => "jwt_token",
            SessionKey::Email => "user_email",
            SessionKey::EmailVerified => "email_verified",
            SessionKey::ProfileSetup => "profile_setup",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Session {
    pub token: Option<String>,
    pub email: Option<String>,
    pub email_verified: bool,
    pub profile_setup: bool,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.trim().is_empty())
    }
}

fn encode_flag(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

fn decode_flag(raw: Option<String>) -> bool {
    raw.is_some_and(|v| v == "true")
}

/// Durable key-value store holding the authenticated user's session.
///
/// Implementors only provide the raw string operations; the typed accessors
/// are shared.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, key: SessionKey) -> Result<Option<String>>;
    async fn set(&self, key: SessionKey, value: &str) -> Result<()>;
    async fn clear(&self) -> Result<()>;

    async fn token(&self) -> Result<Option<String>> {
        self.get(SessionKey::Token).await
    }

    async fn save_token(&self, token: &str) -> Result<()> {
        self.set(SessionKey::Token, token).await
    }

    async fn email(&self) -> Result<Option<String>> {
        self.get(SessionKey::Email).await
    }

    async fn save_email(&self, email: &str) -> Result<()> {
        self.set(SessionKey::Email, email).await
    }

    async fn is_email_verified(&self) -> Result<bool> {
        Ok(decode_flag(self.get(SessionKey::EmailVerified).await?))
    }

    async fn save_email_verified(&self, verified: bool) -> Result<()> {
        self.set(SessionKey::EmailVerified, encode_flag(verified))
            .await
    }

    async fn is_profile_setup(&self) -> Result<bool> {
        Ok(decode_flag(self.get(SessionKey::ProfileSetup).await?))
    }

    async fn save_profile_setup(&self, is_setup: bool) -> Result<()> {
        self.set(SessionKey::ProfileSetup, encode_flag(is_setup))
            .await
    }

    async fn load(&self) -> Result<Session> {
        Ok(Session {
            token: self.token().await?,
            email: self.email().await?,
            email_verified: self.is_email_verified().await?,
            profile_setup: self.is_profile_setup().await?,
        })
    }
}

#[derive(Clone)]
pub struct SqliteSessionStore {
    pool: Pool<Sqlite>,
}

impl SqliteSessionStore {
    pub async fn open(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("invalid session database url '{database_url}'"))?
            .create_if_missing(true);
        // Every in-memory connection is its own database.
        let max_connections = if is_memory_url(database_url) { 1 } else { 4 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(connect_options)
            .await
            .with_context(|| format!("failed to open session database '{database_url}'"))?;

        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
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

    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS session_entries (
                key        TEXT PRIMARY KEY NOT NULL,
                value      TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("failed to ensure session_entries table exists")?;
        Ok(())
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn get(&self, key: SessionKey) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM session_entries WHERE key = ?")
            .bind(key.as_str())
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("failed to read session key '{}'", key.as_str()))?;
        Ok(row.map(|r| r.get::<String, _>(0)))
    }

    async fn set(&self, key: SessionKey, value: &str) -> Result<()> {
        sqlx::query(
            "INSERT INTO session_entries (key, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key.as_str())
        .bind(value)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to write session key '{}'", key.as_str()))?;
        debug!(key = key.as_str(), "session entry saved");
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        sqlx::query("DELETE FROM session_entries")
            .execute(&self.pool)
            .await
            .context("failed to clear session entries")?;
        debug!("session cleared");
        Ok(())
    }
}

/// Non-durable store for tests and ephemeral runs.
#[derive(Default)]
pub struct InMemorySessionStore {
    entries: RwLock<HashMap<SessionKey, String>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn with_session(session: Session) -> Self {
        let store = Self::new();
        {
            let mut entries = store.entries.write().await;
            if let Some(token) = session.token {
                entries.insert(SessionKey::Token, token);
            }
            if let Some(email) = session.email {
                entries.insert(SessionKey::Email, email);
            }
            entries.insert(
                SessionKey::EmailVerified,
                encode_flag(session.email_verified).to_string(),
            );
            entries.insert(
                SessionKey::ProfileSetup,
                encode_flag(session.profile_setup).to_string(),
            );
        }
        store
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, key: SessionKey) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(&key).cloned())
    }

    async fn set(&self, key: SessionKey, value: &str) -> Result<()> {
        self.entries.write().await.insert(key, value.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.entries.write().await.clear();
        Ok(())
    }
}

fn is_memory_url(database_url: &str) -> bool {
    database_url.starts_with("sqlite::memory:") || database_url.contains("mode=memory")
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    if parent.as_os_str().is_empty() {
        return Ok(());
    }

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if is_memory_url(database_url) || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
