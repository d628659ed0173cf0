use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Arc, RwLock};

use chrono::{Duration, NaiveDateTime, Utc};
use rand::{Rng, distr::Alphanumeric};
use sqlx::{Pool, Sqlite};
use tracing::{info, instrument};

use crate::error::AppError;

const TOKEN_LENGTH: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user_id: i64,
    pub created_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
}

impl Session {
    pub fn new(user_id: i64, ttl: Duration) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            token: generate_token(),
            user_id,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.expires_at > Utc::now().naive_utc()
    }
}

/// Random opaque token, independent of the user's credentials.
pub fn generate_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

#[rocket::async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, token: &str) -> Result<Option<Session>, AppError>;

    async fn put(&self, session: Session) -> Result<(), AppError>;

    async fn delete(&self, token: &str) -> Result<(), AppError>;

    /// Removes every expired session and returns how many were dropped.
    async fn purge_expired(&self) -> Result<u64, AppError>;
}

pub type Sessions = Arc<dyn SessionStore>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionBackend {
    Memory,
    Sqlite,
}

impl SessionBackend {
    pub fn build(&self, pool: &Pool<Sqlite>) -> Sessions {
        match self {
            SessionBackend::Memory => Arc::new(MemorySessionStore::default()),
            SessionBackend::Sqlite => Arc::new(SqliteSessionStore::new(pool.clone())),
        }
    }
}

impl FromStr for SessionBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(SessionBackend::Memory),
            "sqlite" => Ok(SessionBackend::Sqlite),
            other => Err(anyhow::anyhow!("Unknown session backend: {}", other)),
        }
    }
}

/// Process-lifetime store; all sessions are lost on restart.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

fn poisoned<T>(_: T) -> AppError {
    AppError::Internal("Session store lock poisoned".to_string())
}

#[rocket::async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, token: &str) -> Result<Option<Session>, AppError> {
        let sessions = self.sessions.read().map_err(poisoned)?;
        Ok(sessions.get(token).cloned())
    }

    async fn put(&self, session: Session) -> Result<(), AppError> {
        let mut sessions = self.sessions.write().map_err(poisoned)?;
        sessions.insert(session.token.clone(), session);
        Ok(())
    }

    async fn delete(&self, token: &str) -> Result<(), AppError> {
        let mut sessions = self.sessions.write().map_err(poisoned)?;
        sessions.remove(token);
        Ok(())
    }

    async fn purge_expired(&self) -> Result<u64, AppError> {
        let mut sessions = self.sessions.write().map_err(poisoned)?;
        let before = sessions.len();
        sessions.retain(|_, session| session.is_valid());
        Ok((before - sessions.len()) as u64)
    }
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbUserSession {
    pub token: Option<String>,
    pub user_id: Option<i64>,
    pub created_at: Option<NaiveDateTime>,
    pub expires_at: Option<NaiveDateTime>,
}

impl From<DbUserSession> for Session {
    fn from(row: DbUserSession) -> Self {
        Self {
            token: row.token.unwrap_or_default(),
            user_id: row.user_id.unwrap_or_default(),
            created_at: row.created_at.unwrap_or_default(),
            expires_at: row.expires_at.unwrap_or_default(),
        }
    }
}

/// Sessions kept in the `user_sessions` table, surviving restarts.
pub struct SqliteSessionStore {
    pool: Pool<Sqlite>,
}

impl SqliteSessionStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[rocket::async_trait]
impl SessionStore for SqliteSessionStore {
    #[instrument(skip_all)]
    async fn get(&self, token: &str) -> Result<Option<Session>, AppError> {
        info!("Getting session by token");
        let row = sqlx::query_as::<_, DbUserSession>(
            "SELECT token, user_id, created_at, expires_at FROM user_sessions WHERE token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Session::from))
    }

    #[instrument(skip_all, fields(user_id = session.user_id))]
    async fn put(&self, session: Session) -> Result<(), AppError> {
        info!("Creating user session");
        sqlx::query(
            "INSERT INTO user_sessions (user_id, token, created_at, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(session.user_id)
        .bind(&session.token)
        .bind(session.created_at)
        .bind(session.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[instrument(skip_all)]
    async fn delete(&self, token: &str) -> Result<(), AppError> {
        info!("Invalidating session");
        sqlx::query("DELETE FROM user_sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn purge_expired(&self) -> Result<u64, AppError> {
        info!("Cleaning expired sessions");
        let now = Utc::now().naive_utc();

        let result = sqlx::query("DELETE FROM user_sessions WHERE expires_at < ?")
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
