use chrono::Duration;
use sqlx::{Pool, Sqlite};
use tracing::{info, instrument};

use crate::auth::{DbCredentials, DbUser, Session, SessionStore, User};
use crate::error::{AppError, is_unique_violation};

/// Token handed back on successful register or login.
#[derive(Debug, Clone)]
pub struct SessionGrant {
    pub token: String,
    pub user: User,
}

async fn open_session(
    sessions: &dyn SessionStore,
    user: User,
    ttl: Duration,
) -> Result<SessionGrant, AppError> {
    let session = Session::new(user.id, ttl);
    let token = session.token.clone();
    sessions.put(session).await?;

    Ok(SessionGrant { token, user })
}

#[instrument(skip(pool, sessions, password, ttl))]
pub async fn register(
    pool: &Pool<Sqlite>,
    sessions: &dyn SessionStore,
    name: &str,
    email: &str,
    password: &str,
    ttl: Duration,
) -> Result<SessionGrant, AppError> {
    info!("Registering new user");

    let hashed_password = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;

    let mut tx = pool.begin().await?;

    let existing = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(&mut *tx)
        .await?;

    if existing.is_some() {
        return Err(AppError::DuplicateEmail(email.to_string()));
    }

    let res = sqlx::query("INSERT INTO users (name, email, password_hash) VALUES (?, ?, ?)")
        .bind(name)
        .bind(email)
        .bind(&hashed_password)
        .execute(&mut *tx)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                AppError::DuplicateEmail(email.to_string())
            } else {
                AppError::from(err)
            }
        })?;

    tx.commit().await?;

    let user = User {
        id: res.last_insert_rowid(),
        name: name.to_string(),
        email: email.to_string(),
    };

    open_session(sessions, user, ttl).await
}

#[instrument(skip(pool, sessions, password, ttl))]
pub async fn login(
    pool: &Pool<Sqlite>,
    sessions: &dyn SessionStore,
    email: &str,
    password: &str,
    ttl: Duration,
) -> Result<SessionGrant, AppError> {
    info!("Authenticating user");

    let row = sqlx::query_as::<_, DbCredentials>(
        "SELECT id, name, email, password_hash FROM users WHERE email = ?",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    let Some(row) = row else {
        return Err(AppError::InvalidCredentials);
    };

    if !bcrypt::verify(password, &row.password_hash).unwrap_or(false) {
        return Err(AppError::InvalidCredentials);
    }

    open_session(sessions, User::from(row), ttl).await
}

#[instrument(skip_all)]
pub async fn resolve_token(
    pool: &Pool<Sqlite>,
    sessions: &dyn SessionStore,
    token: &str,
) -> Result<User, AppError> {
    let session = sessions
        .get(token)
        .await?
        .ok_or_else(|| AppError::Authorization("Invalid or expired token".to_string()))?;

    if !session.is_valid() {
        sessions.delete(token).await?;
        return Err(AppError::Authorization("Invalid or expired token".to_string()));
    }

    let user = sqlx::query_as::<_, DbUser>("SELECT id, name, email FROM users WHERE id = ?")
        .bind(session.user_id)
        .fetch_optional(pool)
        .await?;

    match user {
        Some(user) => Ok(User::from(user)),
        _ => Err(AppError::Authorization("User not found".to_string())),
    }
}

#[instrument(skip_all)]
pub async fn logout(sessions: &dyn SessionStore, token: &str) -> Result<(), AppError> {
    info!("Logging out");
    sessions.delete(token).await
}
