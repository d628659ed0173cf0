use serde::Serialize;

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[derive(sqlx::FromRow, Clone)]
pub struct DbUser {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub email: Option<String>,
}

impl From<DbUser> for User {
    fn from(user: DbUser) -> Self {
        Self {
            id: user.id.unwrap_or_default(),
            name: user.name.unwrap_or_default(),
            email: user.email.unwrap_or_default(),
        }
    }
}

/// Row carrying the stored bcrypt hash; never leaves the account module.
#[derive(sqlx::FromRow)]
pub struct DbCredentials {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

impl From<DbCredentials> for User {
    fn from(row: DbCredentials) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
        }
    }
}
