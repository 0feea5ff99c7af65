use chrono::{DateTime, Duration, Utc};
use libsql::Connection;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

pub const USER_COLUMNS: &str = "id, email, first_name, last_name, created_at, updated_at";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("credentials taken")]
    CredentialsTaken,
    #[error("credentials incorrect")]
    CredentialsIncorrect,
    #[error("{0}")]
    Internal(String),
    #[error(transparent)]
    Database(#[from] libsql::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i32,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

pub fn row_to_user(row: &libsql::Row) -> Result<User, libsql::Error> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

fn timestamp(t: DateTime<Utc>) -> String {
    // Same shape as sqlite's strftime('%Y-%m-%dT%H:%M:%fZ', 'now'), so
    // expiry comparisons work lexicographically.
    t.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

fn sha256_hex(parts: &[&[u8]]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part);
    }
    hex::encode(hasher.finalize())
}

pub struct Auth<'a> {
    conn: &'a Connection,
    session_ttl: Duration,
}

impl<'a> Auth<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self::with_session_ttl(conn, DEFAULT_SESSION_TTL_HOURS)
    }

    pub fn with_session_ttl(conn: &'a Connection, hours: i64) -> Self {
        Self {
            conn,
            session_ttl: Duration::hours(hours),
        }
    }

    fn hash_password(salt: &str, password: &str) -> String {
        sha256_hex(&[salt.as_bytes(), password.as_bytes()])
    }

    fn hash_token(token: &str) -> String {
        sha256_hex(&[token.as_bytes()])
    }

    pub async fn signup(&self, input: Credentials) -> Result<User, AuthError> {
        let mut existing = self
            .conn
            .query("SELECT 1 FROM users WHERE email = ?", libsql::params![input.email.clone()])
            .await?;
        if existing.next().await?.is_some() {
            return Err(AuthError::CredentialsTaken);
        }

        let salt = Uuid::new_v4().simple().to_string();
        let password_hash = Self::hash_password(&salt, &input.password);

        let query = format!(
            r#"
            INSERT INTO users (email, password_hash, salt)
            VALUES (?, ?, ?)
            RETURNING {USER_COLUMNS}
        "#
        );

        let mut rows = match self
            .conn
            .query(&query, libsql::params![input.email, password_hash, salt])
            .await
        {
            Ok(rows) => rows,
            // Lost the race against a concurrent signup for the same email.
            Err(e) if e.to_string().contains("UNIQUE constraint failed") => {
                return Err(AuthError::CredentialsTaken);
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(row) = rows.next().await? {
            Ok(row_to_user(&row)?)
        } else {
            Err(AuthError::Internal("insert returned no row".to_string()))
        }
    }

    /// Verifies the credentials and opens a new session, returning the raw
    /// bearer token. Unknown email and wrong password are indistinguishable.
    pub async fn signin(&self, input: Credentials) -> Result<String, AuthError> {
        let mut rows = self
            .conn
            .query(
                "SELECT id, password_hash, salt FROM users WHERE email = ?",
                libsql::params![input.email],
            )
            .await?;

        let row = match rows.next().await? {
            Some(row) => row,
            None => return Err(AuthError::CredentialsIncorrect),
        };

        let user_id: i32 = row.get(0)?;
        let password_hash: String = row.get(1)?;
        let salt: String = row.get(2)?;

        if Self::hash_password(&salt, &input.password) != password_hash {
            return Err(AuthError::CredentialsIncorrect);
        }

        self.create_session(user_id).await
    }

    async fn create_session(&self, user_id: i32) -> Result<String, AuthError> {
        let token = Uuid::new_v4().simple().to_string();
        let token_hash = Self::hash_token(&token);
        let expires_at = timestamp(Utc::now() + self.session_ttl);

        self.conn
            .execute(
                "INSERT INTO sessions (user_id, token_hash, expires_at) VALUES (?, ?, ?)",
                libsql::params![user_id, token_hash, expires_at],
            )
            .await?;

        Ok(token)
    }

    /// Resolves a bearer token to its user. Returns None for unknown and
    /// expired tokens alike.
    pub async fn resolve_token(&self, token: &str) -> Result<Option<User>, AuthError> {
        let query = r#"
            SELECT users.id, users.email, users.first_name, users.last_name,
                   users.created_at, users.updated_at
            FROM sessions
            JOIN users ON users.id = sessions.user_id
            WHERE sessions.token_hash = ? AND sessions.expires_at > ?
        "#;

        let token_hash = Self::hash_token(token);
        let now = timestamp(Utc::now());

        let mut rows = self
            .conn
            .query(query, libsql::params![token_hash, now])
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(row_to_user(&row)?))
        } else {
            Ok(None)
        }
    }

    pub async fn purge_expired_sessions(&self) -> Result<u64, AuthError> {
        let now = timestamp(Utc::now());
        let deleted = self
            .conn
            .execute("DELETE FROM sessions WHERE expires_at <= ?", libsql::params![now])
            .await?;
        Ok(deleted)
    }
}
