use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;

use crate::db::models::User;
use crate::error::{AppError, DatabaseError};
use crate::Result;

const CREATE_USERS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT UNIQUE NOT NULL,
        email TEXT UNIQUE NOT NULL,
        password_hash TEXT NOT NULL
    )
"#;

/// Storage operations the account service depends on.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a new account and returns its id. Fails with
    /// `DatabaseError::Duplicate` when the username or email is taken.
    async fn create_user(&self, username: &str, email: &str, password_hash: &str) -> Result<i64>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>>;

    async fn count_users(&self) -> Result<i64>;
}

/// SQLite-backed `UserStore`.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: Arc<SqlitePool>,
}

impl UserRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    /// Opens a pool on `url`, creating the database file if needed.
    ///
    /// Idle connections are never reaped so that an in-memory database
    /// lives as long as the pool does.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| AppError::DatabaseError(DatabaseError::ConnectionError(e.to_string())))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| AppError::DatabaseError(DatabaseError::ConnectionError(e.to_string())))?;

        Ok(Self::new(Arc::new(pool)))
    }

    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query(CREATE_USERS_TABLE)
            .execute(self.pool.as_ref())
            .await?;

        info!("Users table ready");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        self.pool.as_ref()
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn create_user(&self, username: &str, email: &str, password_hash: &str) -> Result<i64> {
        let result = sqlx::query(
            "INSERT INTO users (username, email, password_hash) VALUES (?, ?, ?)",
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, password_hash FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, password_hash FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(user)
    }

    async fn count_users(&self) -> Result<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }
}
