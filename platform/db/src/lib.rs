//! Database primitives shared by the server and the product crates.

use std::time::Duration;

use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};
use thiserror::Error;
use tracing::{debug, info};

/// Shared connection pool alias.
pub type DbPool = DatabaseConnection;

const DEFAULT_MAX_CONNECTIONS: u32 = 10;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("database url missing (set {0})")]
    MissingUrl(String),
    #[error("invalid {key}: {value}")]
    InvalidSetting { key: String, value: String },
    #[error(transparent)]
    Connect(#[from] DbErr),
}

pub type DbResult<T> = Result<T, DbError>;

/// Environment-driven connection settings.
#[derive(Clone, Debug)]
pub struct DatabaseSettings {
    env_key: String,
    url: Option<String>,
    max_connections: u32,
}

fn default_url_key() -> String {
    "DATABASE_URL".to_string()
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self::new(default_url_key())
    }
}

impl DatabaseSettings {
    pub fn new(env_key: impl Into<String>) -> Self {
        Self {
            env_key: env_key.into(),
            url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }

    /// Settings pinned to an explicit URL, bypassing the environment.
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Reads `DATABASE_URL` and `DATABASE_MAX_CONNECTIONS`.
    pub fn from_env() -> DbResult<Self> {
        let mut settings = Self::default();
        if let Ok(raw) = std::env::var("DATABASE_MAX_CONNECTIONS") {
            settings.max_connections = raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(DbError::InvalidSetting {
                    key: "DATABASE_MAX_CONNECTIONS".into(),
                    value: raw,
                })?;
        }
        Ok(settings)
    }

    pub fn database_url(&self) -> DbResult<String> {
        if let Some(url) = &self.url {
            return Ok(url.clone());
        }
        std::env::var(&self.env_key).map_err(|_| DbError::MissingUrl(self.env_key.clone()))
    }

    pub fn max_connections(&self) -> u32 {
        self.max_connections
    }
}

/// Open a pool using the given settings.
pub async fn connect(settings: &DatabaseSettings) -> DbResult<DbPool> {
    let url = settings.database_url()?;
    // Every connection to an in-memory SQLite database sees its own empty database.
    let max_connections = if url.starts_with("sqlite") && url.contains(":memory:") {
        1
    } else {
        settings.max_connections
    };
    let mut options = ConnectOptions::new(url);
    options
        .max_connections(max_connections)
        .connect_timeout(Duration::from_secs(10))
        .sqlx_logging(false);
    let pool = Database::connect(options).await?;
    info!(backend = ?pool.get_database_backend(), "database pool ready");
    Ok(pool)
}

/// Round-trip a trivial query; used by health checks.
pub async fn ping(pool: &DbPool) -> bool {
    let backend = pool.get_database_backend();
    match pool
        .execute(Statement::from_string(backend, "SELECT 1".to_string()))
        .await
    {
        Ok(_) => true,
        Err(err) => {
            debug!(error = %err, "database ping failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_url_wins_over_environment() {
        let settings = DatabaseSettings::with_url("sqlite::memory:");
        assert_eq!(settings.database_url().unwrap(), "sqlite::memory:");
        assert_eq!(settings.max_connections(), DEFAULT_MAX_CONNECTIONS);
    }

    #[test]
    fn missing_env_key_is_reported_by_name() {
        let settings = DatabaseSettings::new("EMPLOYEE_API_TEST_UNSET_URL");
        let err = settings.database_url().unwrap_err();
        assert!(matches!(err, DbError::MissingUrl(ref key) if key == "EMPLOYEE_API_TEST_UNSET_URL"));
    }

    #[tokio::test]
    async fn ping_succeeds_on_sqlite() {
        let pool = connect(&DatabaseSettings::with_url("sqlite::memory:"))
            .await
            .unwrap();
        assert!(ping(&pool).await);
    }
}
