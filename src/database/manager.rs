use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};
use thiserror::Error;
use tracing::{info, log::LevelFilter};

use crate::config::DatabaseConfig;

/// Postgres SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
                let constraint = db_err.constraint().unwrap_or("unknown").to_string();
                return DatabaseError::UniqueViolation(constraint);
            }
        }
        if matches!(
            err,
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_)
        ) {
            return DatabaseError::ConnectionError(err.to_string());
        }
        DatabaseError::Sqlx(err)
    }
}

impl DatabaseError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, DatabaseError::UniqueViolation(_))
    }
}

/// Schema bootstrap, applied in order. Every statement is idempotent.
const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        username VARCHAR(50) NOT NULL UNIQUE,
        password_hash VARCHAR(255) NOT NULL,
        phone VARCHAR(20) NOT NULL UNIQUE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )"#,
    r#"CREATE TABLE IF NOT EXISTS families (
        id BIGSERIAL PRIMARY KEY,
        name VARCHAR(100) NOT NULL,
        join_password VARCHAR(100) NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )"#,
    r#"CREATE TABLE IF NOT EXISTS family_users (
        user_id BIGINT NOT NULL REFERENCES users (id),
        family_id BIGINT NOT NULL REFERENCES families (id),
        role VARCHAR(20) NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        PRIMARY KEY (user_id, family_id)
    )"#,
    r#"CREATE TABLE IF NOT EXISTS bills (
        id BIGSERIAL PRIMARY KEY,
        family_id BIGINT NOT NULL REFERENCES families (id),
        bill_date TIMESTAMP NOT NULL,
        bill_type VARCHAR(16) NOT NULL CHECK (bill_type IN ('income', 'expense')),
        amount BIGINT NOT NULL CHECK (amount > 0),
        category VARCHAR(100) NOT NULL,
        description VARCHAR(255) NOT NULL DEFAULT '',
        object VARCHAR(100) NOT NULL,
        username VARCHAR(100) NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )"#,
    "CREATE INDEX IF NOT EXISTS bills_family_id_idx ON bills (family_id)",
    "CREATE INDEX IF NOT EXISTS family_users_family_id_idx ON family_users (family_id)",
];

/// Builds and maintains the Postgres pool shared by every repository
pub struct DatabaseManager;

impl DatabaseManager {
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        if config.url.trim().is_empty() {
            return Err(DatabaseError::ConfigMissing("DATABASE_URL"));
        }

        let mut options: PgConnectOptions = config
            .url
            .parse()
            .map_err(|_| DatabaseError::InvalidDatabaseUrl)?;

        options = if config.enable_query_logging {
            options.log_statements(LevelFilter::Debug)
        } else {
            options.disable_statement_logging()
        };
        options = options.log_slow_statements(
            LevelFilter::Warn,
            Duration::from_millis(config.slow_query_threshold_ms),
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect_with(options)
            .await
            .map_err(|e| DatabaseError::ConnectionError(e.to_string()))?;

        info!(
            "Created database pool (max_connections={})",
            config.max_connections
        );
        Ok(pool)
    }

    /// Creates missing tables and indexes
    pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(pool).await?;
        }
        info!("Schema is up to date ({} statements applied)", SCHEMA.len());
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(pool).await?;
        Ok(())
    }
}
