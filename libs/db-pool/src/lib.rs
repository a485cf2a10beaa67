//! Database connection pool management
//!
//! Builds a PostgreSQL pool from [`PostgresConfig`] and maps driver failures
//! onto the shared error taxonomy.

mod metrics;

pub use metrics::{log_pool_stats, pool_stats, PoolStats};

use async_trait::async_trait;
use config_core::{PostgresConfig, SslMode};
use error_types::{ErrorKind, ServiceError, ServiceResult};
use secrecy::ExposeSecret;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgSslMode};
use tracing::{debug, error, info};

/// Subsystem label used on every error raised here
pub const SYSTEM: &str = "postgres";

/// Connection options (host, credentials, TLS) from configuration
pub fn connect_options(config: &PostgresConfig) -> PgConnectOptions {
    let options = PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .database(&config.database)
        .username(&config.user)
        .ssl_mode(ssl_mode(config.sslmode));

    match &config.password {
        Some(password) => options.password(password.expose_secret()),
        None => options,
    }
}

fn ssl_mode(mode: SslMode) -> PgSslMode {
    match mode {
        SslMode::Disable => PgSslMode::Disable,
        SslMode::Prefer => PgSslMode::Prefer,
        SslMode::Require => PgSslMode::Require,
        SslMode::VerifyCa => PgSslMode::VerifyCa,
        SslMode::VerifyFull => PgSslMode::VerifyFull,
    }
}

/// Pool sizing and timeouts from configuration
pub fn pool_options(config: &PostgresConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        // Timeout for acquiring a connection from the pool
        .acquire_timeout(config.acquire_timeout())
        // Close connections idle for longer than this
        .idle_timeout(config.idle_timeout())
        // Maximum lifetime of a connection (to handle stale connections)
        .max_lifetime(config.max_lifetime())
        // Test connections before returning them from the pool
        .test_before_acquire(true)
}

/// Create a PostgreSQL connection pool and verify it with `SELECT 1`
pub async fn create_pool(config: &PostgresConfig) -> ServiceResult<PgPool> {
    debug!(
        host = %config.host,
        database = %config.database,
        max = config.max_connections,
        min = config.min_connections,
        "Creating database pool"
    );

    let pool = pool_options(config)
        .connect_with(connect_options(config))
        .await
        .map_err(|e| {
            error!(host = %config.host, error = %e, "Database connection failed");
            connection_error(e)
        })?;

    // Verify connection with connect timeout
    match tokio::time::timeout(config.connect_timeout(), pool.health_check()).await {
        Ok(Ok(())) => {
            info!(
                host = %config.host,
                database = %config.database,
                "Database pool created and verified successfully"
            );
            log_pool_stats(&pool);
            Ok(pool)
        }
        Ok(Err(e)) => {
            error!(error = %e, "Database connection verification failed");
            Err(e)
        }
        Err(_) => {
            error!(
                timeout_secs = config.connect_timeout_secs,
                "Database connection verification timeout"
            );
            Err(ServiceError::new(
                ErrorKind::DbConnection,
                SYSTEM,
                "Database verification timeout",
            ))
        }
    }
}

/// Wrap a failure to reach the database
pub fn connection_error(error: sqlx::Error) -> ServiceError {
    ServiceError::wrap(ErrorKind::DbConnection, SYSTEM, error)
}

/// Classify any `sqlx` error
pub fn map_db_error(error: sqlx::Error) -> ServiceError {
    use sqlx::error::ErrorKind as DbKind;

    let kind = match &error {
        sqlx::Error::RowNotFound => ErrorKind::NotFound,
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Configuration(_) => ErrorKind::DbConnection,
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => ErrorKind::Serialization,
        sqlx::Error::Database(db) => match db.kind() {
            DbKind::UniqueViolation => ErrorKind::AlreadyExists,
            DbKind::ForeignKeyViolation | DbKind::NotNullViolation | DbKind::CheckViolation => {
                ErrorKind::PreconditionFailed
            }
            _ => ErrorKind::DbQuery,
        },
        _ => ErrorKind::DbQuery,
    };
    ServiceError::wrap(kind, SYSTEM, error)
}

/// A dependency that can report whether it is reachable
#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn health_check(&self) -> ServiceResult<()>;
}

#[async_trait]
impl HealthCheck for PgPool {
    async fn health_check(&self) -> ServiceResult<()> {
        sqlx::query("SELECT 1")
            .execute(self)
            .await
            .map(|_| ())
            .map_err(connection_error)
    }
}
