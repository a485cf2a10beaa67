//! Redis connection management
//!
//! Builds an auto-reconnecting [`ConnectionManager`] from [`RedisConfig`].
//! `ConnectionManager` is cheap to clone; hand a clone to each task.

use config_core::RedisConfig;
use error_types::{ErrorKind, ServiceError, ServiceResult};
use redis::aio::ConnectionManager;
use redis::{Client, ConnectionAddr, ConnectionInfo, IntoConnectionInfo, RedisError};
use secrecy::ExposeSecret;
use tracing::{error, info};

/// Subsystem label used on every error raised here
pub const SYSTEM: &str = "redis";

/// Build the address, credentials and database from configuration
///
/// Credentials are copied verbatim and never pass through a URL.
pub fn connection_info(config: &RedisConfig) -> ServiceResult<ConnectionInfo> {
    let mut info = if config.tls {
        // TLS parameters are feature-gated inside redis; let it build the address
        format!("rediss://{}:{}", config.host, config.port)
            .into_connection_info()
            .map_err(|e| ServiceError::wrap(ErrorKind::InvalidArgument, SYSTEM, e))?
    } else {
        ConnectionInfo {
            addr: ConnectionAddr::Tcp(config.host.clone(), config.port),
            redis: Default::default(),
        }
    };

    info.redis.db = config.db;
    info.redis.username = config.username.clone();
    info.redis.password = config.password.as_ref().map(|p| p.expose_secret().to_string());
    Ok(info)
}

/// Classify a Redis client error
pub fn map_cache_error(error: RedisError) -> ServiceError {
    let kind = if error.is_timeout() {
        ErrorKind::Timeout
    } else if error.kind() == redis::ErrorKind::TypeError {
        ErrorKind::Serialization
    } else {
        ErrorKind::CacheConnection
    };
    ServiceError::wrap(kind, SYSTEM, error)
}

/// Redis connection pool
#[derive(Clone)]
pub struct RedisPool {
    manager: ConnectionManager,
}

impl RedisPool {
    /// Connect, giving up after the configured connect timeout
    pub async fn connect(config: &RedisConfig) -> ServiceResult<Self> {
        let info = connection_info(config)?;
        let client = Client::open(info).map_err(map_cache_error)?;

        let manager = tokio::time::timeout(config.connect_timeout(), ConnectionManager::new(client))
            .await
            .map_err(|_| {
                error!(
                    host = %config.host,
                    timeout_secs = config.connect_timeout_secs,
                    "Redis connection timeout"
                );
                ServiceError::new(ErrorKind::CacheConnection, SYSTEM, "Redis connection timeout")
            })?
            .map_err(|e| {
                error!(host = %config.host, error = %e, "Failed to initialize Redis connection manager");
                map_cache_error(e)
            })?;

        info!(host = %config.host, port = config.port, db = config.db, "Redis connected");
        Ok(Self { manager })
    }

    /// Connection handle for issuing commands
    pub fn manager(&self) -> ConnectionManager {
        self.manager.clone()
    }

    /// Round-trip a `PING`
    pub async fn ping(&self) -> ServiceResult<()> {
        let mut conn = self.manager.clone();
        let reply: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(map_cache_error)?;

        if reply == "PONG" {
            Ok(())
        } else {
            Err(ServiceError::new(
                ErrorKind::CacheConnection,
                SYSTEM,
                format!("unexpected PING reply: {reply}"),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config_core::{vars, EnvConfig};

    #[test]
    fn test_connection_info_defaults() {
        let info = connection_info(&RedisConfig::default()).unwrap();

        assert!(matches!(&info.addr, ConnectionAddr::Tcp(host, 6379) if host == "localhost"));
        assert_eq!(info.redis.db, 0);
        assert!(info.redis.password.is_none());
    }

    #[test]
    fn test_connection_info_with_auth() {
        let config = RedisConfig::from_iter(vars([
            ("REDIS_HOST", "cache.internal"),
            ("REDIS_PORT", "6380"),
            ("REDIS_USERNAME", "svc"),
            ("REDIS_PASSWORD", "pw"),
            ("REDIS_DB", "4"),
        ]))
        .unwrap();
        let info = connection_info(&config).unwrap();

        assert!(matches!(&info.addr, ConnectionAddr::Tcp(host, 6380) if host == "cache.internal"));
        assert_eq!(info.redis.db, 4);
        assert_eq!(info.redis.username.as_deref(), Some("svc"));
        assert_eq!(info.redis.password.as_deref(), Some("pw"));
    }

    #[test]
    fn test_connection_info_keeps_reserved_characters_in_password() {
        let config = RedisConfig::from_iter(vars([
            ("REDIS_HOST", "cache.internal"),
            ("REDIS_USERNAME", "svc@ops"),
            ("REDIS_PASSWORD", "p@ss/w#rd"),
        ]))
        .unwrap();
        let info = connection_info(&config).unwrap();

        assert!(matches!(&info.addr, ConnectionAddr::Tcp(host, 6379) if host == "cache.internal"));
        assert_eq!(info.redis.db, 0);
        assert_eq!(info.redis.username.as_deref(), Some("svc@ops"));
        assert_eq!(info.redis.password.as_deref(), Some("p@ss/w#rd"));
    }

    #[test]
    fn test_error_classification() {
        let io = RedisError::from(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "refused",
        ));
        assert_eq!(map_cache_error(io).kind(), ErrorKind::CacheConnection);

        let ty = RedisError::from((redis::ErrorKind::TypeError, "not a string"));
        assert_eq!(map_cache_error(ty).kind(), ErrorKind::Serialization);
    }
}
