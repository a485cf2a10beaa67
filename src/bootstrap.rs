//! Start-up wiring

use std::sync::Arc;

use anyhow::Context;
use config_core::{init_tracing, AppConfig};
use crypto_core::{JwtManager, TokenVerifier};
use db_pool::{create_pool, HealthCheck};
use redis_utils::RedisPool;
use serde::de::DeserializeOwned;
use sqlx::PgPool;
use tonic::transport::Channel;

/// Loaded configuration plus the process-wide token manager
#[derive(Clone)]
pub struct Toolbox {
    pub config: AppConfig,
    pub jwt: Arc<JwtManager>,
}

/// Connected backends
#[derive(Clone)]
pub struct Backends {
    pub postgres: PgPool,
    pub redis: RedisPool,
}

impl Toolbox {
    /// Load `AppConfig` from the environment, install the tracing
    /// subscriber and build the token manager
    pub fn from_env() -> anyhow::Result<Self> {
        let config = AppConfig::from_env().context("Failed to load configuration")?;
        init_tracing(&config.log).context("Failed to initialize logging")?;
        Self::new(config)
    }

    /// Build from an already-loaded configuration; does not touch logging
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let jwt = JwtManager::from_config(&config.jwt).context("Failed to build JWT manager")?;

        tracing::info!(
            service = %config.service.name,
            environment = %config.service.environment,
            algorithm = ?jwt.algorithm(),
            encrypted = jwt.is_encrypted(),
            "Toolbox initialized"
        );

        Ok(Self {
            config,
            jwt: Arc::new(jwt),
        })
    }

    /// The token manager as a verifier for middleware
    pub fn verifier<T: DeserializeOwned>(&self) -> Arc<dyn TokenVerifier<T>> {
        self.jwt.clone()
    }

    /// Connect to PostgreSQL and Redis
    pub async fn connect_backends(&self) -> anyhow::Result<Backends> {
        let postgres = create_pool(&self.config.postgres)
            .await
            .context("Failed to connect to PostgreSQL")?;
        let redis = RedisPool::connect(&self.config.redis)
            .await
            .context("Failed to connect to Redis")?;

        Ok(Backends { postgres, redis })
    }

    /// Lazily-connected channel to the configured gRPC upstream
    pub fn grpc_channel(&self) -> anyhow::Result<Channel> {
        grpc_auth::channel::connect_lazy(&self.config.grpc)
            .context("Failed to build gRPC channel")
    }
}

impl Backends {
    /// Round-trip both backends
    pub async fn health_check(&self) -> anyhow::Result<()> {
        self.postgres
            .health_check()
            .await
            .context("PostgreSQL health check failed")?;
        self.redis.ping().await.context("Redis health check failed")?;
        Ok(())
    }
}
