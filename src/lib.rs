//! Service toolbox
//!
//! Re-exports the shared libraries under one roof and wires them together
//! for a typical service start-up: configuration, then logging, then token
//! handling and backend connections.
//!
//! ```rust,no_run
//! # async fn run() -> anyhow::Result<()> {
//! let toolbox = toolbox::Toolbox::from_env()?;
//! let backends = toolbox.connect_backends().await?;
//! # let _ = backends;
//! # Ok(())
//! # }
//! ```

mod bootstrap;

pub use bootstrap::{Backends, Toolbox};

pub use actix_middleware as http_auth;
pub use authorizer;
pub use common_utils as utils;
pub use config_core as config;
pub use crypto_core as jwt;
pub use db_pool;
pub use error_types as errors;
pub use grpc_auth;
pub use redis_utils;
