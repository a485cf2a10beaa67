//! Outbound gRPC channels from `GRPC_*` configuration

use config_core::GrpcConfig;
use error_types::{ErrorKind, ServiceError, ServiceResult};
use tonic::codegen::InterceptedService;
use tonic::transport::{Certificate, Channel, ClientTlsConfig, Endpoint};
use tracing::{error, info};

use crate::JwtClientInterceptor;

const SYSTEM: &str = "grpc";

/// Endpoint with timeouts, keepalive and TLS applied
///
/// A `keepalive_secs` of zero disables HTTP/2 keepalive pings.
pub fn endpoint(config: &GrpcConfig) -> ServiceResult<Endpoint> {
    let mut endpoint = Endpoint::from_shared(config.uri())
        .map_err(|e| ServiceError::wrap(ErrorKind::InvalidArgument, SYSTEM, e))?
        .connect_timeout(config.connect_timeout())
        .timeout(config.request_timeout());

    if config.keepalive_secs > 0 {
        endpoint = endpoint
            .http2_keep_alive_interval(config.keepalive_interval())
            .keep_alive_while_idle(true);
    }

    if config.tls {
        endpoint = endpoint
            .tls_config(tls_config(config)?)
            .map_err(|e| ServiceError::wrap(ErrorKind::Internal, SYSTEM, e))?;
    }

    Ok(endpoint)
}

fn tls_config(config: &GrpcConfig) -> ServiceResult<ClientTlsConfig> {
    let mut tls = ClientTlsConfig::new();

    if let Some(path) = &config.ca_cert {
        let pem = std::fs::read(path).map_err(|e| {
            error!(path = %path, error = %e, "Failed to read gRPC CA certificate");
            ServiceError::wrap(ErrorKind::Internal, SYSTEM, e)
        })?;
        tls = tls.ca_certificate(Certificate::from_pem(pem));
    }

    if let Some(domain) = &config.tls_domain {
        tls = tls.domain_name(domain.clone());
    }

    Ok(tls)
}

/// Connect eagerly; fails with `Unavailable` when the server is unreachable
pub async fn connect(config: &GrpcConfig) -> ServiceResult<Channel> {
    let channel = endpoint(config)?.connect().await.map_err(|e| {
        error!(uri = %config.uri(), error = %e, "gRPC connection failed");
        ServiceError::wrap(ErrorKind::Unavailable, SYSTEM, e)
    })?;

    info!(uri = %config.uri(), "gRPC channel connected");
    Ok(channel)
}

/// Channel that connects on first use
pub fn connect_lazy(config: &GrpcConfig) -> ServiceResult<Channel> {
    Ok(endpoint(config)?.connect_lazy())
}

/// Attach bearer-token injection to a channel; pass the result to a
/// generated client's `new`
pub fn with_auth(
    channel: Channel,
    interceptor: JwtClientInterceptor,
) -> InterceptedService<Channel, JwtClientInterceptor> {
    InterceptedService::new(channel, interceptor)
}
