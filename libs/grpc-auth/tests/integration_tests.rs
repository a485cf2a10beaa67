//! Integration Tests for gRPC JWT authentication
//!
//! Client -> token injection -> Server -> verification -> handler access

use std::sync::Arc;

use chrono::Duration;
use crypto_core::{Claims, JwtManager, TokenEncryptor, TokenVerifier};
use error_types::grpc::StatusExt;
use grpc_auth::{JwtClaimsExt, JwtClientInterceptor, JwtServerInterceptor};
use serde::{Deserialize, Serialize};
use tonic::service::Interceptor;
use tonic::{Request, Status};

const SECRET: &[u8] = b"grpc-auth-test-secret-32-bytes-long";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Profile {
    email: String,
    permissions: Vec<u8>,
}

impl authorizer::PermissionBearer<u8> for Profile {
    fn permissions(&self) -> &[u8] {
        &self.permissions
    }
}

fn manager() -> JwtManager {
    JwtManager::hs256(SECRET).unwrap().with_issuer("auth-service")
}

fn claims() -> Claims<Profile> {
    manager().claims(
        "user-42",
        Profile {
            email: "test@example.com".to_string(),
            permissions: authorizer::sum::<u8, _, _>([
                authorizer::generate::<u8>(2),
                authorizer::generate::<u8>(10),
            ]),
        },
    )
}

/// Simulate a request passing through both interceptors
fn simulate_grpc_flow(manager: &JwtManager, token: &str) -> Result<Request<()>, Status> {
    let mut client_interceptor = JwtClientInterceptor::new(token).map_err(Status::from)?;
    let request = client_interceptor.call(Request::new(()))?;

    let verifier: Arc<dyn TokenVerifier<Profile>> = Arc::new(manager.clone());
    let mut server_interceptor = JwtServerInterceptor::new(verifier);
    server_interceptor.call(request)
}

#[test]
fn test_end_to_end_jwt_flow() {
    let manager = manager();
    let token = manager.generate_token(&claims()).unwrap();

    let request = simulate_grpc_flow(&manager, &token).expect("Flow should succeed");

    let verified = request.jwt_claims::<Profile>().expect("Claims should be present");
    assert_eq!(verified.sub, "user-42");
    assert_eq!(verified.iss.as_deref(), Some("auth-service"));
    assert_eq!(verified.custom.email, "test@example.com");
}

#[test]
fn test_end_to_end_encrypted_token() {
    let manager = manager().with_encryption(TokenEncryptor::new(&[7u8; 32]).unwrap());
    let token = manager.generate_token(&claims()).unwrap();

    let request = simulate_grpc_flow(&manager, &token).unwrap();
    assert_eq!(request.jwt_claims::<Profile>().unwrap().sub, "user-42");
}

#[test]
fn test_end_to_end_invalid_token() {
    let status = simulate_grpc_flow(&manager(), "invalid.jwt.token").unwrap_err();

    assert_eq!(status.code(), tonic::Code::Unauthenticated);
    assert_eq!(status.error_code(), Some("UNAUTHENTICATED"));
}

#[test]
fn test_end_to_end_expired_token() {
    let manager = manager();
    let mut stale = claims();
    stale.iat -= 3600;
    stale.exp = stale.iat + 60;
    let token = manager.generate_token(&stale).unwrap();

    let status = simulate_grpc_flow(&manager, &token).unwrap_err();
    assert_eq!(status.code(), tonic::Code::Unauthenticated);
    assert_eq!(status.error_code(), Some("TOKEN_EXPIRED"));

    // The expired token can be exchanged for a fresh one
    let refreshed = manager
        .refresh_token::<Profile>(&token, Duration::minutes(5))
        .unwrap();
    assert!(simulate_grpc_flow(&manager, &refreshed.token).is_ok());
}

#[test]
fn test_end_to_end_wrong_key() {
    let token = JwtManager::hs256(b"another-secret-that-is-32-bytes-long")
        .unwrap()
        .generate_token(&claims())
        .unwrap();

    let status = simulate_grpc_flow(&manager(), &token).unwrap_err();
    assert_eq!(status.code(), tonic::Code::Unauthenticated);
}

#[test]
fn test_end_to_end_permission_checks() {
    let manager = manager();
    let token = manager.generate_token(&claims()).unwrap();
    let request = simulate_grpc_flow(&manager, &token).unwrap();

    assert!(request
        .require_permission::<Profile, u8>(&authorizer::generate::<u8>(10))
        .is_ok());

    let status = request
        .require_permission::<Profile, u8>(&authorizer::generate::<u8>(3))
        .unwrap_err();
    assert_eq!(status.code(), tonic::Code::PermissionDenied);

    assert!(request.require_subject::<Profile>("user-42").is_ok());
}

#[test]
fn test_token_forwarding() {
    let manager = manager();
    let token = manager.generate_token(&claims()).unwrap();

    // Gateway receives the request and forwards the caller's credentials
    let incoming = simulate_grpc_flow(&manager, &token).unwrap();
    let mut forwarder = JwtClientInterceptor::forward(incoming.metadata()).unwrap();
    let outgoing = forwarder.call(Request::new(())).unwrap();

    let verifier: Arc<dyn TokenVerifier<Profile>> = Arc::new(manager);
    let claims = JwtServerInterceptor::new(verifier)
        .authenticate(outgoing.metadata())
        .unwrap();
    assert_eq!(claims.sub, "user-42");
}
