/// Integration tests for crypto-core JWT functionality
///
/// This test module covers:
/// - Round trips for every algorithm, signed-only and encrypted
/// - Expiry and refresh handling
/// - Verify-only managers
/// - Construction from `JWT_*` configuration
use chrono::Duration;
use config_core::{vars, EnvConfig, JwtConfig};
use crypto_core::{Claims, JwtError, JwtManager, NoCustomClaims, TokenEncryptor};
use serde::{Deserialize, Serialize};

// Test key pairs - FOR TESTING ONLY
const RSA_PRIVATE_KEY: &str = include_str!("fixtures/rsa_private.pem");
const RSA_PUBLIC_KEY: &str = include_str!("fixtures/rsa_public.pem");
const EC_PRIVATE_KEY: &str = include_str!("fixtures/ec_private.pem");
const EC_PUBLIC_KEY: &str = include_str!("fixtures/ec_public.pem");

const SECRET: &[u8] = b"integration-secret-at-least-32-bytes";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct UserClaims {
    email: String,
    role: String,
    permissions: Vec<u8>,
}

fn user_claims() -> Claims<UserClaims> {
    Claims::new(
        "9b2f6c1e-4c7a-4d55-9a33-0d0f6f1b7e21",
        UserClaims {
            email: "test@example.com".to_string(),
            role: "admin".to_string(),
            permissions: vec![0b1000_0001, 0b0000_0100],
        },
    )
    .issued_by("auth-service")
    .expires_in(Duration::hours(1))
    .with_token_id()
}

fn signed_managers() -> Vec<(&'static str, JwtManager)> {
    vec![
        ("HS256", JwtManager::hs256(SECRET).unwrap()),
        ("HS384", JwtManager::hs384(SECRET).unwrap()),
        ("HS512", JwtManager::hs512(SECRET).unwrap()),
        ("RS256", JwtManager::rs256(RSA_PRIVATE_KEY, RSA_PUBLIC_KEY).unwrap()),
        ("ES256", JwtManager::es256(EC_PRIVATE_KEY, EC_PUBLIC_KEY).unwrap()),
    ]
}

fn all_managers() -> Vec<(String, JwtManager)> {
    let key = TokenEncryptor::generate_key();
    let mut managers = Vec::new();
    for (name, manager) in signed_managers() {
        let encrypted = manager
            .clone()
            .with_encryption(TokenEncryptor::from_base64(&key).unwrap());
        managers.push((name.to_string(), manager));
        managers.push((format!("{name}+AES256GCM"), encrypted));
    }
    managers
}

fn expired(mut claims: Claims<UserClaims>) -> Claims<UserClaims> {
    claims.iat -= 7200;
    claims.exp = claims.iat + 60;
    claims
}

// ============================================================================
// Round Trip Tests
// ============================================================================

#[test]
fn test_round_trip_every_variant() {
    let managers = all_managers();
    assert_eq!(managers.len(), 10);

    for (name, manager) in managers {
        let claims = user_claims();
        let token = manager
            .generate_token(&claims)
            .unwrap_or_else(|e| panic!("{name}: generate failed: {e}"));

        let verified: Claims<UserClaims> = manager
            .verify_token(&token)
            .unwrap_or_else(|e| panic!("{name}: verify failed: {e}"));
        assert_eq!(verified, claims, "{name}");
    }
}

#[test]
fn test_expired_every_variant() {
    for (name, manager) in all_managers() {
        let token = manager.generate_token(&expired(user_claims())).unwrap();

        let err = manager.verify_token::<UserClaims>(&token).unwrap_err();
        assert!(
            matches!(err, JwtError::Expired { .. }),
            "{name}: expected expiry, got {err:?}"
        );
    }
}

#[test]
fn test_refresh_every_variant() {
    for (name, manager) in all_managers() {
        let token = manager.generate_token(&expired(user_claims())).unwrap();

        let refreshed = manager
            .refresh_token::<UserClaims>(&token, Duration::minutes(30))
            .unwrap_or_else(|e| panic!("{name}: refresh failed: {e}"));
        assert!(refreshed.renewed, "{name}");
        assert_eq!(refreshed.claims.exp - refreshed.claims.iat, 1800, "{name}");

        let verified: Claims<UserClaims> = manager.verify_token(&refreshed.token).unwrap();
        assert_eq!(verified.custom, user_claims().custom, "{name}");
        assert_eq!(verified.jti, refreshed.claims.jti, "{name}");
    }
}

#[test]
fn test_encrypted_token_hides_claims() {
    let manager = JwtManager::hs256(SECRET)
        .unwrap()
        .with_encryption(TokenEncryptor::new(&[9u8; 32]).unwrap());
    let token = manager.generate_token(&user_claims()).unwrap();

    assert!(!token.contains('.'));
    assert!(!token.contains("eyJ"));
}

// ============================================================================
// Cross-Key Tests
// ============================================================================

#[test]
fn test_verify_only_managers() {
    let rs = JwtManager::rs256(RSA_PRIVATE_KEY, RSA_PUBLIC_KEY).unwrap();
    let rs_verifier = JwtManager::rs256_verifier(RSA_PUBLIC_KEY).unwrap();
    let token = rs.generate_token(&user_claims()).unwrap();

    assert!(!rs_verifier.can_sign());
    assert!(rs_verifier.verify_token::<UserClaims>(&token).is_ok());
    assert!(matches!(
        rs_verifier.generate_token(&user_claims()),
        Err(JwtError::MissingSigningKey)
    ));

    let es = JwtManager::es256(EC_PRIVATE_KEY, EC_PUBLIC_KEY).unwrap();
    let es_verifier = JwtManager::es256_verifier(EC_PUBLIC_KEY).unwrap();
    let token = es.generate_token(&user_claims()).unwrap();
    assert!(es_verifier.verify_token::<UserClaims>(&token).is_ok());
}

#[test]
fn test_verify_only_manager_cannot_refresh_expired() {
    let rs = JwtManager::rs256(RSA_PRIVATE_KEY, RSA_PUBLIC_KEY).unwrap();
    let verifier = JwtManager::rs256_verifier(RSA_PUBLIC_KEY).unwrap();
    let token = rs.generate_token(&expired(user_claims())).unwrap();

    assert!(matches!(
        verifier.refresh_token::<UserClaims>(&token, Duration::hours(1)),
        Err(JwtError::MissingSigningKey)
    ));
}

#[test]
fn test_rs256_token_rejected_by_es256() {
    let rs = JwtManager::rs256(RSA_PRIVATE_KEY, RSA_PUBLIC_KEY).unwrap();
    let es = JwtManager::es256(EC_PRIVATE_KEY, EC_PUBLIC_KEY).unwrap();
    let token = rs.generate_token(&user_claims()).unwrap();

    assert!(matches!(
        es.verify_token::<UserClaims>(&token),
        Err(JwtError::InvalidSignature)
    ));
}

#[test]
fn test_invalid_pem_rejected() {
    assert!(matches!(
        JwtManager::rs256_verifier("not a pem"),
        Err(JwtError::InvalidKey(_))
    ));
    assert!(matches!(
        JwtManager::es256(RSA_PRIVATE_KEY, EC_PUBLIC_KEY),
        Err(JwtError::InvalidKey(_))
    ));
}

#[test]
fn test_tampered_token() {
    let manager = JwtManager::rs256(RSA_PRIVATE_KEY, RSA_PUBLIC_KEY).unwrap();
    let token = manager.generate_token(&user_claims()).unwrap();

    let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
    let forged = Claims::new("someone-else", NoCustomClaims {}).expires_in(Duration::hours(1));
    let forged = JwtManager::hs256(SECRET).unwrap().generate_token(&forged).unwrap();
    parts[1] = forged.split('.').nth(1).unwrap().to_string();

    assert!(manager
        .verify_token::<NoCustomClaims>(&parts.join("."))
        .is_err());
}

// ============================================================================
// Configuration Tests
// ============================================================================

#[test]
fn test_from_config_hmac_with_encryption() {
    let key = TokenEncryptor::generate_key();
    let config = JwtConfig::from_iter(vars([
        ("JWT_ALGORITHM", "HS384"),
        ("JWT_SECRET", "integration-secret-at-least-32-bytes"),
        ("JWT_ENCRYPTION_KEY", key.as_str()),
        ("JWT_ISSUER", "auth-service"),
        ("JWT_TTL_SECS", "900"),
        ("JWT_REFRESH_EXTENSION_SECS", "7200"),
    ]))
    .unwrap();

    let manager = JwtManager::from_config(&config).unwrap();
    assert!(manager.is_encrypted());
    assert_eq!(manager.refresh_extension(), Duration::hours(2));

    let claims = manager.claims("user-1", NoCustomClaims {});
    assert_eq!(claims.exp - claims.iat, 900);
    assert_eq!(claims.iss.as_deref(), Some("auth-service"));

    let token = manager.generate_token(&claims).unwrap();
    let verified: Claims = manager.verify_token(&token).unwrap();
    assert_eq!(verified, claims);
}

#[test]
fn test_from_config_es256_verify_only() {
    let escaped = EC_PUBLIC_KEY.trim_end().replace('\n', "\\n");
    let config = JwtConfig::from_iter(vars([
        ("JWT_ALGORITHM", "ES256"),
        ("JWT_PUBLIC_KEY", escaped.as_str()),
    ]))
    .unwrap();

    let manager = JwtManager::from_config(&config).unwrap();
    assert!(!manager.can_sign());

    let issuer = JwtManager::es256(EC_PRIVATE_KEY, EC_PUBLIC_KEY).unwrap();
    let token = issuer.generate_token(&user_claims()).unwrap();
    assert!(manager.verify_token::<UserClaims>(&token).is_ok());
}

#[test]
fn test_from_config_missing_secret() {
    let config = JwtConfig::from_iter(Vec::new()).unwrap();
    assert!(matches!(
        JwtManager::from_config(&config),
        Err(JwtError::InvalidKey(_))
    ));
}
