//! Token cryptography for backend services
//!
//! - [`JwtManager`]: HS256/384/512, RS256 and ES256 tokens, optionally
//!   encrypted, with verify and refresh
//! - [`TokenEncryptor`]: AES-256-GCM wrapping of signed tokens
//! - [`TokenVerifier`]: the seam middleware depends on

pub mod claims;
pub mod encryption;
pub mod error;
pub mod jwt;

pub use claims::{Claims, NoCustomClaims};
pub use encryption::TokenEncryptor;
pub use error::JwtError;
pub use jwt::{JwtManager, Refreshed, TokenVerifier};
