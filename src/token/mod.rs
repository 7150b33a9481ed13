//! Signed bearer token minting and verification
//!
//! Tokens are HS256 JWTs signed with a process-wide symmetric key. Signing
//! (rather than encrypting) keeps the token self-contained: any process
//! holding the shared key can verify it without a store round-trip, which is
//! what lets the gateway validate tokens without calling the identity
//! service.

use crate::config::JwtConfig;
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// Why a presented token was rejected. Collapsed to one opaque 401 at the
/// HTTP edge; the distinction exists for callers and tests.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("token signature does not verify")]
    SignatureInvalid,
    #[error("token is expired")]
    Expired,
    #[error("token is malformed")]
    Malformed,
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Claims embedded in a minted token. The role set is a snapshot taken at
/// mint time; later role changes do not affect already-issued tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,
    /// Role names as of mint time
    pub roles: BTreeSet<String>,
    /// Issuer
    pub iss: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

/// Mints and verifies bearer tokens
#[derive(Clone)]
pub struct TokenService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Mint a token for `subject` carrying the given role names
    pub fn mint(
        &self,
        subject: &str,
        roles: BTreeSet<String>,
    ) -> std::result::Result<String, TokenError> {
        if subject.is_empty() {
            return Err(TokenError::InvalidInput(
                "subject must not be empty".to_string(),
            ));
        }

        let now = Utc::now();
        let exp = now + Duration::seconds(self.config.token_ttl_secs);

        let claims = Claims {
            sub: subject.to_string(),
            roles,
            iss: self.config.issuer.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };
        let header = Header::new(Algorithm::HS256);
        encode(&header, &claims, &self.encoding_key).map_err(|_| TokenError::Malformed)
    }

    /// Verify a presented token and return its claims exactly as minted
    pub fn verify(&self, token: &str) -> std::result::Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Strict leeway (5 seconds) instead of the default 60 so tokens
        // expire promptly while tolerating minor clock skew.
        validation.leeway = 5;
        validation.set_issuer(&[&self.config.issuer]);

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    ErrorKind::InvalidSignature => TokenError::SignatureInvalid,
                    _ => TokenError::Malformed,
                }
            })?;
        Ok(token_data.claims)
    }

    /// Token validity window in seconds
    pub fn token_ttl(&self) -> i64 {
        self.config.token_ttl_secs
    }
}
