pub mod access;
pub mod identity;
pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SecurityConfig;

pub use access::{authorize, can_access};
pub use identity::{AuthUser, Identity};

/// HMAC family accepted on verification. Tokens are issued with the first entry.
const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

const MAX_EXPIRY_HOURS: u64 = 24 * 366 * 10;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Signing secret is empty")]
    MissingSecret,

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Token subject is not a user id")]
    MalformedClaims,

    #[error("Authentication required")]
    Anonymous,

    #[error("{0}")]
    MissingCredential(String),
}

impl AuthError {
    /// Whether the failure lies with the server rather than the presented credential.
    pub fn is_server_fault(&self) -> bool {
        matches!(
            self,
            AuthError::MissingSecret | AuthError::TokenGeneration(_) | AuthError::PasswordHash(_)
        )
    }
}

/// Issues and verifies signed identity tokens. Built once at startup and shared.
pub struct CredentialCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expiry: Duration,
}

impl CredentialCodec {
    pub fn new(secret: &str, expiry_hours: u64) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::MissingSecret);
        }

        let mut validation = Validation::new(ACCEPTED_ALGORITHMS[0]);
        validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            expiry: Duration::hours(expiry_hours.min(MAX_EXPIRY_HOURS) as i64),
        })
    }

    pub fn from_config(security: &SecurityConfig) -> Result<Self, AuthError> {
        Self::new(&security.jwt_secret, security.jwt_expiry_hours)
    }

    pub fn issue(&self, user_id: i64, email: &str) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + self.expiry).timestamp(),
        };

        encode(&Header::new(ACCEPTED_ALGORITHMS[0]), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenGeneration(e.to_string()))
    }

    /// Verifies signature, algorithm family and expiry, then yields a concrete identity.
    pub fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        let id = data.claims.sub.parse::<i64>().map_err(|_| AuthError::MalformedClaims)?;

        Ok(Identity::User(AuthUser {
            id,
            email: data.claims.email,
        }))
    }
}
