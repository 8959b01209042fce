//! Token Verification
//!
//! Accounts and sessions are owned by the marketplace's account service. This
//! server only needs to turn a bearer token into a user id, both for HTTP
//! requests and for the `authenticate` event on the WebSocket gateway.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::JwtSettings;

/// Resolves bearer tokens to user ids.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Validate `token` and return the user id it was issued for.
    async fn verify_token(&self, token: &str) -> Result<i64, AuthError>;
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
}

/// Authentication errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// HS256 verifier sharing its secret with the account service.
pub struct JwtTokenVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtTokenVerifier {
    pub fn new(settings: &JwtSettings) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(settings.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(settings.secret.as_bytes()),
        }
    }

    /// Issue an access token for `user_id`.
    ///
    /// Production tokens come from the account service; this is used by tests
    /// and local tooling that need a token the server will accept.
    pub fn issue_token(&self, user_id: i64, ttl: Duration) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("Token generation failed: {}", e)))
    }

    fn decode_access_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            }
        })?;

        Ok(token_data.claims)
    }
}

#[async_trait]
impl TokenVerifier for JwtTokenVerifier {
    async fn verify_token(&self, token: &str) -> Result<i64, AuthError> {
        let claims = self.decode_access_token(token)?;

        match claims.sub.parse::<i64>() {
            Ok(user_id) if user_id > 0 => Ok(user_id),
            _ => Err(AuthError::InvalidToken),
        }
    }
}
