//! Bearer-token verification.
//!
//! Only HS256 tokens signed with the shared secret are accepted. Signing is
//! kept for the seeder and tests, which need tokens the server will trust.

use chrono::Duration;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::auth::Claims;
use crate::types::UserId;

/// Token settings taken from `[jwt]`.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC secret shared with the identity service.
    pub secret: String,
}

/// Why a token could not be issued or accepted.
#[derive(Debug, Error)]
pub enum JwtError {
    /// Encoding the claims failed.
    #[error("could not sign token: {0}")]
    Signing(String),

    /// Bad signature, bad encoding or missing claims.
    #[error("token rejected: {0}")]
    Rejected(String),

    /// `exp` is in the past.
    #[error("token has expired")]
    Expired,
}

/// Verifies (and for tooling, signs) access tokens.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService").finish_non_exhaustive()
    }
}

impl JwtService {
    /// Builds the keys and validation rules once.
    #[must_use]
    pub fn new(config: &JwtConfig) -> Self {
        let secret = config.secret.as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation.leeway = 0;
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Signs a token for `user_id` acting as `role`.
    ///
    /// # Errors
    ///
    /// Returns [`JwtError::Signing`] if the claims cannot be encoded.
    pub fn issue_token(&self, user_id: UserId, role: &str, ttl: Duration) -> Result<String, JwtError> {
        let claims = Claims::issued(user_id, role, ttl);
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::Signing(e.to_string()))
    }

    /// Checks signature and expiry and returns the claims.
    ///
    /// # Errors
    ///
    /// [`JwtError::Expired`] past `exp`, [`JwtError::Rejected`] for anything
    /// else wrong with the token.
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        match jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => Ok(data.claims),
            Err(e) if matches!(e.kind(), ErrorKind::ExpiredSignature) => Err(JwtError::Expired),
            Err(e) => Err(JwtError::Rejected(e.to_string())),
        }
    }
}
