//! JWT token issuance and verification
//!
//! Access tokens are HS256-signed, carry the identity id as `sub`, and are
//! valid strictly before their `exp` instant. Keys are derived once from the
//! configured secret and shared through `AppState`.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use userbase_shared::AuthError;

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (identity ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// Pre-computed JWT keys for efficient token operations
#[derive(Clone)]
pub struct JwtKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

impl JwtKeys {
    /// Create new JWT keys from secret
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
        }
    }

    pub fn encoding(&self) -> &EncodingKey {
        &self.encoding
    }

    pub fn decoding(&self) -> &DecodingKey {
        &self.decoding
    }
}

/// JWT service for token operations
///
/// Cheap to clone: keys are behind `Arc`.
#[derive(Clone)]
pub struct JwtService {
    keys: JwtKeys,
    access_token_expiry: Duration,
    validation: Arc<Validation>,
}

impl JwtService {
    /// Create a new JWT service with pre-computed keys
    ///
    /// Call this once at application startup and store in AppState.
    pub fn new(secret: &str, access_token_expiry_secs: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked in `verify_at` so the boundary is exact (no leeway).
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            keys: JwtKeys::new(secret),
            access_token_expiry: Duration::seconds(access_token_expiry_secs),
            validation: Arc::new(validation),
        }
    }

    /// Issue an access token for an identity, starting now
    #[inline]
    pub fn issue(&self, identity_id: i64) -> Result<String> {
        self.issue_at(identity_id, Utc::now())
    }

    /// Issue an access token as if the current time were `now`
    pub fn issue_at(&self, identity_id: i64, now: DateTime<Utc>) -> Result<String> {
        let exp = now + self.access_token_expiry;

        let claims = Claims {
            sub: identity_id.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, self.keys.encoding())
            .map_err(|e| anyhow::anyhow!("Failed to generate access token: {}", e))
    }

    /// Verify a token and return the identity ID it was issued for
    #[inline]
    pub fn verify(&self, token: &str) -> Result<i64, AuthError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token as if the current time were `now`
    ///
    /// The token is accepted only while `now < exp`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<i64, AuthError> {
        let claims = self.decode_claims(token)?;

        if now.timestamp() >= claims.exp {
            return Err(AuthError::TokenExpired);
        }

        claims
            .sub
            .parse::<i64>()
            .map_err(|_| AuthError::MalformedToken)
    }

    fn decode_claims(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, self.keys.decoding(), &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::MalformedToken,
            })
    }

    /// Get access token expiry in seconds
    #[inline]
    pub fn access_token_expiry_secs(&self) -> i64 {
        self.access_token_expiry.num_seconds()
    }
}
