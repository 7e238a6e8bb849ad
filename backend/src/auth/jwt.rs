//! JWT token generation and validation
//!
//! Issues the API's auth tokens with pre-computed keys. Every token carries
//! a unique `jti` so that logout can revoke it before it expires.

use anyhow::Result;
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

const ACCESS_TOKEN: &str = "access";

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    pub token_type: String,
    /// Token ID, used for revocation on logout
    pub jti: String,
}

impl Claims {
    /// Parse the subject back into a user id
    pub fn user_id(&self) -> Result<i64> {
        self.sub
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid user ID in token"))
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0).single().unwrap_or_else(Utc::now)
    }
}

/// Pre-computed JWT keys for efficient token operations
/// These are expensive to create, so we cache them in AppState
#[derive(Clone)]
pub struct JwtKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

impl JwtKeys {
    /// Create new JWT keys from secret
    /// This should be called once at startup
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
#[derive(Clone)]
pub struct JwtService {
    keys: JwtKeys,
    token_expiry_secs: i64,
}

impl JwtService {
    /// Create a new JWT service with pre-computed keys
    ///
    /// Call this once at application startup and store in AppState.
    pub fn new(secret: &str, token_expiry_secs: i64) -> Self {
        Self {
            keys: JwtKeys::new(secret),
            token_expiry_secs,
        }
    }

    /// Generate an auth token for a user
    pub fn generate_token(&self, user_id: i64) -> Result<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.token_expiry_secs);

        let claims = Claims {
            sub: user_id.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            token_type: ACCESS_TOKEN.to_string(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, self.keys.encoding())
            .map_err(|e| anyhow::anyhow!("Failed to generate token: {}", e))
    }

    /// Validate a token signature and expiry and return claims
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(token, self.keys.decoding(), &Validation::default())
            .map_err(|e| anyhow::anyhow!("Invalid token: {}", e))?;

        if token_data.claims.token_type != ACCESS_TOKEN {
            return Err(anyhow::anyhow!("Not an access token"));
        }

        Ok(token_data.claims)
    }

    #[inline]
    pub fn token_expiry_secs(&self) -> i64 {
        self.token_expiry_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_service() -> JwtService {
        JwtService::new("test-secret", 3600)
    }

    #[test]
    fn test_generate_and_validate_token() {
        let service = create_test_service();

        let token = service.generate_token(42).unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.user_id().unwrap(), 42);
        assert_eq!(claims.token_type, "access");
    }

    #[test]
    fn test_tokens_have_unique_ids() {
        let service = create_test_service();

        let first = service.validate_token(&service.generate_token(1).unwrap()).unwrap();
        let second = service.validate_token(&service.generate_token(1).unwrap()).unwrap();

        assert_ne!(first.jti, second.jti);
    }

    #[test]
    fn test_invalid_token_rejected() {
        let service = create_test_service();
        let result = service.validate_token("invalid.token.here");

        assert!(result.is_err());
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let token = JwtService::new("other-secret", 3600).generate_token(1).unwrap();
        assert!(create_test_service().validate_token(&token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        // Default validation allows 60s of leeway
        let service = JwtService::new("test-secret", -120);
        let token = service.generate_token(1).unwrap();
        assert!(service.validate_token(&token).is_err());
    }

    #[test]
    fn test_expires_at_matches_claim() {
        let service = create_test_service();
        let claims = service.validate_token(&service.generate_token(5).unwrap()).unwrap();
        assert_eq!(claims.expires_at().timestamp(), claims.exp);
    }
}
