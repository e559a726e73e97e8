//! JWT validation for externally issued identity tokens.
//!
//! Token issuance and session management belong to the external identity
//! provider; this service only validates signatures and extracts the
//! identity claims the API needs.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Identity claims carried by an externally issued token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IdentityClaims {
    /// External identity subject.
    pub sub: String,
    /// Email address claim.
    pub email: Option<String>,
    /// Display name claim.
    pub name: Option<String>,
    /// Expiration timestamp (Unix)
    pub exp: u64,
}

/// JWT validation error types.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("Token expired")]
    TokenExpired,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token validation failed: {0}")]
    TokenValidation(String),
}

/// Validates bearer tokens against the shared secret.
#[derive(Clone)]
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    encoding_key: EncodingKey,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Validate a token and extract its identity claims.
    pub fn validate_token(&self, token: &str) -> Result<IdentityClaims, JwtError> {
        let validation = Validation::default();

        decode::<IdentityClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidToken
                | jsonwebtoken::errors::ErrorKind::InvalidSignature => JwtError::InvalidToken,
                _ => JwtError::TokenValidation(e.to_string()),
            })
    }

    /// Issue a token for the given identity. Exists for tests and local use;
    /// production tokens come from the external provider.
    pub fn issue_token(
        &self,
        sub: &str,
        email: Option<&str>,
        name: Option<&str>,
        ttl_secs: u64,
    ) -> Result<String, JwtError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| JwtError::TokenValidation(e.to_string()))?
            .as_secs();

        let claims = IdentityClaims {
            sub: sub.to_string(),
            email: email.map(|s| s.to_string()),
            name: name.map(|s| s.to_string()),
            exp: now + ttl_secs,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::TokenValidation(e.to_string()))
    }
}

impl std::fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtVerifier").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_validate() {
        let verifier = JwtVerifier::new("test-secret-key-32-chars-long!!");
        let token = verifier
            .issue_token("sub-123", Some("a@example.com"), Some("A"), 3600)
            .unwrap();

        let claims = verifier.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "sub-123");
        assert_eq!(claims.email.as_deref(), Some("a@example.com"));
        assert_eq!(claims.name.as_deref(), Some("A"));
    }

    #[test]
    fn test_invalid_token_rejected() {
        let verifier = JwtVerifier::new("test-secret-key-32-chars-long!!");
        assert!(matches!(
            verifier.validate_token("garbage"),
            Err(JwtError::InvalidToken) | Err(JwtError::TokenValidation(_))
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = JwtVerifier::new("secret-one-32-chars-long-enough!");
        let verifier = JwtVerifier::new("secret-two-32-chars-long-enough!");

        let token = issuer.issue_token("sub-1", None, None, 3600).unwrap();
        assert!(verifier.validate_token(&token).is_err());
    }
}
