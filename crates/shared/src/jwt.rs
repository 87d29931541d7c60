//! JWT session tokens.
//!
//! Access and refresh tokens are signed either with RS256 (RSA key pair,
//! the production setup) or HS256 (shared secret, handy for local
//! development and tests). The algorithm follows from the constructor used.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Error type for JWT operations.
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingError(String),

    #[error("Failed to decode token: {0}")]
    DecodingError(String),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Invalid key: {0}")]
    InvalidKey(String),
}

/// JWT token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (tenant user ID)
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
    /// Unique token identifier
    pub jti: String,
    pub token_type: TokenType,
}

/// Type of JWT token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// A freshly issued token with its identifier.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub jti: String,
    pub expires_in: i64,
}

/// Signing/verification keys plus token lifetimes.
#[derive(Clone)]
pub struct JwtConfig {
    algorithm: Algorithm,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    pub access_token_expiry_secs: i64,
    pub refresh_token_expiry_secs: i64,
    pub leeway_secs: u64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("algorithm", &self.algorithm)
            .field("access_token_expiry_secs", &self.access_token_expiry_secs)
            .field("refresh_token_expiry_secs", &self.refresh_token_expiry_secs)
            .field("leeway_secs", &self.leeway_secs)
            .field("keys", &"[REDACTED]")
            .finish()
    }
}

/// Default leeway in seconds for clock skew tolerance
pub const DEFAULT_LEEWAY_SECS: u64 = 30;

impl JwtConfig {
    /// Creates an RS256 config from an RSA key pair in PEM format.
    pub fn rs256(
        private_key_pem: &str,
        public_key_pem: &str,
        access_token_expiry_secs: i64,
        refresh_token_expiry_secs: i64,
        leeway_secs: u64,
    ) -> Result<Self, JwtError> {
        let private_key = normalize_pem(private_key_pem);
        let public_key = normalize_pem(public_key_pem);

        let encoding_key = EncodingKey::from_rsa_pem(private_key.as_bytes())
            .map_err(|e| JwtError::InvalidKey(format!("Invalid private key: {}", e)))?;
        let decoding_key = DecodingKey::from_rsa_pem(public_key.as_bytes())
            .map_err(|e| JwtError::InvalidKey(format!("Invalid public key: {}", e)))?;

        Ok(Self {
            algorithm: Algorithm::RS256,
            encoding_key,
            decoding_key,
            access_token_expiry_secs,
            refresh_token_expiry_secs,
            leeway_secs,
        })
    }

    /// Creates an HS256 config from a shared secret.
    pub fn hs256(
        secret: &str,
        access_token_expiry_secs: i64,
        refresh_token_expiry_secs: i64,
        leeway_secs: u64,
    ) -> Result<Self, JwtError> {
        if secret.len() < 32 {
            return Err(JwtError::InvalidKey(
                "HS256 secret must be at least 32 bytes".to_string(),
            ));
        }

        Ok(Self {
            algorithm: Algorithm::HS256,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_expiry_secs,
            refresh_token_expiry_secs,
            leeway_secs,
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Issues an access token for the given user.
    pub fn issue_access_token(&self, user_id: Uuid) -> Result<IssuedToken, JwtError> {
        self.issue(user_id, TokenType::Access, self.access_token_expiry_secs)
    }

    /// Issues a refresh token for the given user.
    pub fn issue_refresh_token(&self, user_id: Uuid) -> Result<IssuedToken, JwtError> {
        self.issue(user_id, TokenType::Refresh, self.refresh_token_expiry_secs)
    }

    fn issue(
        &self,
        user_id: Uuid,
        token_type: TokenType,
        expiry_secs: i64,
    ) -> Result<IssuedToken, JwtError> {
        let now = Utc::now();
        let jti = Uuid::new_v4().to_string();

        let claims = Claims {
            sub: user_id.to_string(),
            exp: (now + Duration::seconds(expiry_secs)).timestamp(),
            iat: now.timestamp(),
            jti: jti.clone(),
            token_type,
        };

        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingError(e.to_string()))?;

        Ok(IssuedToken {
            token,
            jti,
            expires_in: expiry_secs,
        })
    }

    /// Validates a token of the expected type and returns its claims.
    pub fn validate(&self, token: &str, expected: TokenType) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = true;
        validation.leeway = self.leeway_secs;

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidToken
                | jsonwebtoken::errors::ErrorKind::InvalidSignature
                | jsonwebtoken::errors::ErrorKind::InvalidAlgorithm => JwtError::InvalidToken,
                _ => JwtError::DecodingError(e.to_string()),
            }
        })?;

        if data.claims.token_type != expected {
            return Err(JwtError::InvalidToken);
        }
        Ok(data.claims)
    }
}

/// Extracts the user ID from validated claims.
pub fn extract_user_id(claims: &Claims) -> Result<Uuid, JwtError> {
    Uuid::parse_str(&claims.sub).map_err(|_| JwtError::InvalidToken)
}

/// PEM keys passed through environment variables often carry literal `\n`
/// sequences and surrounding quotes.
fn normalize_pem(key: &str) -> String {
    key.trim()
        .trim_matches('"')
        .trim_matches('\'')
        .replace("\\n", "\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;
    use std::time::Duration as StdDuration;

    const SECRET: &str = "test_secret_key_for_jwt_testing_0123456789";

    fn config() -> JwtConfig {
        JwtConfig::hs256(SECRET, 900, 604800, 0).unwrap()
    }

    #[test]
    fn test_hs256_rejects_short_secret() {
        assert!(matches!(
            JwtConfig::hs256("short", 900, 604800, 0),
            Err(JwtError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_rs256_rejects_garbage_key() {
        assert!(matches!(
            JwtConfig::rs256("nope", "nope", 900, 604800, 30),
            Err(JwtError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_issue_and_validate_access_token() {
        let config = config();
        let user_id = Uuid::new_v4();

        let issued = config.issue_access_token(user_id).unwrap();
        let claims = config.validate(&issued.token, TokenType::Access).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.jti, issued.jti);
        assert_eq!(issued.expires_in, 900);
        assert_eq!(extract_user_id(&claims).unwrap(), user_id);
    }

    #[test]
    fn test_refresh_token_rejected_as_access() {
        let config = config();
        let issued = config.issue_refresh_token(Uuid::new_v4()).unwrap();
        assert!(matches!(
            config.validate(&issued.token, TokenType::Access),
            Err(JwtError::InvalidToken)
        ));
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let other =
            JwtConfig::hs256("another_secret_key_that_is_long_enough_0000", 900, 900, 0).unwrap();
        let issued = other.issue_access_token(Uuid::new_v4()).unwrap();
        assert!(config().validate(&issued.token, TokenType::Access).is_err());
    }

    #[test]
    fn test_expired_token() {
        let mut config = config();
        config.access_token_expiry_secs = 1;
        let issued = config.issue_access_token(Uuid::new_v4()).unwrap();

        sleep(StdDuration::from_secs(2));

        assert!(matches!(
            config.validate(&issued.token, TokenType::Access),
            Err(JwtError::TokenExpired)
        ));
    }

    #[test]
    fn test_malformed_token() {
        assert!(config().validate("not_a_jwt", TokenType::Access).is_err());
    }

    #[test]
    fn test_unique_jti_per_token() {
        let config = config();
        let user_id = Uuid::new_v4();
        let a = config.issue_access_token(user_id).unwrap();
        let b = config.issue_access_token(user_id).unwrap();
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_normalize_pem_escaped_newlines() {
        let raw = "\"-----BEGIN KEY-----\\nabc\\n-----END KEY-----\"";
        assert_eq!(
            normalize_pem(raw),
            "-----BEGIN KEY-----\nabc\n-----END KEY-----"
        );
    }

    #[test]
    fn test_token_type_serialization() {
        assert_eq!(
            serde_json::to_string(&TokenType::Access).unwrap(),
            "\"access\""
        );
        assert_eq!(
            serde_json::to_string(&TokenType::Refresh).unwrap(),
            "\"refresh\""
        );
    }
}
