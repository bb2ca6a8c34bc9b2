//! Session-token issuance
//!
//! Session tokens are signed, claims-bearing JWTs with a fixed two-hour
//! lifetime, issued on successful login. They are opaque bearer strings to
//! downstream consumers; the claim schema (`sub`, `email`, `role`, expiry)
//! is the wire contract relied on by authorization checks elsewhere in the
//! system.
//!
//! Issuance is pure given `(account, now, config)` - no side effects, no
//! I/O. Tokens are signed with a configured secret using HS256.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{Account, Error, error::SessionError};

/// How long an issued session token remains valid.
pub fn session_ttl() -> Duration {
    Duration::hours(2)
}

/// Signing material and standard claims, supplied at process start.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for both signing and verifying (HS256).
    secret: Vec<u8>,
    /// Issuer claim.
    pub issuer: String,
    /// Audience claim.
    pub audience: String,
}

impl JwtConfig {
    pub fn new(secret: Vec<u8>, issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            secret,
            issuer: issuer.into(),
            audience: audience.into(),
        }
    }

    fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(&self.secret)
    }

    fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(&self.secret)
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation
    }
}

/// Claims carried by a session token.
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject - account ID
    pub sub: String,
    /// Email of the account holder
    pub email: String,
    /// Authorization role, when the account carries one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Issued at in seconds (as UTC timestamp)
    pub iat: i64,
    /// Expiration time in seconds (as UTC timestamp)
    pub exp: i64,
    /// Issuer
    pub iss: String,
    /// Audience
    pub aud: String,
}

/// A signed, time-limited bearer credential asserting account identity and
/// role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken(String);

impl SessionToken {
    /// Sign a session token for the given account.
    ///
    /// The token expires [`session_ttl`] after `now`.
    pub fn issue(account: &Account, now: DateTime<Utc>, config: &JwtConfig) -> Result<Self, Error> {
        let claims = JwtClaims {
            sub: account.id.to_string(),
            email: account.email.clone(),
            role: Some(account.role.to_string()),
            iat: now.timestamp(),
            exp: (now + session_ttl()).timestamp(),
            iss: config.issuer.clone(),
            aud: config.audience.clone(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &config.encoding_key())
            .map_err(|e| SessionError::InvalidToken(format!("Failed to encode JWT: {e}")))?;

        Ok(SessionToken(token))
    }

    /// Verify the token signature and standard claims, returning the claims.
    pub fn verify(&self, config: &JwtConfig) -> Result<JwtClaims, Error> {
        let token_data = decode::<JwtClaims>(&self.0, &config.decoding_key(), &config.validation())
            .map_err(|e| {
                if matches!(
                    e.kind(),
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature
                ) {
                    Error::Session(SessionError::Expired)
                } else {
                    Error::Session(SessionError::InvalidToken(format!(
                        "JWT validation failed: {e}"
                    )))
                }
            })?;

        Ok(token_data.claims)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl From<String> for SessionToken {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::{Account, Role};

    const TEST_HS256_SECRET: &[u8] = b"test_secret_key_for_hs256_jwt_tokens_not_for_production_use";

    fn test_config() -> JwtConfig {
        JwtConfig::new(TEST_HS256_SECRET.to_vec(), "somon-api", "somon-clients")
    }

    fn test_account() -> Account {
        Account::builder()
            .display_name("Alice")
            .email("alice@example.com")
            .password_hash("$argon2id$fake")
            .role(Role::Manager)
            .build()
            .unwrap()
    }

    #[test]
    fn test_issue_and_verify() {
        let config = test_config();
        let account = test_account();
        let now = Utc::now();

        let token = SessionToken::issue(&account, now, &config).unwrap();
        let claims = token.verify(&config).unwrap();

        assert_eq!(claims.sub, account.id.to_string());
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.role, Some("Manager".to_string()));
        assert_eq!(claims.iss, "somon-api");
        assert_eq!(claims.aud, "somon-clients");
        assert_eq!(claims.iat, now.timestamp());
        assert_eq!(claims.exp, (now + session_ttl()).timestamp());
    }

    #[test]
    fn test_lifetime_is_two_hours() {
        let config = test_config();
        let now = Utc::now();

        let token = SessionToken::issue(&test_account(), now, &config).unwrap();
        let claims = token.verify(&config).unwrap();

        assert_eq!(claims.exp - claims.iat, 2 * 60 * 60);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let config = test_config();
        // Issued far enough in the past that the 2h lifetime (plus default
        // validation leeway) has elapsed
        let issued = Utc::now() - Duration::hours(3);

        let token = SessionToken::issue(&test_account(), issued, &config).unwrap();
        let result = token.verify(&config);

        assert!(matches!(result, Err(Error::Session(SessionError::Expired))));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let config = test_config();
        let other = JwtConfig::new(
            b"another_secret_entirely_for_this_test".to_vec(),
            "somon-api",
            "somon-clients",
        );

        let token = SessionToken::issue(&test_account(), Utc::now(), &config).unwrap();
        let result = token.verify(&other);

        assert!(matches!(
            result,
            Err(Error::Session(SessionError::InvalidToken(_)))
        ));
    }

    #[test]
    fn test_wrong_audience_is_rejected() {
        let config = test_config();
        let other = JwtConfig::new(TEST_HS256_SECRET.to_vec(), "somon-api", "someone-else");

        let token = SessionToken::issue(&test_account(), Utc::now(), &config).unwrap();
        assert!(token.verify(&other).is_err());
    }
}
