//! Access tokens: HS256 JWTs carrying the account email.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{AuthConfig, MAX_TOKEN_TTL_SECS};

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("access token expired")]
    Expired,
    #[error("invalid access token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies access tokens with the secret from `AuthConfig`.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    ttl: Duration,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "iss"]);
        validation.set_issuer(&[config.issuer.as_str()]);
        let ttl_secs = config.token_ttl_secs.min(MAX_TOKEN_TTL_SECS) as i64;
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            issuer: config.issuer.clone(),
            ttl: Duration::seconds(ttl_secs),
        }
    }

    pub fn issue(&self, email: &str) -> Result<String, TokenError> {
        self.issue_at(email, Utc::now())
    }

    /// Issue a token as if it were `now`.
    pub fn issue_at(&self, email: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = Claims {
            email: email.to_owned(),
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }

    /// Check signature, issuer and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(e),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(secret: &str) -> TokenService {
        TokenService::new(&AuthConfig {
            secret: secret.into(),
            ..AuthConfig::default()
        })
    }

    #[test]
    fn issued_token_verifies() {
        let tokens = service("k");
        let token = tokens.issue("ada@example.com").unwrap();
        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.email, "ada@example.com");
        assert_eq!(claims.iss, "ja");
        assert_eq!(claims.exp - claims.iat, 86_400);
    }

    #[test]
    fn expired_token_is_rejected() {
        let tokens = service("k");
        let token = tokens
            .issue_at("ada@example.com", Utc::now() - Duration::days(2))
            .unwrap();
        assert!(matches!(tokens.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = service("one").issue("ada@example.com").unwrap();
        assert!(matches!(service("two").verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn wrong_issuer_is_rejected() {
        let other = TokenService::new(&AuthConfig {
            issuer: "someone-else".into(),
            ..AuthConfig::default()
        });
        let token = other.issue("ada@example.com").unwrap();
        assert!(matches!(service(crate::config::DEFAULT_SECRET).verify(&token), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(service("k").verify("not.a.jwt").is_err());
    }
}
