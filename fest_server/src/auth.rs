//! Admin authentication.
//!
//! The organisers share a single password. Logging in with it yields a short-lived HS256 JWT, which the dashboard then
//! presents as `Authorization: Bearer <token>` on every admin request. The password itself never travels again after
//! login, and tokens expire on their own.
use chrono::Utc;
use fest_common::Secret;
use hmac::{Hmac, Mac};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::*;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::{config::AuthConfig, errors::AuthError};

pub const ADMIN_SUBJECT: &str = "admin";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

pub struct TokenIssuer {
    admin_password: Secret<String>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    token_ttl: chrono::Duration,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.reveal().as_bytes();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation.sub = Some(ADMIN_SUBJECT.to_string());
        validation.leeway = 0;
        Self {
            admin_password: config.admin_password.clone(),
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            token_ttl: config.token_ttl,
        }
    }

    /// Compares the supplied password with the configured one without leaking, through timing, how much of it
    /// matched. A blank configured password matches nothing.
    pub fn check_password(&self, candidate: &str) -> Result<(), AuthError> {
        if self.admin_password.is_blank() || candidate.is_empty() {
            return Err(AuthError::InvalidPassword);
        }
        let key = self.admin_password.reveal().as_bytes();
        let mut expected =
            Hmac::<Sha256>::new_from_slice(key).map_err(|e| AuthError::TokenIssueError(e.to_string()))?;
        expected.update(key);
        let mut supplied =
            Hmac::<Sha256>::new_from_slice(key).map_err(|e| AuthError::TokenIssueError(e.to_string()))?;
        supplied.update(candidate.as_bytes());
        expected.verify_slice(&supplied.finalize().into_bytes()).map_err(|_| AuthError::InvalidPassword)
    }

    pub fn issue_token(&self) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = AdminClaims {
            sub: ADMIN_SUBJECT.to_string(),
            iat: now.timestamp(),
            exp: (now + self.token_ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenIssueError(e.to_string()))
    }

    pub fn validate_token(&self, token: &str) -> Result<AdminClaims, AuthError> {
        let data = decode::<AdminClaims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            debug!("🔐️ Rejected admin token. {e}");
            AuthError::InvalidToken
        })?;
        Ok(data.claims)
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let value = header.map(str::trim).filter(|s| !s.is_empty()).ok_or(AuthError::MissingToken)?;
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))
        .map(str::trim)
        .ok_or(AuthError::MissingToken)?;
    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}
