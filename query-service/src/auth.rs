use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use crate::error::ApiError;
use crate::state::AppState;

/// Claims issued by the auth service. `exp` is enforced when present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,
}

#[derive(Debug, Error, PartialEq)]
pub enum AuthError {
    #[error("Token not provided")]
    Missing,

    #[error("Invalid token format. Use: Bearer <token>")]
    Malformed,

    #[error("Invalid token: {0}")]
    Invalid(String),
}

pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<Claims, AuthError>;
}

/// Verifies HMAC-signed (HS256/HS384/HS512) tokens against a shared secret.
pub struct HmacVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl HmacVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        validation.required_spec_claims = HashSet::new();
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

impl TokenVerifier for HmacVerifier {
    fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::Invalid(e.to_string()))
    }
}

/// Extracts `<token>` from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let header = match header {
        Some(h) if !h.is_empty() => h,
        _ => return Err(AuthError::Missing),
    };

    let mut parts = header.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) => Ok(token),
        _ => Err(AuthError::Malformed),
    }
}

pub struct AuthenticatedUser {
    pub claims: Claims,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .map(|value| value.to_str().map_err(|_| AuthError::Malformed))
            .transpose()?;

        let token = bearer_token(header)?;
        let claims = state.verifier.verify(token)?;
        Ok(AuthenticatedUser { claims })
    }
}
