use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::http::{HeaderMap, HeaderValue, header};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;
use crate::infrastructure::config::JwtConfig;

/// Name of the HTTP-only cookie carrying the session token
pub const TOKEN_COOKIE: &str = "token";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: i32,
    pub username: String,
    pub exp: usize,
}

pub fn hash_password(password: &str) -> Result<String, DomainError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| DomainError::Internal(e.to_string()))?
        .to_string();
    Ok(password_hash)
}

pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, DomainError> {
    let parsed_hash =
        PasswordHash::new(password_hash).map_err(|e| DomainError::Internal(e.to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub fn create_jwt(config: &JwtConfig, user_id: i32, username: &str) -> Result<String, DomainError> {
    let expiration = Utc::now()
        .checked_add_signed(config.expires_in)
        .ok_or_else(|| DomainError::Internal("token expiry overflow".to_string()))?
        .timestamp();

    let claims = Claims {
        user_id,
        username: username.to_owned(),
        exp: expiration as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| DomainError::Internal(e.to_string()))
}

pub fn decode_jwt(config: &JwtConfig, token: &str) -> Result<Claims, DomainError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!("Token rejected: {}", e);
        DomainError::Unauthorized("Invalid or expired token".to_string())
    })
}

/// Token from `Authorization: Bearer ...`, falling back to the `token` cookie
pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == TOKEN_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// `Set-Cookie` value storing the session token
pub fn session_cookie(token: &str, max_age: chrono::Duration) -> HeaderValue {
    let value = format!(
        "{}={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        TOKEN_COOKIE,
        token,
        max_age.num_seconds()
    );
    HeaderValue::from_str(&value).unwrap_or_else(|_| clear_cookie())
}

/// `Set-Cookie` value expiring the session token
pub fn clear_cookie() -> HeaderValue {
    HeaderValue::from_static("token=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt_config() -> JwtConfig {
        JwtConfig {
            secret: "unit-secret".to_string(),
            expires_in: chrono::Duration::hours(1),
        }
    }

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("hunter22").unwrap();
        assert_ne!(hash, "hunter22");
        assert!(verify_password("hunter22", &hash).unwrap());
        assert!(!verify_password("hunter23", &hash).unwrap());
    }

    #[test]
    fn jwt_carries_user_identity() {
        let config = jwt_config();
        let token = create_jwt(&config, 42, "reader").unwrap();
        let claims = decode_jwt(&config, &token).unwrap();
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.username, "reader");
    }

    #[test]
    fn jwt_with_wrong_secret_is_unauthorized() {
        let token = create_jwt(&jwt_config(), 1, "a").unwrap();
        let other = JwtConfig {
            secret: "other".to_string(),
            ..jwt_config()
        };
        assert!(matches!(
            decode_jwt(&other, &token),
            Err(DomainError::Unauthorized(_))
        ));
    }

    #[test]
    fn expired_jwt_is_unauthorized() {
        let config = JwtConfig {
            secret: "unit-secret".to_string(),
            expires_in: chrono::Duration::hours(-2),
        };
        let token = create_jwt(&config, 1, "a").unwrap();
        assert!(decode_jwt(&config, &token).is_err());
    }

    #[test]
    fn token_is_read_from_bearer_then_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; token=abc"));
        assert_eq!(token_from_headers(&headers).as_deref(), Some("abc"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer xyz"));
        assert_eq!(token_from_headers(&headers).as_deref(), Some("xyz"));
    }

    #[test]
    fn empty_cookie_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("token="));
        assert_eq!(token_from_headers(&headers), None);
    }
}
