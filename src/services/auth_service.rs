//! Auth Service - registration, login and token checks without HTTP layer

use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, NewUser, User};
use crate::infrastructure::AppState;
use crate::infrastructure::auth::{Claims, create_jwt, decode_jwt, hash_password, verify_password};

/// Same message for unknown email and wrong password
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// What registration hands back; no token is issued until login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisteredUser {
    pub id: i32,
    pub username: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    pub token: String,
    pub user: User,
}

fn required<'a>(value: &'a str, field: &str) -> Result<&'a str, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(format!("{} is required", field)));
    }
    Ok(trimmed)
}

pub async fn register(
    state: &AppState,
    email: &str,
    password: &str,
    username: &str,
) -> Result<RegisteredUser, DomainError> {
    let email = required(email, "Email")?.to_lowercase();
    let username = required(username, "Username")?.to_string();
    if password.is_empty() {
        return Err(DomainError::validation("Password is required"));
    }

    if state.user_repo.find_by_email(&email).await?.is_some() {
        tracing::warn!("Registration rejected, email already in use: {}", email);
        return Err(DomainError::Conflict("User already exists".to_string()));
    }

    let password_hash = hash_password(password)?;
    let user = state
        .user_repo
        .create(NewUser {
            email,
            username,
            password_hash,
        })
        .await?;

    tracing::info!("Registered user {} ({})", user.id, user.username);
    Ok(RegisteredUser {
        id: user.id,
        username: user.username,
    })
}

pub async fn login(state: &AppState, email: &str, password: &str) -> Result<LoginOutcome, DomainError> {
    let email = email.trim().to_lowercase();
    tracing::info!("Login attempt for: {}", email);

    let Some(user) = state.user_repo.find_by_email(&email).await? else {
        tracing::warn!("Login failed, unknown email: {}", email);
        return Err(DomainError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    };

    if !verify_password(password, &user.password_hash)? {
        tracing::warn!("Login failed, bad password for user {}", user.id);
        return Err(DomainError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    let token = create_jwt(&state.config.jwt, user.id, &user.username)?;
    tracing::info!("User {} logged in", user.id);
    Ok(LoginOutcome { token, user })
}

pub fn validate_token(state: &AppState, token: &str) -> Result<Claims, DomainError> {
    if token.trim().is_empty() {
        return Err(DomainError::Unauthorized("No token provided".to_string()));
    }
    decode_jwt(&state.config.jwt, token.trim())
}
