//! Account registration, login and session rotation.
//!
//! Refresh tokens are JWTs, but a token is only honoured while a session
//! row holds its SHA-256 hash. Rotation swaps the hash, so each refresh
//! token can be redeemed once; logout deletes the row.

use chrono::{Duration, Utc};
use domain::models::user::{normalize_email, AuthResponse, TokenResponse, UserResponse};
use domain::models::User;
use persistence::repositories::UserRepository;
use shared::crypto::sha256_hex;
use shared::jwt::{extract_user_id, JwtConfig, JwtError, TokenType};
use shared::password::{check_password_strength, hash_password, verify_password, PasswordError};
use sqlx::PgPool;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Email already registered")]
    EmailAlreadyExists,

    #[error("{0}")]
    WeakPassword(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("User is disabled")]
    UserDisabled,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("Token error: {0}")]
    TokenError(#[from] JwtError),

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::EmailAlreadyExists => ApiError::Conflict(err.to_string()),
            AuthError::WeakPassword(msg) => ApiError::Validation(msg),
            AuthError::InvalidCredentials
            | AuthError::UserNotFound
            | AuthError::InvalidRefreshToken => ApiError::Unauthorized(err.to_string()),
            AuthError::UserDisabled => ApiError::Forbidden(err.to_string()),
            AuthError::TokenError(e) => ApiError::Internal(format!("Token error: {}", e)),
            AuthError::PasswordError(e) => ApiError::Internal(format!("Password error: {}", e)),
            AuthError::DatabaseError(e) => ApiError::from(e),
        }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

pub struct AuthService {
    users: UserRepository,
    jwt: Arc<JwtConfig>,
}

impl AuthService {
    pub fn new(pool: PgPool, jwt: Arc<JwtConfig>) -> Self {
        Self {
            users: UserRepository::new(pool),
            jwt,
        }
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<AuthResponse, AuthError> {
        check_password_strength(password).map_err(AuthError::WeakPassword)?;

        let email = normalize_email(email);
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailAlreadyExists);
        }

        let password_hash = hash_password(password)?;
        let display_name = display_name.map(str::trim).filter(|n| !n.is_empty());

        let user: User = match self
            .users
            .create_user(&email, &password_hash, display_name)
            .await
        {
            Ok(entity) => entity.into(),
            // Lost a race with a concurrent registration for the same email.
            Err(e) if is_unique_violation(&e) => return Err(AuthError::EmailAlreadyExists),
            Err(e) => return Err(e.into()),
        };

        tracing::info!(user_id = %user.id, "User registered");
        let tokens = self.start_session(user.id).await?;
        Ok(AuthResponse {
            user: user.into(),
            tokens,
        })
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, AuthError> {
        let email = normalize_email(email);
        let user: User = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?
            .into();

        if !verify_password(password, &user.password_hash)? {
            tracing::debug!(user_id = %user.id, "Login rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }
        if !user.is_active {
            return Err(AuthError::UserDisabled);
        }

        self.users.update_last_login(user.id).await?;
        let tokens = self.start_session(user.id).await?;
        tracing::info!(user_id = %user.id, "User logged in");

        Ok(AuthResponse {
            user: user.into(),
            tokens,
        })
    }

    /// Exchanges a refresh token for a new pair, invalidating the old one.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, AuthError> {
        let claims = self
            .jwt
            .validate(refresh_token, TokenType::Refresh)
            .map_err(|_| AuthError::InvalidRefreshToken)?;
        let user_id = extract_user_id(&claims).map_err(|_| AuthError::InvalidRefreshToken)?;

        let user: User = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::InvalidRefreshToken)?
            .into();
        if !user.is_active {
            return Err(AuthError::UserDisabled);
        }

        let access = self.jwt.issue_access_token(user_id)?;
        let refresh = self.jwt.issue_refresh_token(user_id)?;

        let session = self
            .users
            .rotate_session(
                &sha256_hex(refresh_token),
                &sha256_hex(&refresh.token),
                self.refresh_expiry(),
            )
            .await?
            .ok_or(AuthError::InvalidRefreshToken)?;

        if session.user_id != user_id {
            tracing::warn!(user_id = %user_id, "Refresh token bound to another account");
            return Err(AuthError::InvalidRefreshToken);
        }

        Ok(TokenResponse::bearer(
            access.token,
            refresh.token,
            access.expires_in,
        ))
    }

    /// Revokes the session of a refresh token. Unknown tokens are ignored.
    pub async fn logout(&self, refresh_token: &str) -> Result<(), AuthError> {
        let removed = self
            .users
            .delete_session_by_refresh_hash(&sha256_hex(refresh_token))
            .await?;
        tracing::debug!(removed, "Logout");
        Ok(())
    }

    pub async fn me(&self, user_id: Uuid) -> Result<UserResponse, AuthError> {
        let user: User = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?
            .into();
        if !user.is_active {
            return Err(AuthError::UserDisabled);
        }
        Ok(user.into())
    }

    async fn start_session(&self, user_id: Uuid) -> Result<TokenResponse, AuthError> {
        let access = self.jwt.issue_access_token(user_id)?;
        let refresh = self.jwt.issue_refresh_token(user_id)?;

        self.users
            .create_session(user_id, &sha256_hex(&refresh.token), self.refresh_expiry())
            .await?;

        Ok(TokenResponse::bearer(
            access.token,
            refresh.token,
            access.expires_in,
        ))
    }

    fn refresh_expiry(&self) -> chrono::DateTime<Utc> {
        Utc::now() + Duration::seconds(self.jwt.refresh_token_expiry_secs)
    }
}
