//! The authenticated tenant of a request.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use shared::jwt::{extract_user_id, JwtError, TokenType};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;

/// Identity carried by a valid access token. Every repository call is
/// scoped to `user_id`.
#[derive(Debug, Clone)]
pub struct UserAuth {
    pub user_id: Uuid,
    pub jti: String,
}

fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, ApiError> {
    match headers.get(AUTHORIZATION) {
        None => Ok(None),
        Some(value) => value
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(Some)
            .ok_or_else(|| {
                ApiError::Unauthorized("Invalid Authorization header format".to_string())
            }),
    }
}

/// Resolves the session from the `Authorization: Bearer` header, falling
/// back to the access token cookie.
pub fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<UserAuth, ApiError> {
    let token = match bearer_token(headers)? {
        Some(token) => token,
        None => state
            .cookies
            .extract_access_token(headers)
            .ok_or_else(|| ApiError::Unauthorized("Missing session".to_string()))?,
    };

    let claims = state
        .jwt
        .validate(token, TokenType::Access)
        .map_err(|e| match e {
            JwtError::TokenExpired => ApiError::Unauthorized("Session expired".to_string()),
            other => {
                tracing::debug!(error = %other, "Access token rejected");
                ApiError::Unauthorized("Invalid or expired token".to_string())
            }
        })?;

    let user_id = extract_user_id(&claims)
        .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))?;

    Ok(UserAuth {
        user_id,
        jti: claims.jti,
    })
}

#[async_trait]
impl FromRequestParts<AppState> for UserAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(auth) = parts.extensions.get::<UserAuth>() {
            return Ok(auth.clone());
        }
        authenticate(state, &parts.headers)
    }
}
