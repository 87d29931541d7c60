//! Registration, login and session endpoints.
//!
//! Successful register, login and refresh set the httpOnly session cookies
//! as well as returning the tokens in the body.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use domain::models::user::{
    AuthResponse, LoginRequest, RefreshRequest, RegisterRequest, TokenResponse, UserResponse,
};
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::UserAuth;
use crate::services::AuthService;

fn auth_service(state: &AppState) -> AuthService {
    AuthService::new(state.pool.clone(), state.jwt.clone())
}

fn session_cookies(state: &AppState, tokens: &TokenResponse) -> HeaderMap {
    let mut headers = HeaderMap::new();
    state
        .cookies
        .set_session(&mut headers, &tokens.access_token, &tokens.refresh_token);
    headers
}

/// Body token first, then the refresh cookie.
fn refresh_token_from(
    state: &AppState,
    headers: &HeaderMap,
    body: Option<Json<RefreshRequest>>,
) -> Option<String> {
    body.and_then(|Json(req)| req.refresh_token)
        .filter(|t| !t.is_empty())
        .or_else(|| {
            state
                .cookies
                .extract_refresh_token(headers)
                .map(str::to_string)
        })
}

/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, HeaderMap, Json<AuthResponse>), ApiError> {
    request.validate()?;

    let response = auth_service(&state)
        .register(
            &request.email,
            &request.password,
            request.display_name.as_deref(),
        )
        .await?;

    let headers = session_cookies(&state, &response.tokens);
    Ok((StatusCode::CREATED, headers, Json(response)))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<(HeaderMap, Json<AuthResponse>), ApiError> {
    request.validate()?;

    let response = auth_service(&state)
        .login(&request.email, &request.password)
        .await?;

    let headers = session_cookies(&state, &response.tokens);
    Ok((headers, Json(response)))
}

/// POST /api/v1/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<RefreshRequest>>,
) -> Result<(HeaderMap, Json<TokenResponse>), ApiError> {
    let token = refresh_token_from(&state, &headers, body)
        .ok_or_else(|| ApiError::Unauthorized("Missing refresh token".to_string()))?;

    let tokens = auth_service(&state).refresh(&token).await?;

    let headers = session_cookies(&state, &tokens);
    Ok((headers, Json(tokens)))
}

/// POST /api/v1/auth/logout
///
/// Always clears the cookies; a missing or unknown token is not an error.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Option<Json<RefreshRequest>>,
) -> Result<(StatusCode, HeaderMap), ApiError> {
    if let Some(token) = refresh_token_from(&state, &headers, body) {
        auth_service(&state).logout(&token).await?;
    }

    let mut response_headers = HeaderMap::new();
    state.cookies.clear_session(&mut response_headers);
    Ok((StatusCode::NO_CONTENT, response_headers))
}

/// GET /api/v1/auth/me
pub async fn me(
    State(state): State<AppState>,
    auth: UserAuth,
) -> Result<Json<UserResponse>, ApiError> {
    Ok(Json(auth_service(&state).me(auth.user_id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_validation() {
        let valid = RegisterRequest {
            email: "recepcao@clinica.example".to_string(),
            password: "SecureP4ss".to_string(),
            display_name: Some("Clínica Bem Estar".to_string()),
        };
        assert!(valid.validate().is_ok());

        let bad_email = RegisterRequest {
            email: "not-an-email".to_string(),
            ..valid.clone()
        };
        assert!(bad_email.validate().is_err());

        let long_name = RegisterRequest {
            display_name: Some("A".repeat(101)),
            ..valid
        };
        assert!(long_name.validate().is_err());
    }
}
