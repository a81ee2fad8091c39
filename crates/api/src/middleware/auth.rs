use crate::handlers::{auth_error, ErrorResponse};
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use orgman_auth::AuthError;
use std::sync::Arc;

/// Identity of the caller, taken from a validated bearer token
#[derive(Debug, Clone)]
pub struct AuthOrganization {
    pub organization_name: String,
}

/// Extract the bearer token from the Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<String, (StatusCode, Json<ErrorResponse>)> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| auth_error(AuthError::InvalidToken("missing Authorization header".to_string())))?;

    auth_header
        .strip_prefix("Bearer ")
        .or_else(|| auth_header.strip_prefix("bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .ok_or_else(|| auth_error(AuthError::InvalidToken("Authorization header must use Bearer scheme".to_string())))
}

/// Middleware to require a valid admin token
pub async fn require_auth(
    State(state): State<Arc<crate::AppState>>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let token = extract_bearer_token(&headers)?;
    let organization_name = state.jwt.validate(&token).map_err(|e| {
        tracing::debug!("Token validation failed: {}", e);
        auth_error(e)
    })?;

    request
        .extensions_mut()
        .insert(AuthOrganization { organization_name });

    Ok(next.run(request).await)
}
