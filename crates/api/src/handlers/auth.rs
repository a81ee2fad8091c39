use crate::AppState;
use axum::{extract::State, http::StatusCode, Json};
use orgman_auth::AuthError;
use orgman_models::AdminLogin;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: &str, message: &str) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
        }
    }
}

/// Map a service failure onto a status code and a stable error body.
/// Credential and token failures share one generic response.
pub fn auth_error(err: AuthError) -> (StatusCode, Json<ErrorResponse>) {
    let (status, code, message) = match &err {
        AuthError::InvalidCredentials => (
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "Incorrect email or password".to_string(),
        ),
        AuthError::InvalidToken(_) => (
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            "Could not validate credentials".to_string(),
        ),
        AuthError::NameConflict(_) => (
            StatusCode::BAD_REQUEST,
            "name_conflict",
            "Organization name already exists".to_string(),
        ),
        AuthError::EmailConflict(_) => (
            StatusCode::BAD_REQUEST,
            "email_conflict",
            "Admin email is already registered to another organization".to_string(),
        ),
        AuthError::NotFound(_) => (
            StatusCode::NOT_FOUND,
            "not_found",
            "Organization not found".to_string(),
        ),
        AuthError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg.clone()),
        AuthError::InvalidInput(msg) | AuthError::ValidationError(msg) => {
            (StatusCode::BAD_REQUEST, "validation_error", msg.clone())
        }
        _ => {
            tracing::error!("Request failed: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Internal server error".to_string(),
            )
        }
    };

    (status, Json(ErrorResponse::new(code, &message)))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
    pub org_name: String,
    pub expires_in: i64,
}

/// Authenticate an organization admin and issue an access token
/// POST /admin/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AdminLogin>,
) -> Result<Json<LoginResponse>, (StatusCode, Json<ErrorResponse>)> {
    request.validate().map_err(|e| auth_error(e.into()))?;

    let org = state
        .organization_service
        .authenticate_admin(&request.email, &request.password)
        .await
        .map_err(auth_error)?;

    let access_token = state
        .jwt
        .issue(&org.organization_name)
        .map_err(auth_error)?;

    tracing::info!("Admin of {} logged in", org.organization_name);

    Ok(Json(LoginResponse {
        access_token,
        token_type: "bearer".to_string(),
        org_name: org.organization_name,
        expires_in: state.jwt.expires_in_seconds(),
    }))
}
