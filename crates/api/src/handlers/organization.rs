use crate::handlers::{auth_error, ErrorResponse};
use crate::middleware::AuthOrganization;
use crate::AppState;
use axum::{
    extract::{Extension, Query, State},
    http::StatusCode,
    Json,
};
use orgman_auth::UpdateOutcome;
use orgman_models::{CreateOrganization, OrganizationProfile, PartitionId, UpdateOrganization};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

#[derive(Debug, Deserialize)]
pub struct OrganizationQuery {
    pub organization_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateOrganizationResponse {
    pub message: String,
    pub collection: PartitionId,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateOrganizationResponse {
    pub message: String,
    /// Fresh token for the new name; only present after a rename
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
}

/// Register a new organization with its admin (Public)
/// POST /org/create
pub async fn create_organization(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateOrganization>,
) -> Result<Json<CreateOrganizationResponse>, (StatusCode, Json<ErrorResponse>)> {
    request.validate().map_err(|e| auth_error(e.into()))?;

    let org = state
        .organization_service
        .create_organization(&request.organization_name, &request.email, &request.password)
        .await
        .map_err(auth_error)?;

    Ok(Json(CreateOrganizationResponse {
        message: "Organization created successfully".to_string(),
        collection: org.partition_id,
    }))
}

/// Get organization by name (Public)
/// GET /org/get?organization_name=...
pub async fn get_organization(
    State(state): State<Arc<AppState>>,
    Query(query): Query<OrganizationQuery>,
) -> Result<Json<OrganizationProfile>, (StatusCode, Json<ErrorResponse>)> {
    let profile = state
        .organization_service
        .get_organization(&query.organization_name)
        .await
        .map_err(auth_error)?;

    Ok(Json(profile))
}

/// Update the caller's own organization (Protected)
/// PUT /org/update
pub async fn update_organization(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthOrganization>,
    Json(request): Json<UpdateOrganization>,
) -> Result<Json<UpdateOrganizationResponse>, (StatusCode, Json<ErrorResponse>)> {
    request.validate().map_err(|e| auth_error(e.into()))?;

    let outcome = state
        .organization_service
        .update_organization(
            &auth.organization_name,
            &request.organization_name,
            &request.email,
            &request.password,
        )
        .await
        .map_err(auth_error)?;

    // The caller's token names the old organization, which no longer exists
    let access_token = match &outcome {
        UpdateOutcome::Renamed(org) => {
            Some(state.jwt.issue(&org.organization_name).map_err(auth_error)?)
        }
        UpdateOutcome::DetailsUpdated(_) => None,
    };

    Ok(Json(UpdateOrganizationResponse {
        message: outcome.message().to_string(),
        access_token,
    }))
}

/// Delete the caller's own organization and its data (Protected)
/// DELETE /org/delete?organization_name=...
pub async fn delete_organization(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthOrganization>,
    Query(query): Query<OrganizationQuery>,
) -> Result<Json<MessageResponse>, (StatusCode, Json<ErrorResponse>)> {
    state
        .organization_service
        .delete_organization(&auth.organization_name, &query.organization_name)
        .await
        .map_err(auth_error)?;

    Ok(Json(MessageResponse {
        message: "Organization and associated data deleted".to_string(),
    }))
}
