use crate::partition::PartitionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Longest accepted organization name. Keeps `org_<name>` within the
/// 63-byte identifier limit of the backing store.
pub const MAX_ORGANIZATION_NAME_LENGTH: usize = 59;

lazy_static::lazy_static! {
    static ref ORGANIZATION_NAME_REGEX: regex::Regex =
        regex::Regex::new(r"^[A-Za-z0-9_-]{1,59}$").unwrap();
}

/// Whether `name` may be used as an organization name (and thus inside a
/// partition identifier).
pub fn is_valid_organization_name(name: &str) -> bool {
    ORGANIZATION_NAME_REGEX.is_match(name)
}

/// Organization metadata record, one per tenant.
#[derive(Debug, Clone, FromRow)]
pub struct Organization {
    pub id: Uuid,
    pub organization_name: String,
    pub partition_id: PartitionId,
    pub admin_email: String,
    pub admin_password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Outward view of an organization. Carries no credential material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizationProfile {
    pub id: Uuid,
    pub organization_name: String,
    #[serde(rename = "collection_name")]
    pub partition_id: PartitionId,
    pub admin_email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Organization> for OrganizationProfile {
    fn from(org: Organization) -> Self {
        Self {
            id: org.id,
            organization_name: org.organization_name,
            partition_id: org.partition_id,
            admin_email: org.admin_email,
            created_at: org.created_at,
            updated_at: org.updated_at,
        }
    }
}

/// Record to insert into the metadata collection
#[derive(Debug, Clone)]
pub struct NewOrganization {
    pub organization_name: String,
    pub partition_id: PartitionId,
    pub admin_email: String,
    pub admin_password_hash: String,
}

/// Full replacement of an organization's mutable fields, applied as a single
/// record mutation.
#[derive(Debug, Clone)]
pub struct OrganizationUpdate {
    pub organization_name: String,
    pub partition_id: PartitionId,
    pub admin_email: String,
    pub admin_password_hash: String,
}

/// Create organization request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateOrganization {
    #[validate(
        length(min = 1, max = 59),
        regex(path = *ORGANIZATION_NAME_REGEX, message = "may only contain letters, digits, '-' and '_'")
    )]
    pub organization_name: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

/// Update organization request. `organization_name` is the desired name,
/// which may equal the current one.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateOrganization {
    #[validate(
        length(min = 1, max = 59),
        regex(path = *ORGANIZATION_NAME_REGEX, message = "may only contain letters, digits, '-' and '_'")
    )]
    pub organization_name: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

/// Admin login request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AdminLogin {
    #[validate(email)]
    pub email: String,

    pub password: String,
}
