// Core modules
pub mod organization;
pub mod partition;

// Re-export commonly used types
pub use organization::{
    is_valid_organization_name, AdminLogin, CreateOrganization, NewOrganization, Organization,
    OrganizationProfile, OrganizationUpdate, UpdateOrganization, MAX_ORGANIZATION_NAME_LENGTH,
};
pub use partition::{PartitionId, PARTITION_PREFIX};
