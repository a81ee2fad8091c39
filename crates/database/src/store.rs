//! Capability surface over the shared document store.
//!
//! Implementations perform no business validation. The one behavioural
//! requirement beyond plain I/O: `rename_partition` and `drop_partition`
//! succeed when the partition does not exist, since stores may defer
//! materializing a partition until its first write. Any other failure is
//! returned to the caller.

use crate::error::Result;
use async_trait::async_trait;
use orgman_models::{NewOrganization, Organization, OrganizationUpdate, PartitionId};

#[async_trait]
pub trait TenantStore: Send + Sync {
    /// Look up an organization record by its unique name
    async fn find_by_name(&self, organization_name: &str) -> Result<Option<Organization>>;

    /// Look up the first organization record administered by `admin_email`
    async fn find_by_email(&self, admin_email: &str) -> Result<Option<Organization>>;

    /// Insert a metadata record. Fails with `DuplicateEntry` when the name or
    /// admin email is already taken.
    async fn insert(&self, new_org: &NewOrganization) -> Result<Organization>;

    /// Replace the mutable fields of the record currently named
    /// `current_name` in a single mutation.
    async fn update(&self, current_name: &str, update: &OrganizationUpdate)
        -> Result<Organization>;

    /// Remove a metadata record, returning whether one existed
    async fn delete(&self, organization_name: &str) -> Result<bool>;

    /// Materialize a partition if it does not exist yet
    async fn create_partition(&self, partition: &PartitionId) -> Result<()>;

    /// Move a partition to a new identifier. Returns `false` when `from` did
    /// not exist and nothing was moved; fails if `to` is already taken.
    async fn rename_partition(&self, from: &PartitionId, to: &PartitionId) -> Result<bool>;

    async fn drop_partition(&self, partition: &PartitionId) -> Result<()>;

    async fn partition_exists(&self, partition: &PartitionId) -> Result<bool>;
}
