//! In-process tenant store.
//!
//! Honors the same contract as the PostgreSQL store, including name and
//! email uniqueness, which is checked under the write lock so concurrent
//! inserts cannot both succeed.

use crate::error::{DatabaseError, Result};
use crate::store::TenantStore;
use async_trait::async_trait;
use chrono::Utc;
use orgman_models::{NewOrganization, Organization, OrganizationUpdate, PartitionId};
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct MemoryState {
    organizations: HashMap<String, Organization>,
    partitions: HashSet<PartitionId>,
}

impl MemoryState {
    fn email_taken(&self, admin_email: &str, except: Option<Uuid>) -> bool {
        self.organizations
            .values()
            .any(|org| org.admin_email == admin_email && Some(org.id) != except)
    }
}

#[derive(Default)]
pub struct InMemoryTenantStore {
    state: RwLock<MemoryState>,
}

impl InMemoryTenantStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn organization_count(&self) -> usize {
        self.state.read().await.organizations.len()
    }
}

#[async_trait]
impl TenantStore for InMemoryTenantStore {
    async fn find_by_name(&self, organization_name: &str) -> Result<Option<Organization>> {
        Ok(self
            .state
            .read()
            .await
            .organizations
            .get(organization_name)
            .cloned())
    }

    async fn find_by_email(&self, admin_email: &str) -> Result<Option<Organization>> {
        let state = self.state.read().await;
        let org = state
            .organizations
            .values()
            .filter(|org| org.admin_email == admin_email)
            .min_by_key(|org| org.created_at)
            .cloned();

        Ok(org)
    }

    async fn insert(&self, new_org: &NewOrganization) -> Result<Organization> {
        let mut state = self.state.write().await;

        if state.organizations.contains_key(&new_org.organization_name) {
            return Err(DatabaseError::duplicate("Organization", "organization_name"));
        }
        if state.email_taken(&new_org.admin_email, None) {
            return Err(DatabaseError::duplicate("Organization", "admin_email"));
        }

        let now = Utc::now();
        let org = Organization {
            id: Uuid::new_v4(),
            organization_name: new_org.organization_name.clone(),
            partition_id: new_org.partition_id.clone(),
            admin_email: new_org.admin_email.clone(),
            admin_password_hash: new_org.admin_password_hash.clone(),
            created_at: now,
            updated_at: now,
        };
        state
            .organizations
            .insert(org.organization_name.clone(), org.clone());

        Ok(org)
    }

    async fn update(
        &self,
        current_name: &str,
        update: &OrganizationUpdate,
    ) -> Result<Organization> {
        let mut state = self.state.write().await;

        let existing_id = state
            .organizations
            .get(current_name)
            .map(|org| org.id)
            .ok_or_else(|| DatabaseError::not_found("Organization", current_name))?;

        if update.organization_name != current_name
            && state.organizations.contains_key(&update.organization_name)
        {
            return Err(DatabaseError::duplicate("Organization", "organization_name"));
        }
        if state.email_taken(&update.admin_email, Some(existing_id)) {
            return Err(DatabaseError::duplicate("Organization", "admin_email"));
        }

        let mut org = state
            .organizations
            .remove(current_name)
            .ok_or_else(|| DatabaseError::not_found("Organization", current_name))?;
        org.organization_name = update.organization_name.clone();
        org.partition_id = update.partition_id.clone();
        org.admin_email = update.admin_email.clone();
        org.admin_password_hash = update.admin_password_hash.clone();
        org.updated_at = Utc::now();

        state
            .organizations
            .insert(org.organization_name.clone(), org.clone());

        Ok(org)
    }

    async fn delete(&self, organization_name: &str) -> Result<bool> {
        Ok(self
            .state
            .write()
            .await
            .organizations
            .remove(organization_name)
            .is_some())
    }

    async fn create_partition(&self, partition: &PartitionId) -> Result<()> {
        self.state.write().await.partitions.insert(partition.clone());
        Ok(())
    }

    async fn rename_partition(&self, from: &PartitionId, to: &PartitionId) -> Result<bool> {
        let mut state = self.state.write().await;

        if !state.partitions.contains(from) {
            tracing::warn!(
                "Partition {} does not exist, skipping rename to {}",
                from,
                to
            );
            return Ok(false);
        }
        if state.partitions.contains(to) {
            return Err(DatabaseError::duplicate("Partition", to.as_str()));
        }

        state.partitions.remove(from);
        state.partitions.insert(to.clone());
        Ok(true)
    }

    async fn drop_partition(&self, partition: &PartitionId) -> Result<()> {
        self.state.write().await.partitions.remove(partition);
        Ok(())
    }

    async fn partition_exists(&self, partition: &PartitionId) -> Result<bool> {
        Ok(self.state.read().await.partitions.contains(partition))
    }
}
