use crate::error::{AuthError, Result};
use crate::password::PasswordHasher;
use orgman_database::{DatabaseError, TenantStore};
use orgman_models::{
    is_valid_organization_name, NewOrganization, Organization, OrganizationProfile,
    OrganizationUpdate, PartitionId,
};
use std::sync::Arc;

/// Result of a successful update
#[derive(Debug, Clone)]
pub enum UpdateOutcome {
    /// Name unchanged; admin email and password replaced in place
    DetailsUpdated(Organization),
    /// Organization renamed and its partition moved to the new identifier
    Renamed(Organization),
}

impl UpdateOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            UpdateOutcome::DetailsUpdated(_) => "Organization details updated",
            UpdateOutcome::Renamed(_) => {
                "Organization updated and data synced to new collection"
            }
        }
    }

    pub fn organization(&self) -> &Organization {
        match self {
            UpdateOutcome::DetailsUpdated(org) | UpdateOutcome::Renamed(org) => org,
        }
    }
}

/// Organization lifecycle manager.
///
/// Holds no mutable state of its own; all coordination happens through the
/// injected store, whose uniqueness constraints are the final word on
/// conflicting names and emails. Partition and metadata steps are separate
/// store calls with no transaction spanning them.
#[derive(Clone)]
pub struct OrganizationService {
    store: Arc<dyn TenantStore>,
}

impl OrganizationService {
    pub fn new(store: Arc<dyn TenantStore>) -> Self {
        Self { store }
    }

    /// Register a new organization together with its admin credentials and
    /// data partition.
    ///
    /// The metadata record is written before the partition is materialized,
    /// so a failure in between leaves a record whose partition is pending
    /// rather than an orphaned partition.
    pub async fn create_organization(
        &self,
        organization_name: &str,
        admin_email: &str,
        password: &str,
    ) -> Result<Organization> {
        Self::validate_name(organization_name)?;

        if self.store.find_by_name(organization_name).await?.is_some() {
            return Err(AuthError::NameConflict(organization_name.to_string()));
        }
        if self.store.find_by_email(admin_email).await?.is_some() {
            return Err(AuthError::EmailConflict(admin_email.to_string()));
        }

        let partition_id = PartitionId::for_organization(organization_name);
        let admin_password_hash = PasswordHasher::hash(password)?;

        let org = self
            .store
            .insert(&NewOrganization {
                organization_name: organization_name.to_string(),
                partition_id: partition_id.clone(),
                admin_email: admin_email.to_string(),
                admin_password_hash,
            })
            .await
            .map_err(|e| Self::write_error(e, organization_name, admin_email))?;

        self.store.create_partition(&partition_id).await.map_err(|e| {
            tracing::error!(
                "Organization {} stored but partition {} was not created: {}",
                organization_name,
                partition_id,
                e
            );
            AuthError::from(e)
        })?;

        tracing::info!(
            "Created organization {} with partition {}",
            organization_name,
            partition_id
        );

        Ok(org)
    }

    /// Fetch the public profile of an organization
    pub async fn get_organization(&self, organization_name: &str) -> Result<OrganizationProfile> {
        self.store
            .find_by_name(organization_name)
            .await?
            .map(OrganizationProfile::from)
            .ok_or_else(|| Self::not_found(organization_name))
    }

    /// Update the organization the caller is authenticated as.
    ///
    /// `authenticated_name` must come from a validated token, never from the
    /// request body; an organization can only ever update itself. When
    /// `new_name` differs, the partition is renamed before the metadata is
    /// rewritten. If the metadata write then fails, the partition rename is
    /// reverted on a best-effort basis.
    pub async fn update_organization(
        &self,
        authenticated_name: &str,
        new_name: &str,
        admin_email: &str,
        password: &str,
    ) -> Result<UpdateOutcome> {
        let current = self
            .store
            .find_by_name(authenticated_name)
            .await?
            .ok_or_else(|| Self::not_found(authenticated_name))?;

        if let Some(owner) = self.store.find_by_email(admin_email).await? {
            if owner.id != current.id {
                return Err(AuthError::EmailConflict(admin_email.to_string()));
            }
        }

        if new_name == authenticated_name {
            let org = self
                .store
                .update(
                    authenticated_name,
                    &OrganizationUpdate {
                        organization_name: current.organization_name.clone(),
                        partition_id: current.partition_id.clone(),
                        admin_email: admin_email.to_string(),
                        admin_password_hash: PasswordHasher::hash(password)?,
                    },
                )
                .await
                .map_err(|e| Self::write_error(e, authenticated_name, admin_email))?;

            tracing::info!("Updated details of organization {}", authenticated_name);
            return Ok(UpdateOutcome::DetailsUpdated(org));
        }

        Self::validate_name(new_name)?;

        if self.store.find_by_name(new_name).await?.is_some() {
            return Err(AuthError::NameConflict(new_name.to_string()));
        }

        let old_partition = current.partition_id.clone();
        let new_partition = PartitionId::for_organization(new_name);
        let admin_password_hash = PasswordHasher::hash(password)?;

        let moved = self
            .store
            .rename_partition(&old_partition, &new_partition)
            .await
            .map_err(|e| Self::write_error(e, new_name, admin_email))?;

        let update = OrganizationUpdate {
            organization_name: new_name.to_string(),
            partition_id: new_partition.clone(),
            admin_email: admin_email.to_string(),
            admin_password_hash,
        };

        match self.store.update(authenticated_name, &update).await {
            Ok(org) => {
                tracing::info!(
                    "Renamed organization {} to {} (partition {} -> {})",
                    authenticated_name,
                    new_name,
                    old_partition,
                    new_partition
                );
                Ok(UpdateOutcome::Renamed(org))
            }
            Err(e) => {
                tracing::error!(
                    "Metadata update for {} failed after partition rename: {}",
                    authenticated_name,
                    e
                );
                // Only undo a move we made; anything at the new identifier
                // otherwise belongs to someone else
                if !moved {
                    return Err(Self::write_error(e, new_name, admin_email));
                }
                if let Err(revert) = self
                    .store
                    .rename_partition(&new_partition, &old_partition)
                    .await
                {
                    tracing::error!(
                        "Could not revert partition {} to {}; organization {} now points at a missing partition: {}",
                        new_partition,
                        old_partition,
                        authenticated_name,
                        revert
                    );
                }
                Err(Self::write_error(e, new_name, admin_email))
            }
        }
    }

    /// Delete an organization and its data partition. Only the organization
    /// itself may do this.
    pub async fn delete_organization(
        &self,
        authenticated_name: &str,
        target_name: &str,
    ) -> Result<()> {
        if authenticated_name != target_name {
            tracing::warn!(
                "Organization {} attempted to delete {}",
                authenticated_name,
                target_name
            );
            return Err(AuthError::Forbidden(
                "Not authorized to delete this organization".to_string(),
            ));
        }

        let org = self
            .store
            .find_by_name(target_name)
            .await?
            .ok_or_else(|| Self::not_found(target_name))?;

        self.store.drop_partition(&org.partition_id).await?;

        if !self.store.delete(target_name).await? {
            return Err(Self::not_found(target_name));
        }

        tracing::info!(
            "Deleted organization {} and partition {}",
            target_name,
            org.partition_id
        );

        Ok(())
    }

    /// Check admin credentials. Unknown email and wrong password are
    /// indistinguishable to the caller.
    pub async fn authenticate_admin(&self, admin_email: &str, password: &str) -> Result<Organization> {
        let Some(org) = self.store.find_by_email(admin_email).await? else {
            PasswordHasher::verify_dummy(password);
            tracing::warn!("Login attempt for unknown admin email");
            return Err(AuthError::InvalidCredentials);
        };

        match PasswordHasher::verify(password, &org.admin_password_hash) {
            Ok(true) => {
                if PasswordHasher::needs_rehash(&org.admin_password_hash) {
                    tracing::debug!(
                        "Admin password hash of {} uses outdated parameters",
                        org.organization_name
                    );
                }
                Ok(org)
            }
            Ok(false) => {
                tracing::warn!("Invalid password for organization {}", org.organization_name);
                Err(AuthError::InvalidCredentials)
            }
            Err(e) => {
                tracing::error!(
                    "Stored password hash for {} is unreadable: {}",
                    org.organization_name,
                    e
                );
                Err(AuthError::InvalidCredentials)
            }
        }
    }

    fn validate_name(organization_name: &str) -> Result<()> {
        if !is_valid_organization_name(organization_name) {
            return Err(AuthError::InvalidInput(format!(
                "Invalid organization name: {:?}. Use 1-59 letters, digits, '-' or '_'",
                organization_name
            )));
        }
        Ok(())
    }

    fn not_found(organization_name: &str) -> AuthError {
        AuthError::NotFound(format!("Organization {} not found", organization_name))
    }

    fn write_error(err: DatabaseError, organization_name: &str, admin_email: &str) -> AuthError {
        match err {
            e if e.is_duplicate_email() => AuthError::EmailConflict(admin_email.to_string()),
            DatabaseError::DuplicateEntry(_) => {
                AuthError::NameConflict(organization_name.to_string())
            }
            DatabaseError::NotFound(_) => Self::not_found(organization_name),
            e => AuthError::DatabaseError(e),
        }
    }
}
