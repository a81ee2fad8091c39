use crate::error::{DatabaseError, Result};
use crate::store::TenantStore;
use async_trait::async_trait;
use chrono::Utc;
use orgman_models::{NewOrganization, Organization, OrganizationUpdate, PartitionId};
use sqlx::PgPool;
use uuid::Uuid;

const UNDEFINED_TABLE: &str = "42P01";
const DUPLICATE_TABLE: &str = "42P07";

/// PostgreSQL-backed tenant store.
///
/// Metadata lives in the `organizations` table; each tenant partition is a
/// table of its own named after its `PartitionId`.
#[derive(Clone)]
pub struct PgTenantStore {
    pool: PgPool,
}

impl PgTenantStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the metadata table and its uniqueness constraints if missing.
    /// The unique constraints are the authority for name and email
    /// uniqueness; application-level checks only produce friendlier errors.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS organizations (
                id UUID PRIMARY KEY,
                organization_name TEXT NOT NULL,
                partition_id TEXT NOT NULL,
                admin_email TEXT NOT NULL,
                admin_password_hash TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
                CONSTRAINT organizations_organization_name_key UNIQUE (organization_name),
                CONSTRAINT organizations_admin_email_key UNIQUE (admin_email)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl TenantStore for PgTenantStore {
    async fn find_by_name(&self, organization_name: &str) -> Result<Option<Organization>> {
        let org = sqlx::query_as::<_, Organization>(
            "SELECT * FROM organizations WHERE organization_name = $1",
        )
        .bind(organization_name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(org)
    }

    async fn find_by_email(&self, admin_email: &str) -> Result<Option<Organization>> {
        let org = sqlx::query_as::<_, Organization>(
            r#"
            SELECT * FROM organizations
            WHERE admin_email = $1
            ORDER BY created_at
            LIMIT 1
            "#,
        )
        .bind(admin_email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(org)
    }

    async fn insert(&self, new_org: &NewOrganization) -> Result<Organization> {
        let org = sqlx::query_as::<_, Organization>(
            r#"
            INSERT INTO organizations
                (id, organization_name, partition_id, admin_email, admin_password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new_org.organization_name)
        .bind(&new_org.partition_id)
        .bind(&new_org.admin_email)
        .bind(&new_org.admin_password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_write)?;

        Ok(org)
    }

    async fn update(
        &self,
        current_name: &str,
        update: &OrganizationUpdate,
    ) -> Result<Organization> {
        let org = sqlx::query_as::<_, Organization>(
            r#"
            UPDATE organizations
            SET organization_name = $2,
                partition_id = $3,
                admin_email = $4,
                admin_password_hash = $5,
                updated_at = $6
            WHERE organization_name = $1
            RETURNING *
            "#,
        )
        .bind(current_name)
        .bind(&update.organization_name)
        .bind(&update.partition_id)
        .bind(&update.admin_email)
        .bind(&update.admin_password_hash)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_write)?
        .ok_or_else(|| DatabaseError::not_found("Organization", current_name))?;

        Ok(org)
    }

    async fn delete(&self, organization_name: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM organizations WHERE organization_name = $1")
            .bind(organization_name)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn create_partition(&self, partition: &PartitionId) -> Result<()> {
        let sql = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                document JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
            partition.quoted()
        );
        sqlx::query(&sql).execute(&self.pool).await?;

        Ok(())
    }

    async fn rename_partition(&self, from: &PartitionId, to: &PartitionId) -> Result<bool> {
        // One statement, so the existence check and the move are atomic
        let sql = format!("ALTER TABLE {} RENAME TO {}", from.quoted(), to.quoted());

        match sqlx::query(&sql).execute(&self.pool).await {
            Ok(_) => Ok(true),
            Err(sqlx::Error::Database(db_err))
                if db_err.code().as_deref() == Some(UNDEFINED_TABLE) =>
            {
                tracing::warn!(
                    "Partition {} does not exist, skipping rename to {}",
                    from,
                    to
                );
                Ok(false)
            }
            Err(sqlx::Error::Database(db_err))
                if db_err.code().as_deref() == Some(DUPLICATE_TABLE) =>
            {
                Err(DatabaseError::duplicate("Partition", to.as_str()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn drop_partition(&self, partition: &PartitionId) -> Result<()> {
        let sql = format!("DROP TABLE IF EXISTS {}", partition.quoted());
        sqlx::query(&sql).execute(&self.pool).await?;

        Ok(())
    }

    async fn partition_exists(&self, partition: &PartitionId) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT to_regclass($1) IS NOT NULL")
            .bind(partition.quoted())
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{Database, DatabaseConfig};

    async fn store() -> PgTenantStore {
        let config = DatabaseConfig::from_env().expect("database config");
        Database::connect(&config)
            .await
            .expect("Failed to connect to database")
            .into_tenant_store()
            .await
            .expect("Failed to create schema")
    }

    fn new_org(name: &str, email: &str) -> NewOrganization {
        NewOrganization {
            organization_name: name.to_string(),
            partition_id: PartitionId::for_organization(name),
            admin_email: email.to_string(),
            admin_password_hash: "hash".to_string(),
        }
    }

    #[tokio::test]
    #[ignore] // Only run with database available
    async fn test_duplicate_name_rejected_by_constraint() {
        let store = store().await;
        let name = format!("pgtest-{}", &Uuid::new_v4().simple().to_string()[..8]);

        store
            .insert(&new_org(&name, &format!("{}@x.com", name)))
            .await
            .expect("first insert");
        let err = store
            .insert(&new_org(&name, &format!("other-{}@x.com", name)))
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::DuplicateEntry(_)));

        store.delete(&name).await.expect("cleanup");
    }

    #[tokio::test]
    #[ignore] // Only run with database available
    async fn test_partition_rename_and_drop_tolerate_absence() {
        let store = store().await;
        let missing = PartitionId::for_organization(&format!("missing-{}", Uuid::new_v4().simple()));
        let target = PartitionId::for_organization(&format!("target-{}", Uuid::new_v4().simple()));

        assert!(!store.rename_partition(&missing, &target).await.expect("rename"));
        store.drop_partition(&missing).await.expect("drop");
        assert!(!store.partition_exists(&target).await.unwrap());
    }
}
