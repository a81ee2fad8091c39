use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix shared by every tenant data partition.
pub const PARTITION_PREFIX: &str = "org_";

/// Identifier of a tenant's data partition inside the shared store.
///
/// Always derived from the owning organization's name, never built by hand,
/// so a rename of the organization yields exactly one new identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(transparent)]
#[sqlx(transparent)]
pub struct PartitionId(String);

impl PartitionId {
    pub fn for_organization(organization_name: &str) -> Self {
        Self(format!("{}{}", PARTITION_PREFIX, organization_name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Render as a double-quoted SQL identifier with embedded quotes escaped.
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0.replace('"', "\"\""))
    }
}

impl fmt::Display for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PartitionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derivation_is_deterministic() {
        assert_eq!(
            PartitionId::for_organization("acme"),
            PartitionId::for_organization("acme")
        );
        assert_eq!(PartitionId::for_organization("acme").as_str(), "org_acme");
        assert_ne!(
            PartitionId::for_organization("acme"),
            PartitionId::for_organization("beta")
        );
    }

    #[test]
    fn test_quoted_escapes_embedded_quotes() {
        let id = PartitionId::for_organization("we\"ird");
        assert_eq!(id.quoted(), "\"org_we\"\"ird\"");
        assert_eq!(PartitionId::for_organization("acme").quoted(), "\"org_acme\"");
    }
}
