//! Tenant descriptor as reported by the chat service.

use serde::{Deserialize, Serialize};

use super::TenantId;

/// Identity and display metadata of a tenant.
///
/// A [`crate::host::Host`] holds one of these and forwards `id` and `name`
/// from it; it never stands in for the tenant object itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantDescriptor {
    /// Tenant identifier.
    pub id: TenantId,
    /// Human-readable tenant name.
    pub name: String,
}

impl TenantDescriptor {
    /// Creates a descriptor.
    #[must_use]
    pub fn new(id: TenantId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}
