//! Tenant-scoped entity trait: identity + owning tenant.

use crate::id::{RecordId, TenantId};

/// A record that always belongs to exactly one tenant.
///
/// The owning tenant is fixed at creation; stores and services use it to keep
/// every read and write inside a single tenant.
pub trait TenantScoped {
    /// Returns the record identifier.
    fn id(&self) -> RecordId;

    /// Returns the tenant that owns this record.
    fn tenant_id(&self) -> TenantId;
}
