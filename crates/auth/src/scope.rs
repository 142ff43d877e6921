//! Tenant scoping: the single gate between a principal and tenant data.

use carehub_core::TenantId;

use crate::{AuthzError, Principal};

/// Proof that a request has been constrained to exactly one tenant.
///
/// Resource services only accept a `TenantScope`, so every query they run
/// is filtered by the principal's tenant.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TenantScope {
    tenant_id: TenantId,
}

impl TenantScope {
    /// Scope a request to the principal's tenant.
    ///
    /// A request may name a tenant explicitly; naming any tenant other than
    /// the principal's is rejected.
    pub fn resolve(principal: &Principal, requested: Option<TenantId>) -> Result<Self, AuthzError> {
        let scope = Self {
            tenant_id: principal.tenant_id,
        };
        scope.ensure(requested)?;
        Ok(scope)
    }

    /// Re-check a tenant named later in the request (e.g. inside a body).
    pub fn ensure(&self, requested: Option<TenantId>) -> Result<(), AuthzError> {
        match requested {
            Some(requested) if requested != self.tenant_id => {
                tracing::warn!(
                    tenant_id = %self.tenant_id,
                    requested = %requested,
                    "cross-tenant request rejected"
                );
                Err(AuthzError::TenantMismatch { requested })
            }
            _ => Ok(()),
        }
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }
}
