use serde::Serialize;

use carehub_core::{TenantId, UserId};

use crate::{JwtClaims, Permission, Role};

/// A fully resolved principal for authorization decisions.
///
/// Derived once from validated claims and immutable for the rest of the
/// request. Permissions come from the static role table, never from the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub user_id: UserId,
    pub tenant_id: TenantId,
    pub role: Role,
    pub permissions: Vec<Permission>,
}

impl Principal {
    pub fn new(user_id: UserId, tenant_id: TenantId, role: Role) -> Self {
        Self {
            user_id,
            tenant_id,
            role,
            permissions: role.permissions(),
        }
    }

    pub fn from_claims(claims: &JwtClaims) -> Self {
        Self::new(claims.sub, claims.tenant_id, claims.role)
    }

    pub fn has_wildcard(&self) -> bool {
        self.permissions.iter().any(Permission::is_wildcard)
    }
}
