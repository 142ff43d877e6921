use serde::Serialize;
use thiserror::Error;

use carehub_core::{TenantId, UserId};

use crate::{Permission, Principal, Role};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("tenant mismatch: request names tenant {requested}")]
    TenantMismatch { requested: TenantId },

    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),
}

/// Check that `principal` holds `required`.
///
/// - No IO
/// - No panics
/// - No business logic (pure policy check)
pub fn authorize(principal: &Principal, required: &Permission) -> Result<(), AuthzError> {
    let granted = principal
        .permissions
        .iter()
        .any(|p| p.is_wildcard() || p == required);

    if granted {
        Ok(())
    } else {
        tracing::debug!(
            user_id = %principal.user_id,
            role = %principal.role,
            permission = %required,
            "permission denied"
        );
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Authorization Explanation (Audit Trail)
// ─────────────────────────────────────────────────────────────────────────────

/// Detailed explanation of an authorization decision.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorizationExplanation {
    pub required_permission: String,
    pub granted: bool,
    pub reason: String,
    pub user_id: UserId,
    pub tenant_id: TenantId,
    pub role: Role,
    pub effective_permissions: Vec<String>,
    /// Roles whose static permission set would grant the request.
    pub granting_roles: Vec<Role>,
}

/// Explain why an authorization decision was made (or would be made).
pub fn explain_authorization(principal: &Principal, required: &Permission) -> AuthorizationExplanation {
    let mut effective: Vec<String> = principal
        .permissions
        .iter()
        .map(|p| p.as_str().to_string())
        .collect();
    effective.sort();

    let granted = authorize(principal, required).is_ok();
    let reason = if !granted {
        format!(
            "role {} does not grant '{}'",
            principal.role,
            required.as_str()
        )
    } else if principal.has_wildcard() {
        format!("role {} holds the wildcard permission '*'", principal.role)
    } else {
        format!("role {} grants '{}'", principal.role, required.as_str())
    };

    let granting_roles = Role::ALL
        .into_iter()
        .filter(|role| {
            role.permissions()
                .iter()
                .any(|p| p.is_wildcard() || p == required)
        })
        .collect();

    AuthorizationExplanation {
        required_permission: required.as_str().to_string(),
        granted,
        reason,
        user_id: principal.user_id,
        tenant_id: principal.tenant_id,
        role: principal.role,
        effective_permissions: effective,
        granting_roles,
    }
}
