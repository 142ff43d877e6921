use chrono::{DateTime, Utc};

use carehub_auth::{AuthenticatedSession, Principal, TenantScope, TokenId};
use carehub_core::TenantId;

/// Tenant context for a request.
///
/// Immutable, resolved once by the auth middleware, present on every
/// protected route.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TenantContext {
    scope: TenantScope,
}

impl TenantContext {
    pub fn new(scope: TenantScope) -> Self {
        Self { scope }
    }

    pub fn scope(&self) -> &TenantScope {
        &self.scope
    }

    pub fn tenant_id(&self) -> TenantId {
        self.scope.tenant_id()
    }
}

/// Principal context for a request (authenticated identity + role).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    session: AuthenticatedSession,
}

impl PrincipalContext {
    pub fn new(session: AuthenticatedSession) -> Self {
        Self { session }
    }

    pub fn principal(&self) -> &Principal {
        &self.session.principal
    }

    pub fn token_id(&self) -> TokenId {
        self.session.token_id
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.session.expires_at
    }
}
