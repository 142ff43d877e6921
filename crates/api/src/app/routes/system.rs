use axum::{Json, extract::Extension, http::StatusCode};
use serde_json::{Value, json};

use crate::context::{PrincipalContext, TenantContext};

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> Json<Value> {
    let p = principal.principal();
    Json(json!({
        "userId": p.user_id,
        "tenantId": tenant.tenant_id(),
        "role": p.role,
        "permissions": p.permissions,
        "tokenId": principal.token_id(),
        "expiresAt": principal.expires_at(),
    }))
}
