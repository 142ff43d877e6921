//! Token revocation endpoints.
//!
//! Each recorded revocation also prunes records whose token has expired.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::Extension,
    http::StatusCode,
    routing::post,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use carehub_auth::{Permission, RevocationStore, RevokedToken, TokenId, authorize};
use carehub_core::UserId;

use crate::app::errors::ApiError;
use crate::app::routes::body::{json_object, take_body_tenant};
use crate::app::services::AppServices;
use crate::context::{PrincipalContext, TenantContext};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokeRequest {
    pub token_id: TokenId,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
    pub reason: Option<String>,
}

pub fn router() -> Router {
    Router::new()
        .route("/logout", post(logout))
        .route("/revoke", post(revoke))
}

/// POST /auth/logout - revoke the caller's own token.
pub async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
) -> Result<StatusCode, ApiError> {
    let record = RevokedToken {
        token_id: principal.token_id(),
        user_id: principal.principal().user_id,
        tenant_id: tenant.tenant_id(),
        revoked: true,
        reason: Some("logout".to_string()),
        expires_at: principal.expires_at(),
    };
    record_revocation(services.revocations.as_ref(), record).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /auth/revoke - revoke any token of the caller's tenant.
pub async fn revoke(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    body: Bytes,
) -> Result<(StatusCode, Json<RevokedToken>), ApiError> {
    authorize(principal.principal(), &Permission::AUTH_REVOKE)?;

    let mut body = json_object(&body)?;
    tenant.scope().ensure(take_body_tenant(&mut body)?)?;
    let request: RevokeRequest = serde_json::from_value(Value::Object(body))
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let record = RevokedToken {
        token_id: request.token_id,
        user_id: request.user_id,
        tenant_id: tenant.tenant_id(),
        revoked: true,
        reason: request.reason,
        expires_at: request.expires_at,
    };
    record_revocation(services.revocations.as_ref(), record.clone()).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn record_revocation(store: &dyn RevocationStore, record: RevokedToken) -> Result<(), ApiError> {
    let (tenant_id, token_id) = (record.tenant_id, record.token_id);
    store.revoke(record).await?;
    tracing::info!(tenant_id = %tenant_id, token_id = %token_id, "token revoked");

    match store.prune_expired(Utc::now()).await {
        Ok(0) => {}
        Ok(pruned) => tracing::debug!(pruned, "pruned expired revocations"),
        Err(e) => tracing::warn!(error = %e, "failed to prune expired revocations"),
    }
    Ok(())
}
