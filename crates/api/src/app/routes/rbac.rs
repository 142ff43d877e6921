//! RBAC audit endpoints.
//!
//! Visibility into roles and authorization decisions, to answer
//! "why was this request denied?".

use axum::{
    Json, Router,
    extract::{Extension, Query},
    routing::get,
};
use serde::Deserialize;
use serde_json::{Value, json};

use carehub_auth::{AuthorizationExplanation, Permission, Role, authorize, explain_authorization};

use crate::app::errors::ApiError;
use crate::context::PrincipalContext;

#[derive(Debug, Deserialize)]
pub struct ExplainQuery {
    pub permission: Option<String>,
}

pub fn router() -> Router {
    Router::new()
        .route("/roles", get(list_roles))
        .route("/explain", get(explain))
}

/// GET /rbac/roles - every role with its static permission set.
pub async fn list_roles(Extension(principal): Extension<PrincipalContext>) -> Result<Json<Value>, ApiError> {
    authorize(principal.principal(), &Permission::RBAC_READ)?;

    let roles: Vec<_> = Role::ALL.iter().map(Role::definition).collect();
    Ok(Json(json!({ "roles": roles })))
}

/// GET /rbac/explain?permission=patients.read - explain the caller's own decision.
pub async fn explain(
    Extension(principal): Extension<PrincipalContext>,
    Query(query): Query<ExplainQuery>,
) -> Result<Json<AuthorizationExplanation>, ApiError> {
    let permission = query
        .permission
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::Validation("permission is required".to_string()))?;

    Ok(Json(explain_authorization(principal.principal(), &Permission::new(permission))))
}
