use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use carehub_auth::{Authenticator, TenantScope};
use carehub_core::TenantId;

use crate::app::errors::ApiError;
use crate::app::routes::body::take_query_tenants;
use crate::context::{PrincipalContext, TenantContext};

/// Header a client may use to name the tenant it is acting on.
pub const TENANT_HEADER: &str = "x-tenant-id";

#[derive(Clone)]
pub struct AuthState {
    pub authenticator: Arc<Authenticator>,
}

/// Authenticate the bearer token, resolve the tenant scope and attach both
/// contexts to the request.
///
/// Every tenant the request names in `X-Tenant-Id` or a `tenantId` query
/// parameter must be the principal's own.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(req.headers())?;

    let session = state.authenticator.authenticate(token, Utc::now()).await?;

    let mut requested = requested_tenants(&req)?.into_iter();
    let scope = TenantScope::resolve(&session.principal, requested.next())?;
    for tenant_id in requested {
        scope.ensure(Some(tenant_id))?;
    }

    req.extensions_mut().insert(TenantContext::new(scope));
    req.extensions_mut().insert(PrincipalContext::new(session));

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, ApiError> {
    let missing = || ApiError::Unauthenticated("missing bearer token".to_string());

    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(missing)?;

    let header = header.to_str().map_err(|_| missing())?;

    let header = header.strip_prefix("Bearer ").ok_or_else(missing)?;

    let token = header.trim();
    if token.is_empty() {
        return Err(missing());
    }

    Ok(token)
}

fn requested_tenant(headers: &HeaderMap) -> Result<Option<TenantId>, ApiError> {
    let Some(value) = headers.get(TENANT_HEADER) else {
        return Ok(None);
    };
    let raw = value
        .to_str()
        .map_err(|_| ApiError::Validation("X-Tenant-Id must be a UUID".to_string()))?;
    parse_tenant_id(raw).map(Some)
}

fn requested_tenants<B>(req: &Request<B>) -> Result<Vec<TenantId>, ApiError> {
    let Query(mut params) = Query::<Vec<(String, String)>>::try_from_uri(req.uri())
        .map_err(|_| ApiError::Validation("malformed query string".to_string()))?;

    let mut requested: Vec<TenantId> = requested_tenant(req.headers())?.into_iter().collect();
    requested.extend(take_query_tenants(&mut params)?);
    Ok(requested)
}

/// Parse a client-supplied tenant id.
pub fn parse_tenant_id(raw: &str) -> Result<TenantId, ApiError> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::Validation("tenantId must be a UUID".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_is_required() {
        let mut headers = HeaderMap::new();
        assert!(extract_bearer(&headers).is_err());

        headers.insert("authorization", HeaderValue::from_static("Basic abc"));
        assert!(extract_bearer(&headers).is_err());

        headers.insert("authorization", HeaderValue::from_static("Bearer   "));
        assert!(extract_bearer(&headers).is_err());

        headers.insert("authorization", HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(extract_bearer(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn tenant_header_is_optional_but_must_parse() {
        let mut headers = HeaderMap::new();
        assert_eq!(requested_tenant(&headers).unwrap(), None);

        headers.insert(TENANT_HEADER, HeaderValue::from_static("not-a-uuid"));
        assert!(matches!(requested_tenant(&headers), Err(ApiError::Validation(_))));

        let tenant = TenantId::new();
        headers.insert(TENANT_HEADER, HeaderValue::from_str(&tenant.to_string()).unwrap());
        assert_eq!(requested_tenant(&headers).unwrap(), Some(tenant));
    }

    fn request(uri: &str) -> Request<()> {
        Request::builder().uri(uri).body(()).unwrap()
    }

    #[test]
    fn header_and_query_tenants_are_all_collected() {
        let own = TenantId::new();
        let foreign = TenantId::new();

        let mut req = request(&format!("/api/patients/x?tenantId={foreign}&tenantId={own}"));
        req.headers_mut()
            .insert(TENANT_HEADER, HeaderValue::from_str(&own.to_string()).unwrap());

        assert_eq!(requested_tenants(&req).unwrap(), vec![own, foreign, own]);
    }

    #[test]
    fn requests_without_tenant_hints_name_none() {
        assert!(requested_tenants(&request("/api/patients?page=2")).unwrap().is_empty());
        assert!(requested_tenants(&request("/api/patients")).unwrap().is_empty());
    }

    #[test]
    fn malformed_query_tenant_is_a_validation_error() {
        let req = request("/api/patients?tenantId=not-a-uuid");
        assert!(matches!(requested_tenants(&req), Err(ApiError::Validation(_))));
    }
}
