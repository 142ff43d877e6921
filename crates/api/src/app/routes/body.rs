//! JSON body and query-string helpers shared by the handlers.

use axum::body::Bytes;
use serde_json::{Map, Value};

use carehub_core::TenantId;

use crate::app::errors::ApiError;
use crate::middleware::parse_tenant_id;

const TENANT_FIELD: &str = "tenantId";

/// Parse a JSON object body. An empty body counts as `{}`.
pub fn json_object(bytes: &Bytes) -> Result<Map<String, Value>, ApiError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ApiError::Validation("request body must be a JSON object".to_string())),
        Err(e) => Err(ApiError::Validation(format!("malformed JSON body: {e}"))),
    }
}

/// Remove and parse a `tenantId` field named in a body.
pub fn take_body_tenant(body: &mut Map<String, Value>) -> Result<Option<TenantId>, ApiError> {
    match body.remove(TENANT_FIELD) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(raw)) => parse_tenant_id(&raw).map(Some),
        Some(_) => Err(ApiError::Validation("tenantId must be a UUID".to_string())),
    }
}

/// Split every `tenantId` query parameter out of the raw pairs.
///
/// A repeated key yields one entry per occurrence so each can be checked.
pub fn take_query_tenants(params: &mut Vec<(String, String)>) -> Result<Vec<TenantId>, ApiError> {
    let mut requested = Vec::new();
    let mut rest = Vec::with_capacity(params.len());
    for (key, value) in params.drain(..) {
        if key == TENANT_FIELD {
            requested.push(parse_tenant_id(&value)?);
        } else {
            rest.push((key, value));
        }
    }
    *params = rest;
    Ok(requested)
}
