//! Generic CRUD + status routes, instantiated once per resource kind.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Extension, Path, Query},
    http::StatusCode,
    routing::{get, post},
};
use serde_json::Value;

use carehub_auth::{Permission, authorize};
use carehub_core::{RecordId, Resource, Validated};
use carehub_infra::{ListQuery, Page, ResourceService};
use carehub_pathology::LabOrder;
use carehub_patients::Patient;
use carehub_staff::StaffMember;

use crate::app::errors::ApiError;
use crate::app::routes::body::{json_object, take_body_tenant, take_query_tenants};
use crate::app::services::AppServices;
use crate::context::{PrincipalContext, TenantContext};

/// A resource exposed over HTTP.
pub trait RoutedResource: Resource {
    fn service(services: &AppServices) -> &ResourceService<Self>;
}

impl RoutedResource for Patient {
    fn service(services: &AppServices) -> &ResourceService<Self> {
        &services.patients
    }
}

impl RoutedResource for StaffMember {
    fn service(services: &AppServices) -> &ResourceService<Self> {
        &services.staff
    }
}

impl RoutedResource for LabOrder {
    fn service(services: &AppServices) -> &ResourceService<Self> {
        &services.pathology
    }
}

pub fn router<R: RoutedResource>() -> Router {
    Router::new()
        .route("/", post(create::<R>).get(list::<R>))
        .route("/:id", get(get_one::<R>).patch(update::<R>).delete(archive::<R>))
        .route("/:id/status", post(change_status::<R>))
}

fn require<R: Resource>(principal: &PrincipalContext, action: &str) -> Result<(), ApiError> {
    authorize(principal.principal(), &Permission::for_resource(R::KIND, action))?;
    Ok(())
}

/// Malformed ids cannot name a stored record.
fn parse_id(raw: &str) -> Result<RecordId, ApiError> {
    raw.parse().map_err(|_| ApiError::NotFound)
}

pub async fn create<R: RoutedResource>(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    body: Bytes,
) -> Result<(StatusCode, Json<R>), ApiError> {
    require::<R>(&principal, "create")?;

    let mut body = json_object(&body)?;
    tenant.scope().ensure(take_body_tenant(&mut body)?)?;
    let draft = R::Draft::from_json(Value::Object(body))?;

    let record = R::service(&services).create(tenant.scope(), draft).await?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn list<R: RoutedResource>(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Query(mut params): Query<Vec<(String, String)>>,
) -> Result<Json<Page<R>>, ApiError> {
    require::<R>(&principal, "read")?;

    // Already checked against the scope by the auth middleware.
    take_query_tenants(&mut params)?;
    let query = ListQuery::from_params(params)?;

    let page = R::service(&services).list(tenant.scope(), &query).await?;
    Ok(Json(page))
}

pub async fn get_one<R: RoutedResource>(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Result<Json<R>, ApiError> {
    require::<R>(&principal, "read")?;

    let id = parse_id(&id)?;

    let record = R::service(&services).get(tenant.scope(), id).await?;
    Ok(Json(record))
}

pub async fn update<R: RoutedResource>(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<R>, ApiError> {
    require::<R>(&principal, "update")?;

    let mut body = json_object(&body)?;
    tenant.scope().ensure(take_body_tenant(&mut body)?)?;
    let id = parse_id(&id)?;
    let patch = R::Patch::from_json(Value::Object(body))?;

    let record = R::service(&services).update(tenant.scope(), id, patch).await?;
    Ok(Json(record))
}

pub async fn change_status<R: RoutedResource>(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<R>, ApiError> {
    require::<R>(&principal, "status")?;

    let mut body = json_object(&body)?;
    tenant.scope().ensure(take_body_tenant(&mut body)?)?;
    let id = parse_id(&id)?;
    let target = parse_status::<R>(body.remove("status"))?;

    let record = R::service(&services).transition(tenant.scope(), id, target).await?;
    Ok(Json(record))
}

pub async fn archive<R: RoutedResource>(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(tenant): Extension<TenantContext>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Result<Json<R>, ApiError> {
    require::<R>(&principal, "status")?;

    let id = parse_id(&id)?;
    let record = R::service(&services).archive(tenant.scope(), id).await?;
    Ok(Json(record))
}

fn parse_status<R: Resource>(value: Option<Value>) -> Result<R::Status, ApiError> {
    let Some(Value::String(raw)) = value else {
        return Err(ApiError::Validation("status is required".to_string()));
    };
    serde_json::from_value(Value::String(raw.trim().to_uppercase()))
        .map_err(|_| ApiError::Validation(format!("unknown {} status '{raw}'", R::KIND)))
}
