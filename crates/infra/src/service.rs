//! Generic resource service (create / list / get / update / transition).
//!
//! ```text
//! TenantScope + validated payload
//!   ↓
//! 1. Build or mutate the record (pure domain rules)
//!   ↓
//! 2. Persist through the injected `RecordStore` (tenant-keyed, atomic per call)
//!   ↓
//! 3. Return the stored record
//! ```
//!
//! The service holds no state of its own. Every operation takes a
//! `TenantScope`, so every store call is keyed by exactly one tenant.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::instrument;

use carehub_auth::TenantScope;
use carehub_core::{DomainError, RecordId, Resource, StatusMachine};

use crate::query::{ListQuery, Page};
use crate::store::{RecordStore, StoreError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("storage failure: {0}")]
    Store(String),
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Domain(e) => ServiceError::Domain(e),
            other => ServiceError::Store(other.to_string()),
        }
    }
}

pub struct ResourceService<R: Resource> {
    store: Arc<dyn RecordStore<R>>,
}

impl<R: Resource> Clone for ResourceService<R> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<R: Resource> ResourceService<R> {
    pub fn new(store: Arc<dyn RecordStore<R>>) -> Self {
        Self { store }
    }

    #[instrument(skip_all, fields(kind = R::KIND, tenant_id = %scope.tenant_id()), err)]
    pub async fn create(&self, scope: &TenantScope, draft: R::Draft) -> Result<R, ServiceError> {
        let record = R::from_draft(RecordId::new(), scope.tenant_id(), draft, Utc::now());
        self.store.insert(record.clone()).await?;
        tracing::info!(record_id = %record.id(), "record created");
        Ok(record)
    }

    #[instrument(skip_all, fields(kind = R::KIND, tenant_id = %scope.tenant_id()), err)]
    pub async fn list(&self, scope: &TenantScope, query: &ListQuery) -> Result<Page<R>, ServiceError> {
        let records = self.store.list(scope.tenant_id()).await?;
        Ok(query.apply(records))
    }

    /// Fetch one record. A record owned by another tenant is reported as
    /// `NotFound`, exactly like a missing one.
    #[instrument(skip_all, fields(kind = R::KIND, tenant_id = %scope.tenant_id(), record_id = %id), err)]
    pub async fn get(&self, scope: &TenantScope, id: RecordId) -> Result<R, ServiceError> {
        match self.store.get(scope.tenant_id(), id).await? {
            Some(record) if record.tenant_id() == scope.tenant_id() => Ok(record),
            _ => Err(DomainError::NotFound.into()),
        }
    }

    #[instrument(skip_all, fields(kind = R::KIND, tenant_id = %scope.tenant_id(), record_id = %id), err)]
    pub async fn update(&self, scope: &TenantScope, id: RecordId, patch: R::Patch) -> Result<R, ServiceError> {
        let record = self
            .store
            .modify(
                scope.tenant_id(),
                id,
                Box::new(move |record: &mut R| record.apply_patch(patch, Utc::now())),
            )
            .await?;
        tracing::info!("record updated");
        Ok(record)
    }

    #[instrument(skip_all, fields(kind = R::KIND, tenant_id = %scope.tenant_id(), record_id = %id, target = %target), err)]
    pub async fn transition(&self, scope: &TenantScope, id: RecordId, target: R::Status) -> Result<R, ServiceError> {
        let record = self
            .store
            .modify(
                scope.tenant_id(),
                id,
                Box::new(move |record: &mut R| record.transition(target, Utc::now())),
            )
            .await?;
        tracing::info!("status changed");
        Ok(record)
    }

    /// Soft delete: move the record to the resource's archive status.
    pub async fn archive(&self, scope: &TenantScope, id: RecordId) -> Result<R, ServiceError> {
        let Some(target) = R::Status::archived() else {
            return Err(DomainError::invalid_state(format!("{} records cannot be archived", R::KIND)).into());
        };
        self.transition(scope, id, target).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryRecordStore;
    use carehub_auth::{Principal, Role};
    use carehub_core::{TenantId, UserId, Validated};
    use carehub_patients::{NewPatient, Patient, PatientPatch, PatientStatus};
    use serde_json::json;

    fn service() -> ResourceService<Patient> {
        ResourceService::new(Arc::new(InMemoryRecordStore::<Patient>::new()))
    }

    fn scope(tenant_id: TenantId) -> TenantScope {
        let principal = Principal::new(UserId::new(), tenant_id, Role::Receptionist);
        TenantScope::resolve(&principal, None).unwrap()
    }

    fn draft(first: &str) -> NewPatient {
        NewPatient::from_json(json!({ "firstName": first, "lastName": "Doe" })).unwrap()
    }

    #[tokio::test]
    async fn create_assigns_id_tenant_and_timestamps() {
        let svc = service();
        let tenant = TenantId::new();
        let created = svc.create(&scope(tenant), draft("Jane")).await.unwrap();

        assert_eq!(created.tenant_id, tenant);
        assert_eq!(created.created_at, created.updated_at);
        assert_eq!(svc.get(&scope(tenant), created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn cross_tenant_get_is_not_found() {
        let svc = service();
        let owner = scope(TenantId::new());
        let created = svc.create(&owner, draft("Jane")).await.unwrap();

        let err = svc.get(&scope(TenantId::new()), created.id).await.unwrap_err();
        assert_eq!(err, ServiceError::Domain(DomainError::NotFound));
    }

    #[tokio::test]
    async fn get_is_idempotent() {
        let svc = service();
        let s = scope(TenantId::new());
        let created = svc.create(&s, draft("Jane")).await.unwrap();

        let first = svc.get(&s, created.id).await.unwrap();
        let second = svc.get(&s, created.id).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found() {
        let svc = service();
        let s = scope(TenantId::new());
        let patch = PatientPatch::from_json(json!({ "lastName": "Smith" })).unwrap();

        let err = svc.update(&s, RecordId::new(), patch).await.unwrap_err();
        assert_eq!(err, ServiceError::Domain(DomainError::NotFound));
    }

    #[tokio::test]
    async fn update_in_foreign_tenant_leaves_record_untouched() {
        let svc = service();
        let owner = scope(TenantId::new());
        let created = svc.create(&owner, draft("Jane")).await.unwrap();
        let patch = PatientPatch::from_json(json!({ "lastName": "Smith" })).unwrap();

        let err = svc.update(&scope(TenantId::new()), created.id, patch).await.unwrap_err();
        assert_eq!(err, ServiceError::Domain(DomainError::NotFound));
        assert_eq!(svc.get(&owner, created.id).await.unwrap().last_name, "Doe");
    }

    #[tokio::test]
    async fn invalid_transition_is_invalid_state() {
        let svc = service();
        let s = scope(TenantId::new());
        let created = svc.create(&s, draft("Jane")).await.unwrap();

        svc.archive(&s, created.id).await.unwrap();
        let err = svc
            .transition(&s, created.id, PatientStatus::Active)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::InvalidState(_))));
        assert_eq!(svc.get(&s, created.id).await.unwrap().status, PatientStatus::Archived);
    }

    #[tokio::test]
    async fn list_only_returns_own_tenant() {
        let svc = service();
        let a = scope(TenantId::new());
        let b = scope(TenantId::new());
        svc.create(&a, draft("A1")).await.unwrap();
        svc.create(&b, draft("B1")).await.unwrap();
        svc.create(&a, draft("A2")).await.unwrap();

        let page = svc.list(&a, &ListQuery::default()).await.unwrap();
        let names: Vec<_> = page.items.iter().map(|p| p.first_name.as_str()).collect();
        assert_eq!(names, vec!["A1", "A2"]);
        assert_eq!(page.total, 2);
    }
}
