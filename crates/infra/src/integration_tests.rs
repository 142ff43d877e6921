//! Integration tests for the resource pipeline.
//!
//! Tests: TenantScope → ResourceService → RecordStore → ListQuery
//!
//! Verifies:
//! - Tenant isolation holds for list and get over mixed-tenant data
//! - Failed validations and failed mutations leave the store untouched
//! - Lab orders run their workflow through the generic service

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use proptest::prelude::*;
    use serde_json::json;

    use carehub_auth::{Principal, Role, TenantScope};
    use carehub_core::{DomainError, TenantId, UserId, Validated};
    use carehub_pathology::{LabOrder, LabOrderPatch, LabOrderStatus, NewLabOrder};
    use carehub_patients::{NewPatient, Patient, PatientPatch};

    use crate::query::ListQuery;
    use crate::service::{ResourceService, ServiceError};
    use crate::store::InMemoryRecordStore;

    fn scope(tenant_id: TenantId) -> TenantScope {
        let principal = Principal::new(UserId::new(), tenant_id, Role::Doctor);
        TenantScope::resolve(&principal, None).unwrap()
    }

    fn patient(first: &str) -> NewPatient {
        NewPatient::from_json(json!({ "firstName": first, "lastName": "Tester" })).unwrap()
    }

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread().build().unwrap()
    }

    /// Parse then create, the way a create request does.
    async fn create_from_json(
        service: &ResourceService<Patient>,
        scope: &TenantScope,
        body: serde_json::Value,
    ) -> Result<Patient, ServiceError> {
        let draft = NewPatient::from_json(body)?;
        service.create(scope, draft).await
    }

    #[tokio::test]
    async fn rejected_draft_persists_nothing() {
        let service = ResourceService::new(Arc::new(InMemoryRecordStore::<Patient>::new()));
        let s = scope(TenantId::new());
        let kept = create_from_json(&service, &s, json!({ "firstName": "Ann", "lastName": "Tester" }))
            .await
            .unwrap();

        let err = create_from_json(&service, &s, json!({ "firstName": "  ", "lastName": "Tester" }))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::Validation(_))));

        let page = service.list(&s, &ListQuery::default()).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items, vec![kept]);
    }

    #[tokio::test]
    async fn rejected_patch_leaves_record_untouched() {
        let service = ResourceService::new(Arc::new(InMemoryRecordStore::<Patient>::new()));
        let s = scope(TenantId::new());
        let created = service.create(&s, patient("Ann")).await.unwrap();

        assert!(PatientPatch::from_json(json!({ "email": "nope" })).is_err());
        let patch = PatientPatch::from_json(json!({ "lastName": "" }));
        assert!(patch.is_err());

        assert_eq!(service.get(&s, created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn lab_order_workflow_through_service() {
        let service = ResourceService::new(Arc::new(InMemoryRecordStore::<LabOrder>::new()));
        let s = scope(TenantId::new());
        let draft = NewLabOrder::from_json(json!({
            "patientId": carehub_core::RecordId::new().to_string(),
            "testCode": "lft",
            "testName": "Liver function",
        }))
        .unwrap();
        let order = service.create(&s, draft).await.unwrap();

        service.transition(&s, order.id, LabOrderStatus::SampleCollected).await.unwrap();
        service.transition(&s, order.id, LabOrderStatus::InProgress).await.unwrap();

        let err = service
            .transition(&s, order.id, LabOrderStatus::Completed)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::InvalidState(_))));

        let patch = LabOrderPatch::from_json(json!({ "result": "ALT 31 U/L" })).unwrap();
        service.update(&s, order.id, patch).await.unwrap();
        let done = service.transition(&s, order.id, LabOrderStatus::Completed).await.unwrap();

        assert_eq!(done.status, LabOrderStatus::Completed);
        assert!(done.completed_at.is_some());

        let err = service.archive(&s, order.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::InvalidState(_))));
    }

    proptest! {
        #[test]
        fn tenants_never_see_each_other(owners in prop::collection::vec(0usize..3, 0..30)) {
            let rt = runtime();
            let tenants = [TenantId::new(), TenantId::new(), TenantId::new()];
            let service = ResourceService::new(Arc::new(InMemoryRecordStore::<Patient>::new()));

            let created = rt.block_on(async {
                let mut created = Vec::new();
                for (n, owner) in owners.iter().enumerate() {
                    let record = service
                        .create(&scope(tenants[*owner]), patient(&format!("P{n}")))
                        .await
                        .unwrap();
                    created.push((*owner, record));
                }
                created
            });

            for (idx, tenant) in tenants.iter().enumerate() {
                let s = scope(*tenant);
                let query = ListQuery { limit: 100, ..ListQuery::default() };
                let page = rt.block_on(service.list(&s, &query)).unwrap();

                let expected: Vec<_> = created
                    .iter()
                    .filter(|(owner, _)| *owner == idx)
                    .map(|(_, record)| record.id)
                    .collect();
                let listed: Vec<_> = page.items.iter().map(|p| p.id).collect();
                prop_assert_eq!(listed, expected);
                prop_assert!(page.items.iter().all(|p| p.tenant_id == *tenant));

                for (owner, record) in &created {
                    let fetched = rt.block_on(service.get(&s, record.id));
                    if *owner == idx {
                        prop_assert_eq!(fetched.unwrap(), record.clone());
                    } else {
                        prop_assert_eq!(fetched.unwrap_err(), ServiceError::Domain(DomainError::NotFound));
                    }
                }
            }
        }
    }
}
