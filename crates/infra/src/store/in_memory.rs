use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use carehub_core::{DomainError, RecordId, Resource, TenantId};

use super::{Mutation, RecordStore, StoreError};

#[derive(Debug)]
struct Records<R> {
    rows: Vec<R>,
    index: HashMap<(TenantId, RecordId), usize>,
}

/// In-memory tenant-isolated store for tests/dev.
///
/// Rows are kept in insertion order; a single lock makes each `modify`
/// atomic with respect to other calls.
#[derive(Debug)]
pub struct InMemoryRecordStore<R> {
    inner: RwLock<Records<R>>,
}

impl<R> InMemoryRecordStore<R> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Records {
                rows: Vec::new(),
                index: HashMap::new(),
            }),
        }
    }
}

impl<R> Default for InMemoryRecordStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> StoreError {
    StoreError::Backend("lock poisoned".to_string())
}

#[async_trait]
impl<R: Resource> RecordStore<R> for InMemoryRecordStore<R> {
    async fn insert(&self, record: R) -> Result<(), StoreError> {
        let mut guard = self.inner.write().map_err(|_| poisoned())?;
        let key = (record.tenant_id(), record.id());
        if guard.index.contains_key(&key) {
            return Err(StoreError::Backend(format!("duplicate record id {}", key.1)));
        }
        let position = guard.rows.len();
        guard.rows.push(record);
        guard.index.insert(key, position);
        Ok(())
    }

    async fn get(&self, tenant_id: TenantId, id: RecordId) -> Result<Option<R>, StoreError> {
        let guard = self.inner.read().map_err(|_| poisoned())?;
        Ok(guard
            .index
            .get(&(tenant_id, id))
            .map(|&position| guard.rows[position].clone()))
    }

    async fn list(&self, tenant_id: TenantId) -> Result<Vec<R>, StoreError> {
        let guard = self.inner.read().map_err(|_| poisoned())?;
        Ok(guard
            .rows
            .iter()
            .filter(|r| r.tenant_id() == tenant_id)
            .cloned()
            .collect())
    }

    async fn modify(&self, tenant_id: TenantId, id: RecordId, mutation: Mutation<R>) -> Result<R, StoreError> {
        let mut guard = self.inner.write().map_err(|_| poisoned())?;
        let position = *guard
            .index
            .get(&(tenant_id, id))
            .ok_or(DomainError::NotFound)?;

        // Mutate a copy so a rejected mutation leaves the stored row untouched.
        let mut updated = guard.rows[position].clone();
        mutation(&mut updated)?;
        guard.rows[position] = updated.clone();
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carehub_core::Validated;
    use carehub_patients::{NewPatient, Patient};
    use chrono::Utc;
    use serde_json::json;

    fn patient(tenant_id: TenantId, first: &str) -> Patient {
        let draft = NewPatient::from_json(json!({ "firstName": first, "lastName": "Test" })).unwrap();
        Patient::from_draft(RecordId::new(), tenant_id, draft, Utc::now())
    }

    #[tokio::test]
    async fn list_keeps_insertion_order_per_tenant() {
        let store = InMemoryRecordStore::new();
        let t1 = TenantId::new();
        let t2 = TenantId::new();
        for (tenant, name) in [(t1, "a"), (t2, "x"), (t1, "b"), (t1, "c")] {
            store.insert(patient(tenant, name)).await.unwrap();
        }

        let names: Vec<_> = store
            .list(t1)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.first_name)
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn get_is_tenant_scoped() {
        let store = InMemoryRecordStore::new();
        let owner = TenantId::new();
        let p = patient(owner, "a");
        store.insert(p.clone()).await.unwrap();

        assert_eq!(store.get(owner, p.id).await.unwrap(), Some(p.clone()));
        assert_eq!(store.get(TenantId::new(), p.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn rejected_mutation_writes_nothing() {
        let store = InMemoryRecordStore::new();
        let owner = TenantId::new();
        let p = patient(owner, "a");
        store.insert(p.clone()).await.unwrap();

        let err = store
            .modify(
                owner,
                p.id,
                Box::new(|r: &mut Patient| {
                    r.first_name = "changed".to_string();
                    Err(DomainError::invalid_state("nope"))
                }),
            )
            .await
            .unwrap_err();

        assert_eq!(err, StoreError::Domain(DomainError::invalid_state("nope")));
        assert_eq!(store.get(owner, p.id).await.unwrap().unwrap().first_name, "a");
    }

    #[tokio::test]
    async fn modify_in_foreign_tenant_is_not_found() {
        let store = InMemoryRecordStore::new();
        let p = patient(TenantId::new(), "a");
        store.insert(p.clone()).await.unwrap();

        let err = store
            .modify(TenantId::new(), p.id, Box::new(|_: &mut Patient| Ok(())))
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::Domain(DomainError::NotFound));
    }
}
