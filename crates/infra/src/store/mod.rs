//! Tenant-isolated record storage abstractions.

pub mod in_memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use carehub_core::{DomainError, DomainResult, RecordId, Resource, TenantId};

pub use in_memory::InMemoryRecordStore;
pub use postgres::PostgresRecordStore;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The record is missing, or a mutation was rejected by a domain rule.
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("record codec error: {0}")]
    Codec(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// A domain mutation applied atomically to one stored record.
pub type Mutation<R> = Box<dyn FnOnce(&mut R) -> DomainResult<()> + Send>;

/// Tenant-isolated persistence for one resource type.
///
/// Every method takes the tenant explicitly (or reads it from the record);
/// implementations must never return or touch another tenant's rows.
#[async_trait]
pub trait RecordStore<R: Resource>: Send + Sync {
    async fn insert(&self, record: R) -> Result<(), StoreError>;

    async fn get(&self, tenant_id: TenantId, id: RecordId) -> Result<Option<R>, StoreError>;

    /// All records of a tenant in insertion order.
    async fn list(&self, tenant_id: TenantId) -> Result<Vec<R>, StoreError>;

    /// Load, mutate and write back one record as a single atomic step.
    ///
    /// Fails with `DomainError::NotFound` when the record does not exist for
    /// `tenant_id`. If `mutation` fails nothing is written.
    async fn modify(&self, tenant_id: TenantId, id: RecordId, mutation: Mutation<R>) -> Result<R, StoreError>;
}
