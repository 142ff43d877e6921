//! Infrastructure layer: record stores, revocation persistence, list queries
//! and the generic resource service.

pub mod db;
pub mod query;
pub mod revocation;
pub mod service;
pub mod store;

mod integration_tests;

pub use query::{ListQuery, Page, SortOrder};
pub use revocation::PostgresRevocationStore;
pub use service::{ResourceService, ServiceError};
pub use store::{InMemoryRecordStore, PostgresRecordStore, RecordStore, StoreError};
