//! Infrastructure wiring: record stores, revocation store, resource services.

use std::sync::Arc;

use anyhow::{Context, Result};

use carehub_auth::{InMemoryRevocationStore, RevocationStore};
use carehub_infra::{InMemoryRecordStore, PostgresRecordStore, PostgresRevocationStore, ResourceService, db};
use carehub_pathology::LabOrder;
use carehub_patients::Patient;
use carehub_staff::StaffMember;

use crate::config::DatabaseConfig;

/// Everything the handlers need, shared behind one `Arc`.
#[derive(Clone)]
pub struct AppServices {
    pub patients: ResourceService<Patient>,
    pub staff: ResourceService<StaffMember>,
    pub pathology: ResourceService<LabOrder>,
    pub revocations: Arc<dyn RevocationStore>,
}

impl AppServices {
    /// In-memory stores; state lives as long as the process.
    pub fn in_memory() -> Self {
        Self {
            patients: ResourceService::new(Arc::new(InMemoryRecordStore::<Patient>::new())),
            staff: ResourceService::new(Arc::new(InMemoryRecordStore::<StaffMember>::new())),
            pathology: ResourceService::new(Arc::new(InMemoryRecordStore::<LabOrder>::new())),
            revocations: Arc::new(InMemoryRevocationStore::new()),
        }
    }

    /// Postgres-backed stores sharing one pool. Applies the schema first.
    pub async fn postgres(config: &DatabaseConfig) -> Result<Self> {
        let pool = db::connect(&config.url, config.max_connections)
            .await
            .context("failed to connect to DATABASE_URL")?;
        db::migrate(&pool).await.context("failed to apply database schema")?;

        Ok(Self {
            patients: ResourceService::new(Arc::new(PostgresRecordStore::<Patient>::new(pool.clone()))),
            staff: ResourceService::new(Arc::new(PostgresRecordStore::<StaffMember>::new(pool.clone()))),
            pathology: ResourceService::new(Arc::new(PostgresRecordStore::<LabOrder>::new(pool.clone()))),
            revocations: Arc::new(PostgresRevocationStore::new(pool)),
        })
    }
}

pub async fn build_services(database: Option<&DatabaseConfig>) -> Result<AppServices> {
    match database {
        Some(config) => {
            tracing::info!(max_connections = config.max_connections, "using postgres stores");
            AppServices::postgres(config).await
        }
        None => {
            tracing::warn!("DATABASE_URL not set; records are kept in memory and lost on restart");
            Ok(AppServices::in_memory())
        }
    }
}
