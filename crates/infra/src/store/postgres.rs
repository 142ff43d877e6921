//! Postgres-backed record store.
//!
//! Records are stored as JSONB documents in a single `records` table keyed by
//! `(tenant_id, kind, id)`. The `seq` column preserves insertion order.
//!
//! ## Tenant Isolation
//!
//! Every statement carries `tenant_id` in its WHERE clause (or primary key),
//! so a query can never observe another tenant's rows.
//!
//! ## Transactions
//!
//! `insert` and `modify` each run inside one transaction. `modify` locks the
//! row with `SELECT ... FOR UPDATE` so concurrent read-modify-write cycles on
//! the same record serialize.

use std::marker::PhantomData;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Row};
use tracing::instrument;

use carehub_core::{DomainError, RecordId, Resource, TenantId};

use super::{Mutation, RecordStore, StoreError};

/// Postgres-backed tenant-isolated store for one resource kind.
pub struct PostgresRecordStore<R> {
    pool: PgPool,
    _record: PhantomData<fn() -> R>,
}

impl<R> PostgresRecordStore<R> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _record: PhantomData,
        }
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            StoreError::Backend(format!("database error in {}: {}", operation, db_err.message()))
        }
        other => StoreError::Backend(format!("{} failed: {}", operation, other)),
    }
}

fn decode<R: Resource>(data: serde_json::Value) -> Result<R, StoreError> {
    serde_json::from_value(data).map_err(|e| StoreError::Codec(format!("{}: {}", R::KIND, e)))
}

fn encode<R: Resource>(record: &R) -> Result<serde_json::Value, StoreError> {
    serde_json::to_value(record).map_err(|e| StoreError::Codec(format!("{}: {}", R::KIND, e)))
}

#[async_trait]
impl<R: Resource> RecordStore<R> for PostgresRecordStore<R> {
    #[instrument(skip_all, fields(kind = R::KIND, tenant_id = %record.tenant_id()), err)]
    async fn insert(&self, record: R) -> Result<(), StoreError> {
        let data = encode(&record)?;
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        sqlx::query(
            r#"
            INSERT INTO records (tenant_id, kind, id, data, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            "#,
        )
        .bind(record.tenant_id().as_uuid())
        .bind(R::KIND)
        .bind(record.id().as_uuid())
        .bind(&data)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("insert_record", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))
    }

    #[instrument(skip(self), fields(kind = R::KIND), err)]
    async fn get(&self, tenant_id: TenantId, id: RecordId) -> Result<Option<R>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT data FROM records
            WHERE tenant_id = $1 AND kind = $2 AND id = $3
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(R::KIND)
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_record", e))?;

        row.map(|r| decode(r.get::<serde_json::Value, _>("data")))
            .transpose()
    }

    #[instrument(skip(self), fields(kind = R::KIND), err)]
    async fn list(&self, tenant_id: TenantId) -> Result<Vec<R>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT data FROM records
            WHERE tenant_id = $1 AND kind = $2
            ORDER BY seq ASC
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(R::KIND)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_records", e))?;

        rows.into_iter()
            .map(|r| decode(r.get::<serde_json::Value, _>("data")))
            .collect()
    }

    #[instrument(skip(self, mutation), fields(kind = R::KIND), err)]
    async fn modify(&self, tenant_id: TenantId, id: RecordId, mutation: Mutation<R>) -> Result<R, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        let row = sqlx::query(
            r#"
            SELECT data FROM records
            WHERE tenant_id = $1 AND kind = $2 AND id = $3
            FOR UPDATE
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(R::KIND)
        .bind(id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("lock_record", e))?;

        let Some(row) = row else {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(DomainError::NotFound.into());
        };

        let mut record: R = decode(row.get::<serde_json::Value, _>("data"))?;
        if let Err(e) = mutation(&mut record) {
            tx.rollback()
                .await
                .map_err(|e| map_sqlx_error("rollback", e))?;
            return Err(e.into());
        }

        sqlx::query(
            r#"
            UPDATE records SET data = $4, updated_at = $5
            WHERE tenant_id = $1 AND kind = $2 AND id = $3
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(R::KIND)
        .bind(id.as_uuid())
        .bind(encode(&record)?)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(|e| map_sqlx_error("update_record", e))?;

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Ok(record)
    }
}
