//! Postgres-backed revoked-token store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use tracing::instrument;

use carehub_auth::{RevocationError, RevocationStore, RevokedToken, TokenId};
use carehub_core::TenantId;

#[derive(Debug, Clone)]
pub struct PostgresRevocationStore {
    pool: PgPool,
}

impl PostgresRevocationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> RevocationError {
    RevocationError::Store(format!("{} failed: {}", operation, err))
}

#[async_trait]
impl RevocationStore for PostgresRevocationStore {
    #[instrument(skip_all, fields(tenant_id = %record.tenant_id, token_id = %record.token_id), err)]
    async fn revoke(&self, record: RevokedToken) -> Result<(), RevocationError> {
        // `revoked` only ever moves from false to true.
        sqlx::query(
            r#"
            INSERT INTO revoked_tokens (tenant_id, token_id, user_id, revoked, reason, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (tenant_id, token_id)
            DO UPDATE SET revoked = revoked_tokens.revoked OR EXCLUDED.revoked
            "#,
        )
        .bind(record.tenant_id.as_uuid())
        .bind(record.token_id.as_uuid())
        .bind(record.user_id.as_uuid())
        .bind(record.revoked)
        .bind(&record.reason)
        .bind(record.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("revoke_token", e))?;
        Ok(())
    }

    async fn is_revoked(&self, tenant_id: TenantId, token_id: TokenId) -> Result<bool, RevocationError> {
        let row = sqlx::query(
            r#"
            SELECT revoked FROM revoked_tokens
            WHERE tenant_id = $1 AND token_id = $2
            "#,
        )
        .bind(tenant_id.as_uuid())
        .bind(token_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("lookup_revocation", e))?;

        Ok(row.is_some_and(|r| r.get::<bool, _>("revoked")))
    }

    #[instrument(skip(self), err)]
    async fn prune_expired(&self, now: DateTime<Utc>) -> Result<usize, RevocationError> {
        let result = sqlx::query("DELETE FROM revoked_tokens WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("prune_revocations", e))?;
        Ok(result.rows_affected() as usize)
    }
}
