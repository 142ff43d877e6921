//! Revoked-token records and the store they live in.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use carehub_core::{TenantId, UserId};

use crate::TokenId;

/// A revoked token identifier.
///
/// Created at logout/password-change; only `revoked` may flip afterwards.
/// Once `expires_at` has passed the token would fail validation anyway, so
/// the record can be pruned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokedToken {
    pub token_id: TokenId,
    pub user_id: UserId,
    pub tenant_id: TenantId,
    pub revoked: bool,
    pub reason: Option<String>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RevocationError {
    #[error("revocation store unavailable: {0}")]
    Store(String),
}

/// Tenant-scoped revocation lookups.
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Record a revocation (idempotent; re-revoking keeps the record revoked).
    async fn revoke(&self, record: RevokedToken) -> Result<(), RevocationError>;

    /// Whether `token_id` is revoked within `tenant_id`.
    async fn is_revoked(&self, tenant_id: TenantId, token_id: TokenId) -> Result<bool, RevocationError>;

    /// Drop records whose token has expired; returns how many were removed.
    async fn prune_expired(&self, now: DateTime<Utc>) -> Result<usize, RevocationError>;
}

/// In-memory revocation store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryRevocationStore {
    inner: RwLock<HashMap<(TenantId, TokenId), RevokedToken>>,
}

impl InMemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> RevocationError {
    RevocationError::Store("lock poisoned".to_string())
}

#[async_trait]
impl RevocationStore for InMemoryRevocationStore {
    async fn revoke(&self, record: RevokedToken) -> Result<(), RevocationError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        let key = (record.tenant_id, record.token_id);
        match map.get_mut(&key) {
            Some(existing) => {
                existing.revoked = existing.revoked || record.revoked;
            }
            None => {
                map.insert(key, record);
            }
        }
        Ok(())
    }

    async fn is_revoked(&self, tenant_id: TenantId, token_id: TokenId) -> Result<bool, RevocationError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        Ok(map
            .get(&(tenant_id, token_id))
            .is_some_and(|r| r.revoked))
    }

    async fn prune_expired(&self, now: DateTime<Utc>) -> Result<usize, RevocationError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        let before = map.len();
        map.retain(|_, r| r.expires_at > now);
        Ok(before - map.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(tenant_id: TenantId, expires_at: DateTime<Utc>) -> RevokedToken {
        RevokedToken {
            token_id: TokenId::new(),
            user_id: UserId::new(),
            tenant_id,
            revoked: true,
            reason: Some("logout".to_string()),
            expires_at,
        }
    }

    #[tokio::test]
    async fn revocation_is_tenant_scoped() {
        let store = InMemoryRevocationStore::new();
        let tenant = TenantId::new();
        let rec = record(tenant, Utc::now() + Duration::hours(1));
        store.revoke(rec.clone()).await.unwrap();

        assert!(store.is_revoked(tenant, rec.token_id).await.unwrap());
        assert!(!store.is_revoked(TenantId::new(), rec.token_id).await.unwrap());
    }

    #[tokio::test]
    async fn revoke_never_flips_back() {
        let store = InMemoryRevocationStore::new();
        let tenant = TenantId::new();
        let rec = record(tenant, Utc::now() + Duration::hours(1));
        store.revoke(rec.clone()).await.unwrap();
        store
            .revoke(RevokedToken { revoked: false, ..rec.clone() })
            .await
            .unwrap();

        assert!(store.is_revoked(tenant, rec.token_id).await.unwrap());
    }

    #[tokio::test]
    async fn prune_drops_only_expired_records() {
        let store = InMemoryRevocationStore::new();
        let tenant = TenantId::new();
        let now = Utc::now();
        let stale = record(tenant, now - Duration::minutes(1));
        let live = record(tenant, now + Duration::minutes(1));
        store.revoke(stale.clone()).await.unwrap();
        store.revoke(live.clone()).await.unwrap();

        assert_eq!(store.prune_expired(now).await.unwrap(), 1);
        assert!(!store.is_revoked(tenant, stale.token_id).await.unwrap());
        assert!(store.is_revoked(tenant, live.token_id).await.unwrap());
    }
}
