//! Token validation pipeline: signature + time window + revocation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{JwtValidator, Principal, RevocationError, RevocationStore, TokenId, TokenValidationError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("unauthenticated: {0}")]
    Unauthenticated(#[from] TokenValidationError),

    /// The revocation set could not be consulted; the request cannot be
    /// authenticated either way.
    #[error(transparent)]
    Unavailable(#[from] RevocationError),
}

/// The outcome of a successful authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedSession {
    pub principal: Principal,
    pub token_id: TokenId,
    pub expires_at: DateTime<Utc>,
}

/// Validates bearer credentials into principals. Read-only.
#[derive(Clone)]
pub struct Authenticator {
    jwt: Arc<dyn JwtValidator>,
    revocations: Arc<dyn RevocationStore>,
}

impl Authenticator {
    pub fn new(jwt: Arc<dyn JwtValidator>, revocations: Arc<dyn RevocationStore>) -> Self {
        Self { jwt, revocations }
    }

    pub fn revocations(&self) -> &Arc<dyn RevocationStore> {
        &self.revocations
    }

    pub async fn authenticate(&self, token: &str, now: DateTime<Utc>) -> Result<AuthenticatedSession, AuthError> {
        let claims = self.jwt.validate(token, now)?;

        if self.revocations.is_revoked(claims.tenant_id, claims.jti).await? {
            tracing::info!(
                tenant_id = %claims.tenant_id,
                user_id = %claims.sub,
                token_id = %claims.jti,
                "revoked token presented"
            );
            return Err(TokenValidationError::Revoked.into());
        }

        Ok(AuthenticatedSession {
            principal: Principal::from_claims(&claims),
            token_id: claims.jti,
            expires_at: claims.exp,
        })
    }
}
