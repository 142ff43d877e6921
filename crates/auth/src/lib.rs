//! `carehub-auth`: authentication/authorization boundary (zero-trust).
//!
//! This crate is intentionally decoupled from HTTP and storage: revocation
//! lookups go through the `RevocationStore` trait.

pub mod authenticator;
pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod permissions;
pub mod principal;
pub mod revocation;
pub mod roles;
pub mod scope;

pub use authenticator::{AuthError, AuthenticatedSession, Authenticator};
pub use authorize::{AuthorizationExplanation, AuthzError, authorize, explain_authorization};
pub use claims::{JwtClaims, TokenId, TokenValidationError, validate_claims};
pub use jwt::{Hs256JwtValidator, JwtIssuer, JwtValidator};
pub use permissions::Permission;
pub use principal::Principal;
pub use revocation::{InMemoryRevocationStore, RevocationError, RevocationStore, RevokedToken};
pub use roles::{Role, RoleDefinition};
pub use scope::TenantScope;
