//! The resource contract shared by every tenant-scoped record type.

use chrono::{DateTime, Utc};
use serde::{Serialize, de::DeserializeOwned};

use crate::entity::TenantScoped;
use crate::error::{DomainError, DomainResult};
use crate::id::{RecordId, TenantId};
use crate::value_object::Validated;

/// Lifecycle status with a fixed transition table.
pub trait StatusMachine:
    Copy + Eq + core::fmt::Debug + core::fmt::Display + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Whether `self -> target` is an allowed transition.
    fn can_transition_to(self, target: Self) -> bool;

    /// Status used for soft deletion, if the resource supports it.
    fn archived() -> Option<Self> {
        None
    }
}

/// A tenant-scoped record managed through the generic resource service.
///
/// Implementations only own their field validation and status table; tenancy,
/// identifiers and timestamps are assigned by the service.
pub trait Resource:
    TenantScoped + Clone + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Stable kind name, used as the storage discriminator and permission prefix.
    const KIND: &'static str;

    /// Validated create payload.
    type Draft: Validated + Send + 'static;

    /// Validated partial update.
    type Patch: Validated + Send + 'static;

    type Status: StatusMachine;

    fn from_draft(id: RecordId, tenant_id: TenantId, draft: Self::Draft, now: DateTime<Utc>) -> Self;

    /// Merge a validated patch. May refuse patches in terminal states.
    fn apply_patch(&mut self, patch: Self::Patch, now: DateTime<Utc>) -> DomainResult<()>;

    fn status(&self) -> Self::Status;

    fn set_status(&mut self, status: Self::Status, now: DateTime<Utc>);

    /// Text fields matched by free-text `search` filters.
    fn search_fields(&self) -> Vec<&str> {
        Vec::new()
    }

    /// Move to `target`, enforcing the status table.
    fn transition(&mut self, target: Self::Status, now: DateTime<Utc>) -> DomainResult<()> {
        let current = self.status();
        if !current.can_transition_to(target) {
            return Err(DomainError::invalid_state(format!(
                "{} cannot move from {current} to {target}",
                Self::KIND
            )));
        }
        self.set_status(target, now);
        Ok(())
    }
}
