//! `carehub-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;
pub mod resource;
pub mod value_object;

pub use entity::TenantScoped;
pub use error::{DomainError, DomainResult};
pub use id::{RecordId, TenantId, UserId};
pub use resource::{Resource, StatusMachine};
pub use value_object::{Validated, optional_text, patch_text, require_text};
