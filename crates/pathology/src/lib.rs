//! Pathology domain module: laboratory test orders and their workflow.
//!
//! Orders reference a patient by id only; the patient's existence is not
//! checked across resources.

pub mod order;

pub use order::{LabOrder, LabOrderPatch, LabOrderStatus, NewLabOrder, Priority};
