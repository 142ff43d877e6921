//! Patients domain module.
//!
//! Patient records, their validated create/update payloads and the status
//! lifecycle. Pure domain logic (no IO, no HTTP, no storage).

pub mod patient;

pub use patient::{BloodGroup, Gender, NewPatient, Patient, PatientPatch, PatientStatus};
