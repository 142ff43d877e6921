//! Staff domain module (doctors, nurses, technicians, administration).

pub mod member;

pub use member::{EmploymentStatus, NewStaffMember, StaffMember, StaffPatch};
