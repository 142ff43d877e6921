use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Permission;

/// Role identifier used for RBAC.
///
/// Each principal holds exactly one role per tenant. The role → permission
/// mapping is the static table below; there is no runtime grant/revoke.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Doctor,
    Nurse,
    Receptionist,
    LabTechnician,
    HrManager,
    Accountant,
}

static ROLE_TABLE: &[(Role, &str, &[&str])] = &[
    (Role::Admin, "Hospital administrator with every permission", &["*"]),
    (
        Role::Doctor,
        "Physician managing patients and lab orders",
        &[
            "patients.read",
            "patients.update",
            "patients.status",
            "pathology.read",
            "pathology.create",
            "pathology.update",
            "pathology.status",
            "staff.read",
        ],
    ),
    (
        Role::Nurse,
        "Ward staff updating patient details and ordering tests",
        &[
            "patients.read",
            "patients.update",
            "pathology.read",
            "pathology.create",
            "staff.read",
        ],
    ),
    (
        Role::Receptionist,
        "Front desk registering and updating patients",
        &["patients.read", "patients.create", "patients.update", "staff.read"],
    ),
    (
        Role::LabTechnician,
        "Pathology lab processing orders",
        &["patients.read", "pathology.read", "pathology.update", "pathology.status"],
    ),
    (
        Role::HrManager,
        "Human resources managing staff records",
        &["staff.read", "staff.create", "staff.update", "staff.status"],
    ),
    (Role::Accountant, "Billing with read-only patient access", &["patients.read"]),
];

impl Role {
    pub const ALL: [Role; 7] = [
        Role::Admin,
        Role::Doctor,
        Role::Nurse,
        Role::Receptionist,
        Role::LabTechnician,
        Role::HrManager,
        Role::Accountant,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Doctor => "DOCTOR",
            Role::Nurse => "NURSE",
            Role::Receptionist => "RECEPTIONIST",
            Role::LabTechnician => "LAB_TECHNICIAN",
            Role::HrManager => "HR_MANAGER",
            Role::Accountant => "ACCOUNTANT",
        }
    }

    /// Permissions granted by this role.
    pub fn permissions(&self) -> Vec<Permission> {
        ROLE_TABLE
            .iter()
            .find(|(role, _, _)| role == self)
            .map(|(_, _, perms)| perms.iter().map(|p| Permission::from_static(*p)).collect())
            .unwrap_or_default()
    }

    pub fn description(&self) -> &'static str {
        ROLE_TABLE
            .iter()
            .find(|(role, _, _)| role == self)
            .map(|(_, desc, _)| *desc)
            .unwrap_or_default()
    }

    pub fn definition(&self) -> RoleDefinition {
        RoleDefinition {
            name: self.as_str(),
            description: self.description(),
            permissions: self.permissions().iter().map(|p| p.as_str().to_string()).collect(),
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown role '{s}'"))
    }
}

/// Role definition with its granted permissions (for audit/display).
#[derive(Debug, Clone, Serialize)]
pub struct RoleDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub permissions: Vec<String>,
}
