use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use carehub_core::{
    DomainError, DomainResult, RecordId, Resource, StatusMachine, TenantId, TenantScoped, Validated,
    optional_text, patch_text, require_text,
};

/// Employment status lifecycle. `TERMINATED` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmploymentStatus {
    Active,
    OnLeave,
    Suspended,
    Terminated,
}

impl core::fmt::Display for EmploymentStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            EmploymentStatus::Active => "ACTIVE",
            EmploymentStatus::OnLeave => "ON_LEAVE",
            EmploymentStatus::Suspended => "SUSPENDED",
            EmploymentStatus::Terminated => "TERMINATED",
        };
        f.write_str(s)
    }
}

impl StatusMachine for EmploymentStatus {
    fn can_transition_to(self, target: Self) -> bool {
        use EmploymentStatus::*;
        matches!(
            (self, target),
            (Active, OnLeave | Suspended | Terminated)
                | (OnLeave, Active | Terminated)
                | (Suspended, Active | Terminated)
        )
    }

    fn archived() -> Option<Self> {
        Some(EmploymentStatus::Terminated)
    }
}

/// Staff member record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffMember {
    pub id: RecordId,
    pub tenant_id: TenantId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub department: String,
    pub position: String,
    pub phone: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub status: EmploymentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub phone: Option<String>,
    pub hire_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStaffMember {
    first_name: String,
    last_name: String,
    email: String,
    department: String,
    position: String,
    phone: Option<String>,
    hire_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StaffPatch {
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    department: Option<String>,
    position: Option<String>,
    phone: Option<String>,
    hire_date: Option<NaiveDate>,
}

fn check_email(email: Option<String>) -> DomainResult<Option<String>> {
    match email {
        Some(e) if !e.contains('@') => Err(DomainError::validation("email must be a valid address")),
        other => Ok(other.map(|e| e.to_lowercase())),
    }
}

fn parse_hire_date(value: Option<String>) -> DomainResult<Option<NaiveDate>> {
    optional_text(value)
        .map(|raw| {
            NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                .map_err(|_| DomainError::validation("hireDate must be a YYYY-MM-DD date"))
        })
        .transpose()
}

impl Validated for NewStaffMember {
    type Raw = StaffRequest;

    fn validate(raw: Self::Raw) -> DomainResult<Self> {
        let email = check_email(Some(require_text("email", raw.email)?))?;
        Ok(Self {
            first_name: require_text("firstName", raw.first_name)?,
            last_name: require_text("lastName", raw.last_name)?,
            email: email.unwrap_or_default(),
            department: require_text("department", raw.department)?,
            position: require_text("position", raw.position)?,
            phone: optional_text(raw.phone),
            hire_date: parse_hire_date(raw.hire_date)?,
        })
    }
}

impl Validated for StaffPatch {
    type Raw = StaffRequest;

    fn validate(raw: Self::Raw) -> DomainResult<Self> {
        Ok(Self {
            first_name: patch_text("firstName", raw.first_name)?,
            last_name: patch_text("lastName", raw.last_name)?,
            email: check_email(patch_text("email", raw.email)?)?,
            department: patch_text("department", raw.department)?,
            position: patch_text("position", raw.position)?,
            phone: optional_text(raw.phone),
            hire_date: parse_hire_date(raw.hire_date)?,
        })
    }
}

impl TenantScoped for StaffMember {
    fn id(&self) -> RecordId {
        self.id
    }

    fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }
}

impl Resource for StaffMember {
    const KIND: &'static str = "staff";

    type Draft = NewStaffMember;
    type Patch = StaffPatch;
    type Status = EmploymentStatus;

    fn from_draft(id: RecordId, tenant_id: TenantId, draft: NewStaffMember, now: DateTime<Utc>) -> Self {
        Self {
            id,
            tenant_id,
            first_name: draft.first_name,
            last_name: draft.last_name,
            email: draft.email,
            department: draft.department,
            position: draft.position,
            phone: draft.phone,
            hire_date: draft.hire_date,
            status: EmploymentStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: StaffPatch, now: DateTime<Utc>) -> DomainResult<()> {
        let StaffPatch {
            first_name,
            last_name,
            email,
            department,
            position,
            phone,
            hire_date,
        } = patch;

        self.first_name = first_name.unwrap_or(core::mem::take(&mut self.first_name));
        self.last_name = last_name.unwrap_or(core::mem::take(&mut self.last_name));
        self.email = email.unwrap_or(core::mem::take(&mut self.email));
        self.department = department.unwrap_or(core::mem::take(&mut self.department));
        self.position = position.unwrap_or(core::mem::take(&mut self.position));
        self.phone = phone.or(self.phone.take());
        self.hire_date = hire_date.or(self.hire_date);
        self.updated_at = now;
        Ok(())
    }

    fn status(&self) -> EmploymentStatus {
        self.status
    }

    fn set_status(&mut self, status: EmploymentStatus, now: DateTime<Utc>) {
        self.status = status;
        self.updated_at = now;
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.first_name.as_str(),
            self.last_name.as_str(),
            self.email.as_str(),
            self.department.as_str(),
            self.position.as_str(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn member() -> StaffMember {
        let draft = NewStaffMember::from_json(json!({
            "firstName": "Gregory",
            "lastName": "House",
            "email": "G.House@example.org",
            "department": "Diagnostics",
            "position": "Attending",
        }))
        .unwrap();
        StaffMember::from_draft(RecordId::new(), TenantId::new(), draft, Utc::now())
    }

    #[test]
    fn create_requires_department_and_position() {
        let err = NewStaffMember::from_json(json!({
            "firstName": "A",
            "lastName": "B",
            "email": "a@b.c",
            "position": "Nurse",
        }))
        .unwrap_err();
        assert_eq!(err, DomainError::validation("department is required"));
    }

    #[test]
    fn create_normalizes_email() {
        assert_eq!(member().email, "g.house@example.org");
    }

    #[test]
    fn create_rejects_invalid_email() {
        let err = NewStaffMember::from_json(json!({
            "firstName": "A",
            "lastName": "B",
            "email": "nope",
            "department": "ER",
            "position": "Nurse",
        }))
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn patch_updates_department_only() {
        let mut m = member();
        m.apply_patch(StaffPatch::from_json(json!({ "department": "Oncology" })).unwrap(), Utc::now())
            .unwrap();
        assert_eq!(m.department, "Oncology");
        assert_eq!(m.first_name, "Gregory");
        assert_eq!(m.email, "g.house@example.org");
    }

    #[test]
    fn leave_and_return() {
        let mut m = member();
        m.transition(EmploymentStatus::OnLeave, Utc::now()).unwrap();
        m.transition(EmploymentStatus::Active, Utc::now()).unwrap();
        m.transition(EmploymentStatus::Terminated, Utc::now()).unwrap();

        let err = m.transition(EmploymentStatus::Active, Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)));
    }

    #[test]
    fn on_leave_cannot_be_suspended() {
        assert!(!EmploymentStatus::OnLeave.can_transition_to(EmploymentStatus::Suspended));
    }
}
