use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use carehub_core::{
    DomainError, DomainResult, RecordId, Resource, StatusMachine, TenantId, TenantScoped, Validated,
    optional_text, patch_text, require_text,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
    Other,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BloodGroup {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
}

/// Patient status lifecycle.
///
/// `ARCHIVED` is terminal and doubles as the soft-delete state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PatientStatus {
    Active,
    Inactive,
    Deceased,
    Archived,
}

impl core::fmt::Display for PatientStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            PatientStatus::Active => "ACTIVE",
            PatientStatus::Inactive => "INACTIVE",
            PatientStatus::Deceased => "DECEASED",
            PatientStatus::Archived => "ARCHIVED",
        };
        f.write_str(s)
    }
}

impl StatusMachine for PatientStatus {
    fn can_transition_to(self, target: Self) -> bool {
        use PatientStatus::*;
        matches!(
            (self, target),
            (Active, Inactive | Deceased | Archived) | (Inactive, Active | Archived) | (Deceased, Archived)
        )
    }

    fn archived() -> Option<Self> {
        Some(PatientStatus::Archived)
    }
}

/// Patient record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: RecordId,
    pub tenant_id: TenantId,
    pub medical_record_number: String,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Gender,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub blood_group: Option<BloodGroup>,
    pub status: PatientStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Medical record number derived from the random tail of the record id.
fn medical_record_number(id: RecordId) -> String {
    let simple = id.as_uuid().simple().to_string();
    format!("MRN-{}", simple[simple.len() - 8..].to_uppercase())
}

// ─────────────────────────────────────────────────────────────────────────────
// Payloads
// ─────────────────────────────────────────────────────────────────────────────

/// Raw create body as received over the wire.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePatientRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<String>,
    pub gender: Option<Gender>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub blood_group: Option<BloodGroup>,
}

/// Raw update body; absent fields are left untouched.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePatientRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<String>,
    pub gender: Option<Gender>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub blood_group: Option<BloodGroup>,
}

/// Validated create payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPatient {
    first_name: String,
    last_name: String,
    date_of_birth: Option<NaiveDate>,
    gender: Gender,
    phone: Option<String>,
    email: Option<String>,
    address: Option<String>,
    blood_group: Option<BloodGroup>,
}

/// Validated partial update.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PatientPatch {
    first_name: Option<String>,
    last_name: Option<String>,
    date_of_birth: Option<NaiveDate>,
    gender: Option<Gender>,
    phone: Option<String>,
    email: Option<String>,
    address: Option<String>,
    blood_group: Option<BloodGroup>,
}

fn parse_date_of_birth(value: Option<String>) -> DomainResult<Option<NaiveDate>> {
    let Some(raw) = optional_text(value) else {
        return Ok(None);
    };
    let date = NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .map_err(|_| DomainError::validation("dateOfBirth must be a YYYY-MM-DD date"))?;
    if date > Utc::now().date_naive() {
        return Err(DomainError::validation("dateOfBirth cannot be in the future"));
    }
    Ok(Some(date))
}

fn parse_email(value: Option<String>) -> DomainResult<Option<String>> {
    match optional_text(value) {
        Some(email) if !email.contains('@') => Err(DomainError::validation("email must be a valid address")),
        other => Ok(other),
    }
}

impl Validated for NewPatient {
    type Raw = CreatePatientRequest;

    fn validate(raw: Self::Raw) -> DomainResult<Self> {
        Ok(Self {
            first_name: require_text("firstName", raw.first_name)?,
            last_name: require_text("lastName", raw.last_name)?,
            date_of_birth: parse_date_of_birth(raw.date_of_birth)?,
            gender: raw.gender.unwrap_or_default(),
            phone: optional_text(raw.phone),
            email: parse_email(raw.email)?,
            address: optional_text(raw.address),
            blood_group: raw.blood_group,
        })
    }
}

impl Validated for PatientPatch {
    type Raw = UpdatePatientRequest;

    fn validate(raw: Self::Raw) -> DomainResult<Self> {
        Ok(Self {
            first_name: patch_text("firstName", raw.first_name)?,
            last_name: patch_text("lastName", raw.last_name)?,
            date_of_birth: parse_date_of_birth(raw.date_of_birth)?,
            gender: raw.gender,
            phone: optional_text(raw.phone),
            email: parse_email(raw.email)?,
            address: optional_text(raw.address),
            blood_group: raw.blood_group,
        })
    }
}

impl TenantScoped for Patient {
    fn id(&self) -> RecordId {
        self.id
    }

    fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }
}

impl Resource for Patient {
    const KIND: &'static str = "patients";

    type Draft = NewPatient;
    type Patch = PatientPatch;
    type Status = PatientStatus;

    fn from_draft(id: RecordId, tenant_id: TenantId, draft: NewPatient, now: DateTime<Utc>) -> Self {
        Self {
            id,
            tenant_id,
            medical_record_number: medical_record_number(id),
            first_name: draft.first_name,
            last_name: draft.last_name,
            date_of_birth: draft.date_of_birth,
            gender: draft.gender,
            phone: draft.phone,
            email: draft.email,
            address: draft.address,
            blood_group: draft.blood_group,
            status: PatientStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: PatientPatch, now: DateTime<Utc>) -> DomainResult<()> {
        if let Some(v) = patch.first_name {
            self.first_name = v;
        }
        if let Some(v) = patch.last_name {
            self.last_name = v;
        }
        if let Some(v) = patch.date_of_birth {
            self.date_of_birth = Some(v);
        }
        if let Some(v) = patch.gender {
            self.gender = v;
        }
        if let Some(v) = patch.phone {
            self.phone = Some(v);
        }
        if let Some(v) = patch.email {
            self.email = Some(v);
        }
        if let Some(v) = patch.address {
            self.address = Some(v);
        }
        if let Some(v) = patch.blood_group {
            self.blood_group = Some(v);
        }
        self.updated_at = now;
        Ok(())
    }

    fn status(&self) -> PatientStatus {
        self.status
    }

    fn set_status(&mut self, status: PatientStatus, now: DateTime<Utc>) {
        self.status = status;
        self.updated_at = now;
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![
            self.first_name.as_str(),
            self.last_name.as_str(),
            self.medical_record_number.as_str(),
        ];
        fields.extend(self.phone.as_deref());
        fields.extend(self.email.as_deref());
        fields
    }
}
