use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use carehub_core::{
    DomainError, DomainResult, RecordId, Resource, StatusMachine, TenantId, TenantScoped, Validated,
    optional_text, patch_text, require_text,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    #[default]
    Routine,
    Urgent,
    Stat,
}

/// Lab order workflow.
///
/// `ORDERED → SAMPLE_COLLECTED → IN_PROGRESS → COMPLETED`, with `CANCELLED`
/// reachable from any non-terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LabOrderStatus {
    Ordered,
    SampleCollected,
    InProgress,
    Completed,
    Cancelled,
}

impl LabOrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, LabOrderStatus::Completed | LabOrderStatus::Cancelled)
    }
}

impl core::fmt::Display for LabOrderStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            LabOrderStatus::Ordered => "ORDERED",
            LabOrderStatus::SampleCollected => "SAMPLE_COLLECTED",
            LabOrderStatus::InProgress => "IN_PROGRESS",
            LabOrderStatus::Completed => "COMPLETED",
            LabOrderStatus::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

impl StatusMachine for LabOrderStatus {
    fn can_transition_to(self, target: Self) -> bool {
        use LabOrderStatus::*;
        match (self, target) {
            (Ordered, SampleCollected) | (SampleCollected, InProgress) | (InProgress, Completed) => true,
            (from, Cancelled) => !from.is_terminal(),
            _ => false,
        }
    }

    fn archived() -> Option<Self> {
        Some(LabOrderStatus::Cancelled)
    }
}

/// Laboratory test order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabOrder {
    pub id: RecordId,
    pub tenant_id: TenantId,
    pub patient_id: RecordId,
    pub test_code: String,
    pub test_name: String,
    pub priority: Priority,
    pub ordered_by: Option<String>,
    pub notes: Option<String>,
    pub result: Option<String>,
    pub status: LabOrderStatus,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLabOrderRequest {
    pub patient_id: Option<String>,
    pub test_code: Option<String>,
    pub test_name: Option<String>,
    pub priority: Option<Priority>,
    pub ordered_by: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLabOrderRequest {
    pub test_name: Option<String>,
    pub priority: Option<Priority>,
    pub notes: Option<String>,
    pub result: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLabOrder {
    patient_id: RecordId,
    test_code: String,
    test_name: String,
    priority: Priority,
    ordered_by: Option<String>,
    notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LabOrderPatch {
    test_name: Option<String>,
    priority: Option<Priority>,
    notes: Option<String>,
    result: Option<String>,
}

impl Validated for NewLabOrder {
    type Raw = CreateLabOrderRequest;

    fn validate(raw: Self::Raw) -> DomainResult<Self> {
        let patient_id = require_text("patientId", raw.patient_id)?
            .parse::<RecordId>()
            .map_err(|_| DomainError::validation("patientId must be a UUID"))?;

        Ok(Self {
            patient_id,
            test_code: require_text("testCode", raw.test_code)?.to_uppercase(),
            test_name: require_text("testName", raw.test_name)?,
            priority: raw.priority.unwrap_or_default(),
            ordered_by: optional_text(raw.ordered_by),
            notes: optional_text(raw.notes),
        })
    }
}

impl Validated for LabOrderPatch {
    type Raw = UpdateLabOrderRequest;

    fn validate(raw: Self::Raw) -> DomainResult<Self> {
        Ok(Self {
            test_name: patch_text("testName", raw.test_name)?,
            priority: raw.priority,
            notes: optional_text(raw.notes),
            result: optional_text(raw.result),
        })
    }
}

impl TenantScoped for LabOrder {
    fn id(&self) -> RecordId {
        self.id
    }

    fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }
}

impl Resource for LabOrder {
    const KIND: &'static str = "pathology";

    type Draft = NewLabOrder;
    type Patch = LabOrderPatch;
    type Status = LabOrderStatus;

    fn from_draft(id: RecordId, tenant_id: TenantId, draft: NewLabOrder, now: DateTime<Utc>) -> Self {
        Self {
            id,
            tenant_id,
            patient_id: draft.patient_id,
            test_code: draft.test_code,
            test_name: draft.test_name,
            priority: draft.priority,
            ordered_by: draft.ordered_by,
            notes: draft.notes,
            result: None,
            status: LabOrderStatus::Ordered,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply_patch(&mut self, patch: LabOrderPatch, now: DateTime<Utc>) -> DomainResult<()> {
        if self.status.is_terminal() {
            return Err(DomainError::invalid_state(format!(
                "lab order is {} and can no longer be edited",
                self.status
            )));
        }
        if let Some(v) = patch.test_name {
            self.test_name = v;
        }
        if let Some(v) = patch.priority {
            self.priority = v;
        }
        if let Some(v) = patch.notes {
            self.notes = Some(v);
        }
        if let Some(v) = patch.result {
            self.result = Some(v);
        }
        self.updated_at = now;
        Ok(())
    }

    fn status(&self) -> LabOrderStatus {
        self.status
    }

    fn set_status(&mut self, status: LabOrderStatus, now: DateTime<Utc>) {
        self.status = status;
        if status == LabOrderStatus::Completed {
            self.completed_at = Some(now);
        }
        self.updated_at = now;
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.test_code.as_str(), self.test_name.as_str()];
        fields.extend(self.ordered_by.as_deref());
        fields
    }

    fn transition(&mut self, target: LabOrderStatus, now: DateTime<Utc>) -> DomainResult<()> {
        if !self.status.can_transition_to(target) {
            return Err(DomainError::invalid_state(format!(
                "lab order cannot move from {} to {target}",
                self.status
            )));
        }
        if target == LabOrderStatus::Completed && self.result.is_none() {
            return Err(DomainError::invalid_state("a result is required before completion"));
        }
        self.set_status(target, now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn order() -> LabOrder {
        let draft = NewLabOrder::from_json(json!({
            "patientId": RecordId::new().to_string(),
            "testCode": "cbc",
            "testName": "Complete blood count",
            "priority": "STAT",
        }))
        .unwrap();
        LabOrder::from_draft(RecordId::new(), TenantId::new(), draft, Utc::now())
    }

    #[test]
    fn create_rejects_non_uuid_patient() {
        let err = NewLabOrder::from_json(json!({
            "patientId": "42",
            "testCode": "CBC",
            "testName": "Complete blood count",
        }))
        .unwrap_err();
        assert_eq!(err, DomainError::validation("patientId must be a UUID"));
    }

    #[test]
    fn create_uppercases_code_and_starts_ordered() {
        let o = order();
        assert_eq!(o.test_code, "CBC");
        assert_eq!(o.priority, Priority::Stat);
        assert_eq!(o.status, LabOrderStatus::Ordered);
    }

    #[test]
    fn workflow_runs_in_order() {
        let mut o = order();
        let err = o.transition(LabOrderStatus::InProgress, Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)));

        o.transition(LabOrderStatus::SampleCollected, Utc::now()).unwrap();
        o.transition(LabOrderStatus::InProgress, Utc::now()).unwrap();
        o.apply_patch(
            LabOrderPatch::from_json(json!({ "result": "WBC 6.1" })).unwrap(),
            Utc::now(),
        )
        .unwrap();
        o.transition(LabOrderStatus::Completed, Utc::now()).unwrap();

        assert!(o.completed_at.is_some());
    }

    #[test]
    fn completion_requires_result() {
        let mut o = order();
        o.transition(LabOrderStatus::SampleCollected, Utc::now()).unwrap();
        o.transition(LabOrderStatus::InProgress, Utc::now()).unwrap();

        let err = o.transition(LabOrderStatus::Completed, Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::InvalidState(_)));
        assert_eq!(o.status, LabOrderStatus::InProgress);
    }

    #[test]
    fn cancelled_orders_are_frozen() {
        let mut o = order();
        o.transition(LabOrderStatus::Cancelled, Utc::now()).unwrap();

        assert!(o.transition(LabOrderStatus::Cancelled, Utc::now()).is_err());
        let patch = LabOrderPatch::from_json(json!({ "notes": "late" })).unwrap();
        assert!(matches!(o.apply_patch(patch, Utc::now()), Err(DomainError::InvalidState(_))));
    }
}
