use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use crate::compliance::{error::ComplianceError, policy::LeaveCategory};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    ToSchema,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
    /// Approved through the override path with a recorded justification.
    Overridden,
    Cancelled,
}

impl LeaveStatus {
    pub fn can_cancel(self) -> bool {
        matches!(
            self,
            LeaveStatus::Pending | LeaveStatus::Approved | LeaveStatus::Overridden
        )
    }
}

impl TryFrom<String> for LeaveStatus {
    type Error = ComplianceError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value
            .parse()
            .map_err(|_| ComplianceError::UnknownStatus(value))
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[schema(example = json!({
    "id": 1,
    "employee_id": 1000,
    "leave_type": "annual",
    "start_date": "2026-01-05",
    "end_date": "2026-01-16",
    "total_days": 12,
    "reason": "Family holiday",
    "requested_by": 2,
    "status": "pending",
    "exceeds_entitlement": false,
    "override_justification": null,
    "hr_notes": null,
    "created_at": "2026-01-01T00:00:00Z"
}))]
pub struct LeaveRequest {
    pub id: u64,
    pub employee_id: u64,
    #[sqlx(try_from = "String")]
    pub leave_type: LeaveCategory,
    #[schema(value_type = String, format = "date")]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = "date")]
    pub end_date: NaiveDate,
    pub total_days: u32,
    pub reason: String,
    pub requested_by: u64,
    #[sqlx(try_from = "String")]
    pub status: LeaveStatus,
    pub exceeds_entitlement: bool,
    pub override_justification: Option<String>,
    pub hr_notes: Option<String>,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}
