use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use super::policy::{LeaveCategory, PolicyTable};
use super::validator::{self, Outcome};
use crate::model::leave_request::{LeaveRequest, LeaveStatus};

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ComplianceFinding {
    pub leave_id: u64,
    pub employee_id: u64,
    pub leave_type: LeaveCategory,
    pub requested_days: u32,
    pub max_days: u32,
    pub status: LeaveStatus,
    pub message: String,
    pub law_reference: String,
    pub override_justification: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ComplianceReport {
    #[schema(value_type = String, format = "date")]
    pub period_start: NaiveDate,
    #[schema(value_type = String, format = "date")]
    pub period_end: NaiveDate,
    pub total_requests: usize,
    pub warning_count: usize,
    pub violation_count: usize,
    /// Share of requests within their statutory maximum, in percent.
    pub compliance_rate: f64,
    pub violations: Vec<ComplianceFinding>,
}

/// Re-checks stored requests against the current policy. Cancelled and rejected
/// requests never took effect and are left out.
pub fn compliance_report(
    policy: &PolicyTable,
    period_start: NaiveDate,
    period_end: NaiveDate,
    requests: &[LeaveRequest],
) -> ComplianceReport {
    let mut total_requests = 0;
    let mut warning_count = 0;
    let mut violations = Vec::new();

    for request in requests
        .iter()
        .filter(|r| !matches!(r.status, LeaveStatus::Cancelled | LeaveStatus::Rejected))
    {
        let verdict = match validator::evaluate(
            policy,
            request.leave_type,
            request.start_date,
            request.end_date,
        ) {
            Ok(verdict) => verdict,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    leave_id = request.id,
                    "Skipping malformed leave request"
                );
                continue;
            }
        };
        total_requests += 1;

        match verdict.outcome() {
            Outcome::Compliant => {}
            Outcome::Warning => warning_count += 1,
            Outcome::Violation => violations.push(ComplianceFinding {
                leave_id: request.id,
                employee_id: request.employee_id,
                leave_type: request.leave_type,
                requested_days: verdict.requested_days(),
                max_days: verdict.max_days(),
                status: request.status,
                message: verdict.message().to_string(),
                law_reference: verdict.assessment().law_reference.clone(),
                override_justification: request.override_justification.clone(),
            }),
        }
    }

    let violation_count = violations.len();
    let compliance_rate = if total_requests == 0 {
        100.0
    } else {
        (total_requests - violation_count) as f64 / total_requests as f64 * 100.0
    };

    ComplianceReport {
        period_start,
        period_end,
        total_requests,
        warning_count,
        violation_count,
        compliance_rate,
        violations,
    }
}
