//! Confirmation and override flow for a single submission attempt.
//!
//! ```text
//! Drafting -> Evaluating -> CompliantConfirm --confirm--> Submitted
//!                        -> WarningConfirm   --confirm--> Submitted
//!                        -> ViolationBlocked --override(justification)--> Submitted
//! any non-terminal state --cancel--> Cancelled
//! ```
//!
//! Refused transitions return an error and leave the state untouched.

use chrono::NaiveDate;

use super::error::ComplianceError;
use super::policy::{LeaveCategory, PolicyTable};
use super::validator::{self, ValidationVerdict};
use crate::model::{leave_request::LeaveStatus, role::Role};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveDraft {
    pub category: LeaveCategory,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverrideNote {
    pub role: Role,
    pub justification: String,
}

/// What the flow hands to persistence once it reaches `Submitted`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub draft: LeaveDraft,
    pub verdict: ValidationVerdict,
    pub override_note: Option<OverrideNote>,
}

impl Submission {
    /// Submissions are always stored as pending; approval is a separate step.
    pub fn status(&self) -> LeaveStatus {
        LeaveStatus::Pending
    }

    pub fn exceeds_entitlement(&self) -> bool {
        self.verdict.requires_override()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowState {
    Drafting,
    Evaluating,
    CompliantConfirm(ValidationVerdict),
    WarningConfirm(ValidationVerdict),
    ViolationBlocked(ValidationVerdict),
    Submitted(Submission),
    Cancelled,
}

impl FlowState {
    pub fn name(&self) -> &'static str {
        match self {
            FlowState::Drafting => "drafting",
            FlowState::Evaluating => "evaluating",
            FlowState::CompliantConfirm(_) => "awaiting confirmation",
            FlowState::WarningConfirm(_) => "awaiting confirmation of a warning",
            FlowState::ViolationBlocked(_) => "blocked by a policy violation",
            FlowState::Submitted(_) => "submitted",
            FlowState::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, FlowState::Submitted(_) | FlowState::Cancelled)
    }

    pub fn verdict(&self) -> Option<&ValidationVerdict> {
        match self {
            FlowState::CompliantConfirm(v)
            | FlowState::WarningConfirm(v)
            | FlowState::ViolationBlocked(v) => Some(v),
            FlowState::Submitted(submission) => Some(&submission.verdict),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SubmissionFlow {
    draft: LeaveDraft,
    state: FlowState,
}

impl SubmissionFlow {
    pub fn new(draft: LeaveDraft) -> Self {
        Self {
            draft,
            state: FlowState::Drafting,
        }
    }

    pub fn state(&self) -> &FlowState {
        &self.state
    }

    pub fn draft(&self) -> &LeaveDraft {
        &self.draft
    }

    fn refuse(&self, action: &'static str) -> ComplianceError {
        ComplianceError::InvalidTransition {
            state: self.state.name(),
            action,
        }
    }

    /// Replaces the draft while it is still being edited.
    #[allow(dead_code)]
    pub fn revise(&mut self, draft: LeaveDraft) -> Result<&FlowState, ComplianceError> {
        if self.state != FlowState::Drafting {
            return Err(self.refuse("edit the request"));
        }
        self.draft = draft;
        Ok(&self.state)
    }

    /// Runs the validator synchronously. An invalid draft drops back to `Drafting`.
    pub fn evaluate(&mut self, policy: &PolicyTable) -> Result<&FlowState, ComplianceError> {
        if self.state != FlowState::Drafting {
            return Err(self.refuse("evaluate"));
        }
        self.state = FlowState::Evaluating;

        let verdict = match validator::evaluate(
            policy,
            self.draft.category,
            self.draft.start_date,
            self.draft.end_date,
        ) {
            Ok(verdict) => verdict,
            Err(e) => {
                self.state = FlowState::Drafting;
                return Err(e);
            }
        };

        self.state = match verdict {
            ValidationVerdict::Compliant(_) => FlowState::CompliantConfirm(verdict),
            ValidationVerdict::Warning(_) => FlowState::WarningConfirm(verdict),
            ValidationVerdict::Violation(_) => FlowState::ViolationBlocked(verdict),
        };
        Ok(&self.state)
    }

    pub fn confirm(&mut self) -> Result<&FlowState, ComplianceError> {
        let verdict = match &self.state {
            FlowState::CompliantConfirm(v) | FlowState::WarningConfirm(v) => v.clone(),
            _ => return Err(self.refuse("confirm")),
        };
        self.state = FlowState::Submitted(Submission {
            draft: self.draft.clone(),
            verdict,
            override_note: None,
        });
        Ok(&self.state)
    }

    /// The only way out of `ViolationBlocked` other than cancelling.
    pub fn override_violation(
        &mut self,
        role: Role,
        justification: &str,
    ) -> Result<&FlowState, ComplianceError> {
        let FlowState::ViolationBlocked(verdict) = &self.state else {
            return Err(self.refuse("override"));
        };
        if !role.can_override() {
            return Err(ComplianceError::OverrideNotPermitted);
        }
        let justification = justification.trim();
        if justification.is_empty() {
            return Err(ComplianceError::JustificationRequired);
        }

        let submission = Submission {
            draft: self.draft.clone(),
            verdict: verdict.clone(),
            override_note: Some(OverrideNote {
                role,
                justification: justification.to_string(),
            }),
        };
        self.state = FlowState::Submitted(submission);
        Ok(&self.state)
    }

    pub fn cancel(&mut self) -> Result<&FlowState, ComplianceError> {
        if self.state.is_terminal() {
            return Err(self.refuse("cancel"));
        }
        self.state = FlowState::Cancelled;
        Ok(&self.state)
    }

    pub fn into_submission(self) -> Option<Submission> {
        match self.state {
            FlowState::Submitted(submission) => Some(submission),
            _ => None,
        }
    }
}

/// Status a pending request moves to when HR approves it.
///
/// A request that violates policy can only be approved with a justification and
/// lands in `Overridden`; everything else becomes `Approved`.
pub fn approval_status(
    verdict: &ValidationVerdict,
    justification: Option<&str>,
) -> Result<LeaveStatus, ComplianceError> {
    if !verdict.requires_override() {
        return Ok(LeaveStatus::Approved);
    }
    match justification.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(LeaveStatus::Overridden),
        _ => Err(ComplianceError::JustificationRequired),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance::validator::Outcome;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn draft(category: LeaveCategory, start: &str, end: &str) -> LeaveDraft {
        LeaveDraft {
            category,
            start_date: date(start),
            end_date: date(end),
        }
    }

    fn evaluated(category: LeaveCategory, start: &str, end: &str) -> SubmissionFlow {
        let mut flow = SubmissionFlow::new(draft(category, start, end));
        flow.evaluate(PolicyTable::statutory()).unwrap();
        flow
    }

    #[test]
    fn compliant_request_needs_explicit_confirmation() {
        let mut flow = evaluated(LeaveCategory::Annual, "2025-01-06", "2025-01-10");
        assert!(matches!(flow.state(), FlowState::CompliantConfirm(_)));

        flow.confirm().unwrap();
        let submission = flow.into_submission().unwrap();
        assert_eq!(submission.status(), LeaveStatus::Pending);
        assert_eq!(submission.override_note, None);
        assert!(!submission.exceeds_entitlement());
    }

    #[test]
    fn warning_can_be_confirmed_without_privilege() {
        let mut flow = evaluated(LeaveCategory::Annual, "2025-01-01", "2025-01-17");
        assert!(matches!(flow.state(), FlowState::WarningConfirm(_)));
        assert!(flow.confirm().is_ok());
        assert!(matches!(flow.state(), FlowState::Submitted(_)));
    }

    #[test]
    fn warning_can_be_cancelled() {
        let mut flow = evaluated(LeaveCategory::Annual, "2025-01-01", "2025-01-17");
        flow.cancel().unwrap();
        assert_eq!(flow.state(), &FlowState::Cancelled);
        assert!(flow.into_submission().is_none());
    }

    #[test]
    fn violation_blocks_plain_confirmation() {
        let mut flow = evaluated(LeaveCategory::Paternity, "2025-03-01", "2025-03-15");
        assert!(matches!(flow.state(), FlowState::ViolationBlocked(_)));

        let err = flow.confirm().unwrap_err();
        assert!(matches!(err, ComplianceError::InvalidTransition { .. }));
        assert!(matches!(flow.state(), FlowState::ViolationBlocked(_)));
    }

    #[test]
    fn override_without_justification_stays_blocked() {
        let mut flow = evaluated(LeaveCategory::Paternity, "2025-03-01", "2025-03-15");
        let before = flow.state().clone();

        assert_eq!(
            flow.override_violation(Role::HrManager, ""),
            Err(ComplianceError::JustificationRequired)
        );
        assert_eq!(
            flow.override_violation(Role::HrManager, "   "),
            Err(ComplianceError::JustificationRequired)
        );
        assert_eq!(flow.state(), &before);
    }

    #[test]
    fn station_manager_cannot_override() {
        let mut flow = evaluated(LeaveCategory::Annual, "2025-01-01", "2025-01-22");
        assert_eq!(
            flow.override_violation(Role::StationManager, "Doctor's orders"),
            Err(ComplianceError::OverrideNotPermitted)
        );
        assert!(matches!(flow.state(), FlowState::ViolationBlocked(_)));
    }

    #[test]
    fn hr_override_with_justification_submits() {
        let mut flow = evaluated(LeaveCategory::Annual, "2025-01-01", "2025-01-22");
        flow.override_violation(Role::HrManager, "  Carry-over agreed with director ")
            .unwrap();

        let submission = flow.into_submission().unwrap();
        assert!(submission.exceeds_entitlement());
        assert_eq!(submission.verdict.outcome(), Outcome::Violation);
        assert_eq!(
            submission.override_note,
            Some(OverrideNote {
                role: Role::HrManager,
                justification: "Carry-over agreed with director".to_string(),
            })
        );
    }

    #[test]
    fn override_is_only_for_violations() {
        let mut flow = evaluated(LeaveCategory::Annual, "2025-01-06", "2025-01-10");
        assert!(matches!(
            flow.override_violation(Role::Admin, "not needed"),
            Err(ComplianceError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn invalid_range_returns_to_drafting() {
        let mut flow = SubmissionFlow::new(draft(LeaveCategory::Sick, "2025-02-10", "2025-02-01"));
        assert!(matches!(
            flow.evaluate(PolicyTable::statutory()),
            Err(ComplianceError::InvalidDateRange { .. })
        ));
        assert_eq!(flow.state(), &FlowState::Drafting);

        flow.revise(draft(LeaveCategory::Sick, "2025-02-01", "2025-02-02"))
            .unwrap();
        flow.evaluate(PolicyTable::statutory()).unwrap();
        assert!(matches!(flow.state(), FlowState::CompliantConfirm(_)));
    }

    #[test]
    fn terminal_states_refuse_everything() {
        let mut flow = evaluated(LeaveCategory::Sick, "2025-02-01", "2025-02-02");
        flow.confirm().unwrap();

        assert!(flow.cancel().is_err());
        assert!(flow.confirm().is_err());
        assert!(flow.evaluate(PolicyTable::statutory()).is_err());
        assert!(matches!(flow.state(), FlowState::Submitted(_)));

        let mut cancelled =
            SubmissionFlow::new(draft(LeaveCategory::Sick, "2025-02-01", "2025-02-02"));
        cancelled.cancel().unwrap();
        assert!(cancelled.cancel().is_err());
        assert!(
            cancelled
                .revise(draft(LeaveCategory::Annual, "2025-02-01", "2025-02-02"))
                .is_err()
        );
    }

    #[test]
    fn confirm_before_evaluation_is_refused() {
        let mut flow =
            SubmissionFlow::new(draft(LeaveCategory::Annual, "2025-01-06", "2025-01-10"));
        assert!(flow.confirm().is_err());
        assert_eq!(flow.state(), &FlowState::Drafting);
    }

    #[test]
    fn approval_of_violation_requires_justification() {
        let table = PolicyTable::statutory();
        let annual = |end: &str| {
            validator::evaluate(table, LeaveCategory::Annual, date("2025-01-01"), date(end))
        };
        let violation = annual("2025-01-22").unwrap();
        let compliant = annual("2025-01-05").unwrap();

        assert_eq!(approval_status(&compliant, None), Ok(LeaveStatus::Approved));
        assert_eq!(
            approval_status(&violation, None),
            Err(ComplianceError::JustificationRequired)
        );
        assert_eq!(
            approval_status(&violation, Some(" ")),
            Err(ComplianceError::JustificationRequired)
        );
        assert_eq!(
            approval_status(&violation, Some("Approved by board")),
            Ok(LeaveStatus::Overridden)
        );
    }
}
