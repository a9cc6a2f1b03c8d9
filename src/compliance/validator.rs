//! Leave eligibility validation.
//!
//! Counts the requested days of an inclusive date range and classifies the
//! request against its category's policy. Everything here is a pure function of
//! the dates and the policy snapshot.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use utoipa::ToSchema;

use super::error::ComplianceError;
use super::policy::{LeaveCategory, LeavePolicy, PolicyTable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Compliant,
    Warning,
    Violation,
}

/// Facts every verdict carries regardless of outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assessment {
    pub category: LeaveCategory,
    pub requested_days: u32,
    pub max_days: u32,
    pub message: String,
    pub certificate_required: bool,
    pub law_reference: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationVerdict {
    Compliant(Assessment),
    /// Above the warning share of the ceiling but not over it.
    Warning(Assessment),
    /// Over the ceiling; only an override with justification can proceed.
    Violation(Assessment),
}

impl ValidationVerdict {
    pub fn outcome(&self) -> Outcome {
        match self {
            ValidationVerdict::Compliant(_) => Outcome::Compliant,
            ValidationVerdict::Warning(_) => Outcome::Warning,
            ValidationVerdict::Violation(_) => Outcome::Violation,
        }
    }

    pub fn assessment(&self) -> &Assessment {
        match self {
            ValidationVerdict::Compliant(a)
            | ValidationVerdict::Warning(a)
            | ValidationVerdict::Violation(a) => a,
        }
    }

    pub fn requires_override(&self) -> bool {
        matches!(self, ValidationVerdict::Violation(_))
    }

    pub fn requested_days(&self) -> u32 {
        self.assessment().requested_days
    }

    pub fn max_days(&self) -> u32 {
        self.assessment().max_days
    }

    pub fn message(&self) -> &str {
        &self.assessment().message
    }
}

/// Inclusive day count: a leave from X to X is one day.
pub fn requested_days(start: NaiveDate, end: NaiveDate) -> Result<u32, ComplianceError> {
    if end < start {
        return Err(ComplianceError::InvalidDateRange { start, end });
    }
    let span = end.signed_duration_since(start).num_days() + 1;
    u32::try_from(span).map_err(|_| ComplianceError::InvalidDateRange { start, end })
}

/// Monday to Friday inside the inclusive range. Informational only.
pub fn working_days(start: NaiveDate, end: NaiveDate) -> u32 {
    if end < start {
        return 0;
    }
    let span = end.signed_duration_since(start).num_days() + 1;
    let first = i64::from(start.weekday().num_days_from_monday());
    // whole weeks hold five working days; the rest starts on `first`
    let partial = (0..span % 7).filter(|i| (first + i) % 7 < 5).count() as i64;
    u32::try_from(span / 7 * 5 + partial).unwrap_or(u32::MAX)
}

pub fn evaluate(
    policy: &PolicyTable,
    category: LeaveCategory,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<ValidationVerdict, ComplianceError> {
    let days = requested_days(start, end)?;
    Ok(classify(policy.get(category), days))
}

/// First match wins: over the ceiling, then near it, then compliant.
pub fn classify(policy: &LeavePolicy, days: u32) -> ValidationVerdict {
    let label = policy.category.label();
    let certificate_required = policy.needs_certificate(days);

    let (outcome, mut message) = if policy.exceeds_limit(days) {
        (
            Outcome::Violation,
            format!(
                "{} of {} days exceeds the statutory maximum of {} days ({}). \
                 HR override with a written justification is required.",
                label, days, policy.max_days, policy.law_reference
            ),
        )
    } else if policy.near_limit(days) {
        (
            Outcome::Warning,
            format!(
                "{} of {} days approaches the statutory maximum of {} days but does not exceed it.",
                label, days, policy.max_days
            ),
        )
    } else {
        (
            Outcome::Compliant,
            format!(
                "{} of {} days is within the statutory maximum of {} days.",
                label, days, policy.max_days
            ),
        )
    };

    if certificate_required {
        if let Some(threshold) = policy.requires_certificate_above_days {
            message.push_str(&format!(
                " A medical certificate is required for {} longer than {} days.",
                label.to_lowercase(),
                threshold
            ));
        }
    }

    let assessment = Assessment {
        category: policy.category,
        requested_days: days,
        max_days: policy.max_days,
        message,
        certificate_required,
        law_reference: policy.law_reference.clone(),
    };

    match outcome {
        Outcome::Compliant => ValidationVerdict::Compliant(assessment),
        Outcome::Warning => ValidationVerdict::Warning(assessment),
        Outcome::Violation => ValidationVerdict::Violation(assessment),
    }
}
