use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use utoipa::ToSchema;

use super::policy::{LeaveCategory, LeavePolicy};

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct LeaveBalance {
    pub leave_type: LeaveCategory,
    pub entitlement: f64,
    pub used: u32,
    pub pending: u32,
    pub available: f64,
}

/// Whole months between `hire_date` and `today`; zero before the hire date.
pub fn months_of_service(hire_date: NaiveDate, today: NaiveDate) -> u32 {
    if today < hire_date {
        return 0;
    }
    let mut months = (today.year() - hire_date.year()) * 12 + today.month() as i32
        - hire_date.month() as i32;
    if today.day() < hire_date.day() {
        months -= 1;
    }
    months.max(0) as u32
}

/// Annual leave accrues pro rata during the first year of service, rounded to
/// one decimal. Other categories grant the full maximum.
pub fn entitlement(policy: &LeavePolicy, service_months: u32) -> f64 {
    let max_days = f64::from(policy.max_days);
    if policy.category == LeaveCategory::Annual && service_months < 12 {
        (max_days * f64::from(service_months) / 12.0 * 10.0).round() / 10.0
    } else {
        max_days
    }
}

pub fn leave_balance(
    policy: &LeavePolicy,
    service_months: u32,
    used: u32,
    pending: u32,
) -> LeaveBalance {
    let entitlement = entitlement(policy, service_months);
    let available = (entitlement - f64::from(used) - f64::from(pending)).max(0.0);

    LeaveBalance {
        leave_type: policy.category,
        entitlement,
        used,
        pending,
        available,
    }
}
