use crate::{
    auth::auth::AuthUser,
    compliance::{
        balance::{LeaveBalance, leave_balance, months_of_service},
        policy::{LeaveCategory, LeavePolicy, PolicyTable},
        report::compliance_report,
        validator::{self, Outcome, ValidationVerdict},
    },
    model::{employee::Employee, leave_request::LeaveRequest},
};
use actix_web::{HttpResponse, Responder, web};
use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use strum::IntoEnumIterator;
use utoipa::{IntoParams, ToSchema};

/// What the UI needs to render the confirmation dialog.
#[derive(Debug, Serialize, ToSchema)]
#[schema(example = json!({
    "outcome": "warning",
    "leave_type": "annual",
    "requested_days": 17,
    "working_days": 13,
    "max_days": 21,
    "message": "Annual Leave of 17 days approaches the statutory maximum of 21 days but does not exceed it.",
    "requires_override": false,
    "certificate_required": false,
    "law_reference": "Employment Act 2007, Section 28"
}))]
pub struct VerdictResponse {
    pub outcome: Outcome,
    pub leave_type: LeaveCategory,
    pub requested_days: u32,
    pub working_days: u32,
    pub max_days: u32,
    pub message: String,
    pub requires_override: bool,
    pub certificate_required: bool,
    pub law_reference: String,
}

impl VerdictResponse {
    pub fn new(verdict: &ValidationVerdict, start: NaiveDate, end: NaiveDate) -> Self {
        let assessment = verdict.assessment();
        Self {
            outcome: verdict.outcome(),
            leave_type: assessment.category,
            requested_days: assessment.requested_days,
            working_days: validator::working_days(start, end),
            max_days: assessment.max_days,
            message: assessment.message.clone(),
            requires_override: verdict.requires_override(),
            certificate_required: assessment.certificate_required,
            law_reference: assessment.law_reference.clone(),
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct ValidateLeave {
    #[schema(example = "annual")]
    pub leave_type: LeaveCategory,
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-21", format = "date", value_type = String)]
    pub end_date: NaiveDate,
}

#[derive(Deserialize, IntoParams)]
pub struct ComplianceQuery {
    /// Window start, defaults to 1 January of the current year
    #[param(value_type = Option<String>, format = "date", example = "2026-01-01")]
    pub start_date: Option<NaiveDate>,
    /// Window end, defaults to today
    #[param(value_type = Option<String>, format = "date", example = "2026-12-31")]
    pub end_date: Option<NaiveDate>,
}

#[derive(Serialize, ToSchema)]
pub struct BalanceResponse {
    pub employee_id: u64,
    pub employee_name: String,
    pub year: i32,
    pub months_of_service: u32,
    pub balances: Vec<LeaveBalance>,
}

/// List the statutory leave policy table
#[utoipa::path(
    get,
    path = "/api/leave/policies",
    responses(
        (status = 200, description = "Policy per leave category", body = Vec<LeavePolicy>),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Compliance"
)]
pub async fn list_policies(
    _auth: AuthUser,
    policy: web::Data<PolicyTable>,
) -> actix_web::Result<impl Responder> {
    let entries: Vec<&LeavePolicy> = policy.iter().collect();
    Ok(HttpResponse::Ok().json(entries))
}

/// Check a leave span against policy without submitting it
#[utoipa::path(
    post,
    path = "/api/leave/validate",
    request_body = ValidateLeave,
    responses(
        (status = 200, description = "Validation verdict", body = VerdictResponse),
        (status = 400, description = "End date before start date", body = Object, example = json!({
            "message": "end date 2026-01-04 cannot be before start date 2026-01-05"
        })),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Compliance"
)]
pub async fn validate_leave(
    _auth: AuthUser,
    policy: web::Data<PolicyTable>,
    payload: web::Json<ValidateLeave>,
) -> actix_web::Result<impl Responder> {
    let verdict = validator::evaluate(
        &policy,
        payload.leave_type,
        payload.start_date,
        payload.end_date,
    )?;

    Ok(HttpResponse::Ok().json(VerdictResponse::new(
        &verdict,
        payload.start_date,
        payload.end_date,
    )))
}

/// Current-year leave balance of an employee
#[utoipa::path(
    get,
    path = "/api/leave/balance/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee to report on")
    ),
    responses(
        (status = 200, description = "Balance per leave category", body = BalanceResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Employee belongs to another station"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Compliance"
)]
pub async fn employee_balance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    policy: web::Data<PolicyTable>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();

    let employee = Employee::find_active(pool.get_ref(), employee_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, employee_id, "Failed to fetch employee");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;
    let Some(employee) = employee else {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Employee not found"
        })));
    };
    auth.require_location(&employee.location)?;

    let today = Local::now().date_naive();
    let year = today.year();
    let (year_start, year_end) = year_bounds(year);

    // (leave_type, status, days)
    let rows = sqlx::query_as::<_, (String, String, i64)>(
        r#"
        SELECT leave_type, status, CAST(COALESCE(SUM(total_days), 0) AS SIGNED)
        FROM leave_requests
        WHERE employee_id = ?
        AND start_date >= ?
        AND start_date <= ?
        AND status IN ('pending', 'approved', 'overridden')
        GROUP BY leave_type, status
        "#,
    )
    .bind(employee_id)
    .bind(year_start)
    .bind(year_end)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Failed to sum leave days");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let service_months = months_of_service(employee.hire_date, today);
    let balances = LeaveCategory::iter()
        .map(|category| {
            let id: &str = category.as_ref();
            let mut used = 0u32;
            let mut pending = 0u32;
            for (leave_type, status, days) in &rows {
                if leave_type.as_str() != id {
                    continue;
                }
                let days = u32::try_from(*days).unwrap_or(0);
                if status == "pending" {
                    pending += days;
                } else {
                    used += days;
                }
            }
            leave_balance(policy.get(category), service_months, used, pending)
        })
        .collect();

    Ok(HttpResponse::Ok().json(BalanceResponse {
        employee_id,
        employee_name: employee.full_name(),
        year,
        months_of_service: service_months,
        balances,
    }))
}

/// Compliance report over a date window (HR/Admin)
#[utoipa::path(
    get,
    path = "/api/leave/compliance",
    params(ComplianceQuery),
    responses(
        (status = 200, description = "Compliance report", body = ComplianceReport),
        (status = 400, description = "End date before start date"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Compliance"
)]
pub async fn compliance_summary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    policy: web::Data<PolicyTable>,
    query: web::Query<ComplianceQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let today = Local::now().date_naive();
    let start = query.start_date.unwrap_or_else(|| year_bounds(today.year()).0);
    let end = query.end_date.unwrap_or(today);
    validator::requested_days(start, end)?;

    let requests = sqlx::query_as::<_, LeaveRequest>(
        r#"
        SELECT id, employee_id, leave_type, start_date, end_date, total_days, reason,
               requested_by, status, exceeds_entitlement, override_justification,
               hr_notes, created_at
        FROM leave_requests
        WHERE start_date >= ?
        AND end_date <= ?
        ORDER BY start_date
        "#,
    )
    .bind(start)
    .bind(end)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to fetch leave requests for compliance report");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let report = compliance_report(&policy, start, end, &requests);
    tracing::info!(
        target: "audit",
        hr = %auth.username,
        %start,
        %end,
        violations = report.violation_count,
        "Compliance report generated"
    );

    Ok(HttpResponse::Ok().json(report))
}

fn year_bounds(year: i32) -> (NaiveDate, NaiveDate) {
    let start = NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(NaiveDate::MIN);
    let end = NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or(NaiveDate::MAX);
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{auth::jwt::generate_access_token, config::Config, model::role::Role};
    use actix_web::{App, http::StatusCode};
    use serde_json::Value;

    const SECRET: &str = "compliance-test-secret";

    fn config() -> Config {
        Config::from_lookup(|key| match key {
            "SERVER_ADDR" => Some("127.0.0.1:0".to_string()),
            "DATABASE_URL" => Some("mysql://unused".to_string()),
            "JWT_SECRET" => Some(SECRET.to_string()),
            _ => None,
        })
        .unwrap()
    }

    fn bearer(role: Role) -> (&'static str, String) {
        let token = generate_access_token(1, "tester".into(), role.id(), None, SECRET, 60).unwrap();
        ("Authorization", format!("Bearer {token}"))
    }

    macro_rules! app {
        () => {
            actix_web::test::init_service(
                App::new()
                    .app_data(web::Data::new(config()))
                    .app_data(web::Data::new(PolicyTable::statutory().clone()))
                    .route("/leave/policies", web::get().to(list_policies))
                    .route("/leave/validate", web::post().to(validate_leave)),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn validate_returns_warning_verdict() {
        let app = app!();
        let req = actix_web::test::TestRequest::post()
            .uri("/leave/validate")
            .insert_header(bearer(Role::StationManager))
            .set_json(serde_json::json!({
                "leave_type": "annual",
                "start_date": "2025-01-01",
                "end_date": "2025-01-17"
            }))
            .to_request();

        let body: Value = actix_web::test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["outcome"], "warning");
        assert_eq!(body["requested_days"], 17);
        assert_eq!(body["max_days"], 21);
        assert_eq!(body["requires_override"], false);
    }

    #[actix_web::test]
    async fn validate_flags_violation_for_override() {
        let app = app!();
        let req = actix_web::test::TestRequest::post()
            .uri("/leave/validate")
            .insert_header(bearer(Role::HrManager))
            .set_json(serde_json::json!({
                "leave_type": "paternity",
                "start_date": "2025-03-01",
                "end_date": "2025-03-15"
            }))
            .to_request();

        let body: Value = actix_web::test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["outcome"], "violation");
        assert_eq!(body["requested_days"], 15);
        assert_eq!(body["requires_override"], true);
        assert_eq!(body["law_reference"], "Employment Act 2007, Section 30A");
    }

    #[actix_web::test]
    async fn validate_rejects_reversed_range() {
        let app = app!();
        let req = actix_web::test::TestRequest::post()
            .uri("/leave/validate")
            .insert_header(bearer(Role::HrManager))
            .set_json(serde_json::json!({
                "leave_type": "sick",
                "start_date": "2025-03-10",
                "end_date": "2025-03-01"
            }))
            .to_request();

        let resp = actix_web::test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn validate_rejects_unknown_category() {
        let app = app!();
        let req = actix_web::test::TestRequest::post()
            .uri("/leave/validate")
            .insert_header(bearer(Role::HrManager))
            .set_json(serde_json::json!({
                "leave_type": "sabbatical",
                "start_date": "2025-03-01",
                "end_date": "2025-03-02"
            }))
            .to_request();

        let resp = actix_web::test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn policies_require_a_token() {
        let app = app!();
        let req = actix_web::test::TestRequest::get().uri("/leave/policies").to_request();
        let resp = actix_web::test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn policies_list_every_category() {
        let app = app!();
        let req = actix_web::test::TestRequest::get()
            .uri("/leave/policies")
            .insert_header(bearer(Role::StationManager))
            .to_request();

        let body: Value = actix_web::test::call_and_read_body_json(&app, req).await;
        let entries = body.as_array().unwrap();
        assert_eq!(entries.len(), LeaveCategory::iter().count());
        assert_eq!(entries[0]["category"], "annual");
        assert_eq!(entries[0]["max_days"], 21);
    }
}
