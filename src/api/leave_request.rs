use crate::{
    api::compliance::VerdictResponse,
    auth::auth::AuthUser,
    compliance::{
        flow::{LeaveDraft, Submission, SubmissionFlow, approval_status},
        policy::{LeaveCategory, PolicyTable},
        validator,
    },
    model::{
        employee::Employee,
        leave_request::{LeaveRequest, LeaveStatus},
        role::Role,
    },
};
use actix_web::{HttpResponse, ResponseError, http::StatusCode, web};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::{FromRow, MySqlPool};
use utoipa::{IntoParams, ToSchema};

const LEAVE_COLUMNS: &str = "lr.id, lr.employee_id, lr.leave_type, lr.start_date, lr.end_date, \
    lr.total_days, lr.reason, lr.requested_by, lr.status, lr.exceeds_entitlement, \
    lr.override_justification, lr.hr_notes, lr.created_at";

#[derive(Deserialize, ToSchema)]
pub struct CreateLeave {
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = "annual")]
    pub leave_type: LeaveCategory,
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-16", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "Family holiday")]
    pub reason: String,
    /// Must be true to submit; false only returns the verdict to confirm
    #[serde(default)]
    #[schema(example = true)]
    pub confirmed: bool,
    /// Required to submit a request that exceeds the statutory maximum (HR only)
    #[schema(example = json!(null))]
    pub override_justification: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct ApproveLeave {
    #[schema(example = "Handover agreed with station manager")]
    pub notes: Option<String>,
    /// Needed when the request exceeds the statutory maximum and was not
    /// already justified at submission
    pub override_justification: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct RejectLeave {
    #[schema(example = "Peak season, please pick other dates")]
    pub reason: String,
}

#[derive(Deserialize, ToSchema)]
pub struct CancelLeave {
    #[schema(example = "Trip postponed")]
    pub reason: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub data: Vec<LeaveRequest>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

#[derive(Deserialize, IntoParams)]
pub struct LeaveFilter {
    /// Filter by employee ID
    pub employee_id: Option<u64>,
    /// Filter by leave status
    #[param(value_type = Option<String>, example = "pending")]
    pub status: Option<LeaveStatus>,
    /// Filter by leave category
    #[param(value_type = Option<String>, example = "sick")]
    pub leave_type: Option<LeaveCategory>,
    /// Only leave starting on or after this date
    #[param(value_type = Option<String>, format = "date")]
    pub from: Option<NaiveDate>,
    /// Only leave ending on or before this date
    #[param(value_type = Option<String>, format = "date")]
    pub to: Option<NaiveDate>,
    /// Pagination page number (start with 1)
    pub page: Option<u64>,
    /// Pagination per page number
    pub per_page: Option<u64>,
}

#[derive(Debug, PartialEq, Eq)]
struct Page {
    page: u32,
    per_page: u32,
    offset: u64,
}

/// Page 1 and 10 rows by default; at most 100 rows per page.
fn paginate(page: Option<u64>, per_page: Option<u64>) -> Option<Page> {
    let per_page = u32::try_from(per_page.unwrap_or(10).clamp(1, 100)).ok()?;
    let page = u32::try_from(page.unwrap_or(1).max(1)).ok()?;
    let offset = u64::from(page - 1).checked_mul(u64::from(per_page))?;
    Some(Page {
        page,
        per_page,
        offset,
    })
}

// Helper enum for typed SQLx binding
enum FilterValue<'a> {
    U64(u64),
    Str(&'a str),
    Date(NaiveDate),
}

/// A leave request together with the location of its employee.
#[derive(FromRow)]
struct ScopedLeave {
    #[sqlx(flatten)]
    request: LeaveRequest,
    location: String,
}

async fn fetch_scoped(pool: &MySqlPool, leave_id: u64) -> actix_web::Result<Option<ScopedLeave>> {
    let sql = format!(
        "SELECT {LEAVE_COLUMNS}, e.location \
         FROM leave_requests lr JOIN employees e ON e.id = lr.employee_id \
         WHERE lr.id = ?"
    );

    sqlx::query_as::<_, ScopedLeave>(&sql)
        .bind(leave_id)
        .fetch_optional(pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, leave_id, "Failed to fetch leave request");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })
}

fn not_found() -> HttpResponse {
    HttpResponse::NotFound().json(json!({
        "message": "Leave request not found"
    }))
}

fn non_empty(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|t| !t.is_empty())
}

/// Takes an evaluated flow through confirmation or override.
///
/// Returns the submission to persist, or the status and message to answer with
/// when the caller still has to confirm, lacks override rights or gave no
/// justification.
fn settle_submission(
    mut flow: SubmissionFlow,
    confirmed: bool,
    role: Role,
    justification: Option<&str>,
) -> Result<Submission, (StatusCode, String)> {
    let Some(verdict) = flow.state().verdict() else {
        return Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            "Leave request was not evaluated".to_string(),
        ));
    };
    let requires_override = verdict.requires_override();

    if !confirmed {
        return Err(match flow.cancel() {
            Ok(_) => (
                StatusCode::CONFLICT,
                "Review the verdict and resubmit with confirmed = true".to_string(),
            ),
            Err(e) => (e.status_code(), e.to_string()),
        });
    }

    let step = if requires_override {
        flow.override_violation(role, justification.unwrap_or_default())
            .map(|_| ())
    } else {
        flow.confirm().map(|_| ())
    };
    if let Err(e) = step {
        tracing::debug!(
            error = %e,
            leave_type = %flow.draft().category,
            state = flow.state().name(),
            "Submission refused"
        );
        return Err((e.status_code(), e.to_string()));
    }

    flow.into_submission().ok_or_else(|| {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Leave request was not submitted".to_string(),
        )
    })
}

/* =========================
Submit leave request
========================= */
/// Submit a leave request through the confirmation flow
#[utoipa::path(
    post,
    path = "/api/leave",
    request_body(
        content = CreateLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Leave request submitted", body = Object, example = json!({
            "id": 42,
            "status": "pending",
            "verdict": {
                "outcome": "compliant",
                "leave_type": "annual",
                "requested_days": 12,
                "working_days": 10,
                "max_days": 21,
                "message": "Annual Leave of 12 days is within the statutory maximum of 21 days.",
                "requires_override": false,
                "certificate_required": false,
                "law_reference": "Employment Act 2007, Section 28"
            }
        })),
        (status = 400, description = "Invalid dates or missing reason"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Employee belongs to another station, or override not permitted"),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Confirmation required, or the employee already has overlapping leave"),
        (status = 422, description = "Violation needs an override justification")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    policy: web::Data<PolicyTable>,
    payload: web::Json<CreateLeave>,
) -> actix_web::Result<HttpResponse> {
    let payload = payload.into_inner();

    let Some(reason) = non_empty(Some(payload.reason.as_str())) else {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "A reason for the leave is required"
        })));
    };

    let today = Local::now().date_naive();
    if payload.start_date < today {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Leave cannot be requested for past dates"
        })));
    }

    let employee = Employee::find_active(pool.get_ref(), payload.employee_id)
        .await
        .map_err(|e| {
            tracing::error!(
                error = %e,
                employee_id = payload.employee_id,
                "Failed to fetch employee"
            );
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;
    let Some(employee) = employee else {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found"
        })));
    };
    auth.require_location(&employee.location)?;

    let mut flow = SubmissionFlow::new(LeaveDraft {
        category: payload.leave_type,
        start_date: payload.start_date,
        end_date: payload.end_date,
    });
    flow.evaluate(&policy)?;

    let Some(verdict) = flow.state().verdict() else {
        return Err(actix_web::error::ErrorInternalServerError(
            "Internal Server Error",
        ));
    };
    let verdict_body = VerdictResponse::new(verdict, payload.start_date, payload.end_date);

    let submission = match settle_submission(
        flow,
        payload.confirmed,
        auth.role,
        payload.override_justification.as_deref(),
    ) {
        Ok(submission) => submission,
        Err((status, message)) => {
            tracing::info!(
                %status,
                employee_id = employee.id,
                leave_type = %payload.leave_type,
                "Leave submission not completed"
            );
            return Ok(HttpResponse::build(status).json(json!({
                "message": message,
                "verdict": verdict_body
            })));
        }
    };

    let mut tx = pool.begin().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to start transaction");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    // serialises concurrent submissions for the same employee
    sqlx::query("SELECT id FROM employees WHERE id = ? FOR UPDATE")
        .bind(employee.id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, employee_id = employee.id, "Failed to lock employee");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let overlapping = sqlx::query_scalar::<_, u64>(
        r#"
        SELECT id
        FROM leave_requests
        WHERE employee_id = ?
        AND status IN ('pending', 'approved', 'overridden')
        AND start_date <= ?
        AND end_date >= ?
        LIMIT 1
        "#,
    )
    .bind(employee.id)
    .bind(submission.draft.end_date)
    .bind(submission.draft.start_date)
    .fetch_optional(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!(
            error = %e,
            employee_id = employee.id,
            "Failed to check overlapping leave"
        );
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if let Some(existing) = overlapping {
        return Ok(HttpResponse::Conflict().json(json!({
            "message": format!(
                "{} already has leave request {} covering these dates",
                employee.full_name(),
                existing
            )
        })));
    }

    let justification = submission
        .override_note
        .as_ref()
        .map(|note| note.justification.clone());

    let result = sqlx::query(
        r#"
        INSERT INTO leave_requests
            (employee_id, leave_type, start_date, end_date, total_days, reason,
             requested_by, status, exceeds_entitlement, override_justification)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(employee.id)
    .bind(submission.draft.category.as_ref())
    .bind(submission.draft.start_date)
    .bind(submission.draft.end_date)
    .bind(submission.verdict.requested_days())
    .bind(reason)
    .bind(auth.user_id)
    .bind(submission.status().as_ref())
    .bind(submission.exceeds_entitlement())
    .bind(&justification)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id = employee.id, "Failed to create leave request");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    tx.commit().await.map_err(|e| {
        tracing::error!(error = %e, employee_id = employee.id, "Failed to commit leave request");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let leave_id = result.last_insert_id();

    if let Some(justification) = &justification {
        tracing::warn!(
            target: "audit",
            leave_id,
            user = %auth.username,
            employee = %employee.full_name(),
            leave_type = %submission.draft.category,
            requested_days = submission.verdict.requested_days(),
            max_days = submission.verdict.max_days(),
            %justification,
            "Leave law override on submission"
        );
    }
    tracing::info!(
        target: "audit",
        leave_id,
        user = %auth.username,
        employee_id = employee.id,
        leave_type = %submission.draft.category,
        start = %submission.draft.start_date,
        end = %submission.draft.end_date,
        outcome = ?submission.verdict.outcome(),
        "Leave request created"
    );

    Ok(HttpResponse::Created().json(json!({
        "id": leave_id,
        "status": submission.status(),
        "verdict": verdict_body
    })))
}

/* =========================
Approve leave (HR/Admin)
========================= */
/// Approve a pending leave request; violations need an override justification
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/approve",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to approve")
    ),
    request_body = ApproveLeave,
    responses(
        (status = 200, description = "Leave approved", body = Object, example = json!({
            "message": "Leave approved",
            "status": "approved"
        })),
        (status = 400, description = "Leave request is not pending"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found"),
        (status = 422, description = "Violation needs an override justification")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn approve_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    policy: web::Data<PolicyTable>,
    path: web::Path<u64>,
    payload: web::Json<ApproveLeave>,
) -> actix_web::Result<HttpResponse> {
    auth.require_hr_or_admin()?;

    let leave_id = path.into_inner();
    let Some(ScopedLeave { request, .. }) = fetch_scoped(pool.get_ref(), leave_id).await? else {
        return Ok(not_found());
    };

    if request.status != LeaveStatus::Pending {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Leave request is not pending"
        })));
    }

    // limits may have changed since submission
    let verdict = validator::evaluate(
        &policy,
        request.leave_type,
        request.start_date,
        request.end_date,
    )?;
    let justification = non_empty(payload.override_justification.as_deref())
        .or(non_empty(request.override_justification.as_deref()));

    let status = match approval_status(&verdict, justification) {
        Ok(status) => status,
        Err(e) => {
            return Ok(HttpResponse::build(e.status_code()).json(json!({
                "message": e.to_string(),
                "verdict": VerdictResponse::new(&verdict, request.start_date, request.end_date)
            })));
        }
    };

    let mut notes = non_empty(payload.notes.as_deref())
        .unwrap_or_default()
        .to_string();
    let override_justification = if status == LeaveStatus::Overridden {
        justification
    } else {
        None
    };
    if let Some(text) = override_justification {
        if !notes.is_empty() {
            notes.push_str("\n\n");
        }
        notes.push_str(&format!("Compliance override: {text}"));
    }

    let result = sqlx::query(
        r#"
        UPDATE leave_requests
        SET status = ?,
            decided_by = ?,
            decided_at = NOW(),
            hr_notes = ?,
            exceeds_entitlement = ?,
            override_justification = COALESCE(?, override_justification)
        WHERE id = ?
        AND status = 'pending'
        "#,
    )
    .bind(status.as_ref())
    .bind(auth.user_id)
    .bind(non_empty(Some(notes.as_str())))
    .bind(verdict.requires_override())
    .bind(override_justification)
    .bind(leave_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, leave_id, "Approve leave failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Leave request not found or already processed"
        })));
    }

    if status == LeaveStatus::Overridden {
        tracing::warn!(
            target: "audit",
            leave_id,
            hr = %auth.username,
            leave_type = %request.leave_type,
            requested_days = verdict.requested_days(),
            max_days = verdict.max_days(),
            justification = override_justification.unwrap_or_default(),
            "Leave approved with compliance override"
        );
    } else {
        tracing::info!(target: "audit", leave_id, hr = %auth.username, "Leave approved");
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Leave approved",
        "status": status
    })))
}

/* =========================
Reject leave (HR/Admin)
========================= */
/// Reject a pending leave request with a reason
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/reject",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to reject")
    ),
    request_body = RejectLeave,
    responses(
        (status = 200, description = "Leave rejected", body = Object, example = json!({
            "message": "Leave rejected"
        })),
        (status = 400, description = "Missing reason, or leave request not found or already processed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn reject_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<RejectLeave>,
) -> actix_web::Result<HttpResponse> {
    auth.require_hr_or_admin()?;

    let leave_id = path.into_inner();
    let Some(reason) = non_empty(Some(payload.reason.as_str())) else {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Rejection reason is required"
        })));
    };

    let result = sqlx::query(
        r#"
        UPDATE leave_requests
        SET status = 'rejected',
            decided_by = ?,
            decided_at = NOW(),
            rejection_reason = ?
        WHERE id = ?
        AND status = 'pending'
        "#,
    )
    .bind(auth.user_id)
    .bind(reason)
    .bind(leave_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, leave_id, "Reject leave failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Leave request not found or already processed"
        })));
    }

    tracing::info!(target: "audit", leave_id, hr = %auth.username, %reason, "Leave rejected");

    Ok(HttpResponse::Ok().json(json!({
        "message": "Leave rejected"
    })))
}

/* =========================
Cancel leave
========================= */
/// Cancel a pending or approved leave before it starts
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/cancel",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to cancel")
    ),
    request_body = CancelLeave,
    responses(
        (status = 200, description = "Leave cancelled", body = Object, example = json!({
            "message": "Leave cancelled"
        })),
        (status = 400, description = "Leave cannot be cancelled"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Employee belongs to another station"),
        (status = 404, description = "Leave request not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn cancel_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<CancelLeave>,
) -> actix_web::Result<HttpResponse> {
    let leave_id = path.into_inner();
    let Some(ScopedLeave { request, location }) = fetch_scoped(pool.get_ref(), leave_id).await?
    else {
        return Ok(not_found());
    };
    auth.require_location(&location)?;

    if !request.status.can_cancel() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": format!("A {} leave request cannot be cancelled", request.status)
        })));
    }
    if request.start_date <= Local::now().date_naive() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Cannot cancel leave that has already started"
        })));
    }

    let note = format!(
        "Cancelled by {}: {}",
        auth.username,
        non_empty(payload.reason.as_deref()).unwrap_or("no reason given")
    );

    let result = sqlx::query(
        r#"
        UPDATE leave_requests
        SET status = 'cancelled',
            hr_notes = CONCAT_WS('\n\n', hr_notes, ?)
        WHERE id = ?
        AND status IN ('pending', 'approved', 'overridden')
        "#,
    )
    .bind(&note)
    .bind(leave_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, leave_id, "Cancel leave failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Leave request not found or already processed"
        })));
    }

    tracing::info!(
        target: "audit",
        leave_id,
        user = %auth.username,
        previous_status = %request.status,
        "Leave cancelled"
    );

    Ok(HttpResponse::Ok().json(json!({
        "message": "Leave cancelled"
    })))
}

/// Get one leave request
#[utoipa::path(
    get,
    path = "/api/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveRequest),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Employee belongs to another station"),
        (status = 404, description = "Leave request not found", body = Object, example = json!({
            "message": "Leave request not found"
        }))
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<HttpResponse> {
    let leave_id = path.into_inner();

    match fetch_scoped(pool.get_ref(), leave_id).await? {
        Some(scoped) => {
            auth.require_location(&scoped.location)?;
            Ok(HttpResponse::Ok().json(scoped.request))
        }
        None => Ok(not_found()),
    }
}

/// List leave requests, newest first
#[utoipa::path(
    get,
    path = "/api/leave",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Paginated leave list", body = LeaveListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<LeaveFilter>,
) -> actix_web::Result<HttpResponse> {
    // -------------------------
    // Pagination
    // -------------------------
    let Some(Page {
        page,
        per_page,
        offset,
    }) = paginate(query.page, query.per_page)
    else {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Page number is out of range"
        })));
    };

    // -------------------------
    // WHERE clause
    // -------------------------
    let mut where_sql = String::from(" WHERE e.is_active = TRUE");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(location) = auth.location_scope() {
        where_sql.push_str(" AND e.location = ?");
        args.push(FilterValue::Str(location));
    }

    if let Some(emp_id) = query.employee_id {
        where_sql.push_str(" AND lr.employee_id = ?");
        args.push(FilterValue::U64(emp_id));
    }

    if let Some(status) = &query.status {
        where_sql.push_str(" AND lr.status = ?");
        args.push(FilterValue::Str(status.as_ref()));
    }

    if let Some(leave_type) = &query.leave_type {
        where_sql.push_str(" AND lr.leave_type = ?");
        args.push(FilterValue::Str(leave_type.as_ref()));
    }

    if let Some(from) = query.from {
        where_sql.push_str(" AND lr.start_date >= ?");
        args.push(FilterValue::Date(from));
    }

    if let Some(to) = query.to {
        where_sql.push_str(" AND lr.end_date <= ?");
        args.push(FilterValue::Date(to));
    }

    let from_sql = " FROM leave_requests lr JOIN employees e ON e.id = lr.employee_id";

    // -------------------------
    // COUNT query
    // -------------------------
    let count_sql = format!("SELECT COUNT(*){from_sql}{where_sql}");

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Str(s) => count_q.bind(*s),
            FilterValue::Date(d) => count_q.bind(*d),
        };
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to count leave requests");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    // -------------------------
    // DATA query
    // -------------------------
    let data_sql = format!(
        "SELECT {LEAVE_COLUMNS}{from_sql}{where_sql} ORDER BY lr.created_at DESC LIMIT ? OFFSET ?"
    );

    let mut data_q = sqlx::query_as::<_, LeaveRequest>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Str(s) => data_q.bind(s),
            FilterValue::Date(d) => data_q.bind(d),
        };
    }

    let leaves = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch leave list");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(LeaveListResponse {
        data: leaves,
        page,
        per_page,
        total,
    }))
}
