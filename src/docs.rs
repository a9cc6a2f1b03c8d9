use crate::api::compliance::{BalanceResponse, ValidateLeave, VerdictResponse};
use crate::api::leave_request::{
    ApproveLeave, CancelLeave, CreateLeave, LeaveListResponse, RejectLeave,
};
use crate::auth::handlers::LoginResponse;
use crate::compliance::balance::LeaveBalance;
use crate::compliance::policy::{LeaveCategory, LeavePolicy};
use crate::compliance::report::{ComplianceFinding, ComplianceReport};
use crate::compliance::validator::Outcome;
use crate::model::leave_request::{LeaveRequest, LeaveStatus};
use crate::models::{CreateUserReq, LoginReqDto};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Leave Compliance API",
        version = "1.0.0",
        description = r#"
## Statutory Leave Compliance

Leave requests are checked against the maximums of the **Employment Act 2007**
before they are submitted.

### 🔹 Workflow
- **Validate** a date range to get a compliant, warning or violation verdict
- **Confirm** the verdict to submit the request as pending
- **Override** a violation (HR/Admin only) with a written justification
- **Approve, reject or cancel** requests, with every override kept for audit

### 🔐 Security
Endpoints are protected using **JWT Bearer authentication**.
Station managers only see employees of their own station.
"#,
    ),
    paths(
        crate::auth::handlers::login,
        crate::auth::handlers::create_user,

        crate::api::compliance::list_policies,
        crate::api::compliance::validate_leave,
        crate::api::compliance::employee_balance,
        crate::api::compliance::compliance_summary,

        crate::api::leave_request::leave_list,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::create_leave,
        crate::api::leave_request::approve_leave,
        crate::api::leave_request::reject_leave,
        crate::api::leave_request::cancel_leave
    ),
    components(
        schemas(
            LoginReqDto,
            LoginResponse,
            CreateUserReq,
            LeaveCategory,
            LeavePolicy,
            LeaveStatus,
            LeaveRequest,
            Outcome,
            VerdictResponse,
            ValidateLeave,
            CreateLeave,
            ApproveLeave,
            RejectLeave,
            CancelLeave,
            LeaveListResponse,
            LeaveBalance,
            BalanceResponse,
            ComplianceFinding,
            ComplianceReport
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Login and user accounts"),
        (name = "Leave", description = "Leave request APIs"),
        (name = "Compliance", description = "Statutory limits, balances and compliance reporting"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
