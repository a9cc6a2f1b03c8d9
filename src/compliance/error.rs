use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use chrono::NaiveDate;
use derive_more::Display;
use serde_json::json;

#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum ComplianceError {
    #[display(fmt = "end date {} cannot be before start date {}", end, start)]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[display(fmt = "unknown leave category '{}'", _0)]
    UnknownCategory(String),

    #[display(fmt = "unknown leave status '{}'", _0)]
    UnknownStatus(String),

    #[display(fmt = "invalid leave policy for '{}': {}", category, reason)]
    InvalidPolicy { category: String, reason: String },

    #[display(fmt = "overriding a policy violation requires a written justification")]
    JustificationRequired,

    #[display(fmt = "only HR managers can override a policy violation")]
    OverrideNotPermitted,

    #[display(fmt = "cannot {} while the request is {}", action, state)]
    InvalidTransition {
        state: &'static str,
        action: &'static str,
    },
}

impl std::error::Error for ComplianceError {}

impl ResponseError for ComplianceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ComplianceError::InvalidDateRange { .. } | ComplianceError::UnknownCategory(_) => {
                StatusCode::BAD_REQUEST
            }
            ComplianceError::JustificationRequired => StatusCode::UNPROCESSABLE_ENTITY,
            ComplianceError::OverrideNotPermitted => StatusCode::FORBIDDEN,
            ComplianceError::InvalidTransition { .. } => StatusCode::CONFLICT,
            ComplianceError::InvalidPolicy { .. } | ComplianceError::UnknownStatus(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "message": self.to_string()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_range_message_names_both_dates() {
        let err = ComplianceError::InvalidDateRange {
            start: NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            end: NaiveDate::from_ymd_opt(2025, 1, 9).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "end date 2025-01-09 cannot be before start date 2025-01-10"
        );
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn override_errors_map_to_client_statuses() {
        assert_eq!(
            ComplianceError::JustificationRequired.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ComplianceError::OverrideNotPermitted.status_code(),
            StatusCode::FORBIDDEN
        );
    }
}
