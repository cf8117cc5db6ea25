//! RFC 7807 problem responses.

use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use classroom_id::IdError;
use classroom_reconcile::ScheduleError;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub r#type: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

#[derive(Debug, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl ProblemDetails {
    fn new(status: StatusCode, code: impl Into<String>, detail: impl Into<String>) -> Self {
        let code = code.into();
        let title = status
            .canonical_reason()
            .unwrap_or("Unknown Error")
            .to_string();
        Self {
            r#type: format!("https://classroom.dev/problems/{code}"),
            title,
            status: status.as_u16(),
            detail: detail.into(),
            code,
            details: None,
        }
    }
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub problem: Box<ProblemDetails>,
}

impl ApiError {
    fn with_status(
        status: StatusCode,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let problem = Box::new(ProblemDetails::new(status, code, message));
        Self { status, problem }
    }

    pub fn bad_request(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::BAD_REQUEST, code, message)
    }

    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::NOT_FOUND, code, message)
    }

    pub fn conflict(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_status(StatusCode::CONFLICT, code, message)
    }

    /// Rejects a malformed path or body identifier named `field`.
    pub fn invalid_id(field: &str, err: IdError) -> Self {
        let api_err = Self::bad_request(
            format!("invalid_{field}"),
            format!("Invalid {field}: {err}"),
        );
        if err.is_prefix_error() {
            api_err.with_details(vec![FieldError {
                field: field.to_string(),
                message: "ID belongs to a different resource type".to_string(),
            }])
        } else {
            api_err
        }
    }

    pub fn with_details(mut self, details: Vec<FieldError>) -> Self {
        self.problem.details = Some(details);
        self
    }
}

impl From<ScheduleError> for ApiError {
    fn from(err: ScheduleError) -> Self {
        let message = err.to_string();
        match err {
            ScheduleError::RoomNotFound(_) => Self::not_found("room_not_found", message),
            ScheduleError::SessionNotFound(_) => Self::not_found("session_not_found", message),
            ScheduleError::RoomInUse(_) => Self::conflict("room_in_use", message),
            ScheduleError::RoomOccupied { .. } => Self::conflict("room_occupied", message),
            ScheduleError::RoomUnavailable(_) => Self::conflict("room_unavailable", message),
            ScheduleError::SessionExpired(_) => Self::conflict("session_expired", message),
            ScheduleError::DuplicateId(_) => Self::conflict("duplicate_id", message),
            ScheduleError::InvalidRoomUrl { reason, .. } => {
                Self::bad_request("invalid_room_url", message).with_details(vec![FieldError {
                    field: "url".to_string(),
                    message: reason,
                }])
            }
            ScheduleError::EmptyName(field) => {
                Self::bad_request("invalid_name", message).with_details(vec![FieldError {
                    field: "name".to_string(),
                    message: format!("{field} is required"),
                }])
            }
            ScheduleError::InvalidWindow => Self::bad_request("invalid_window", message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.problem)).into_response();
        response.headers_mut().insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/problem+json"),
        );
        response
    }
}
