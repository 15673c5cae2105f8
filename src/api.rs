//! The JSON response envelope shared by every collection endpoint.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::Error;

/// The uniform response envelope: `{"success": true, "data": ...}` on success,
/// `{"success": false, "error": "..."}` on failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Whether the operation succeeded.
    pub success: bool,
    /// The payload, present on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// A human readable failure description, present on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// An envelope carrying `data`.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// A successful envelope with no payload, used by delete endpoints.
    pub fn ok_empty() -> Self {
        Self {
            success: true,
            data: None,
            error: None,
        }
    }

    /// A failed envelope carrying an error description.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Render a success envelope with the given status code.
pub(crate) fn ok_response<T: Serialize>(status: StatusCode, data: T) -> Response {
    (status, Json(ApiResponse::ok(data))).into_response()
}

/// Render the payload-free success envelope `{"success": true}` used by
/// delete endpoints.
pub(crate) fn ok_empty_response() -> Response {
    (StatusCode::OK, Json(ApiResponse::<()>::ok_empty())).into_response()
}

/// Render `error` as a failure envelope.
///
/// `context` names the operation for the client-facing message, e.g.
/// "delete transaction". [Error::NotFound] maps to 404, invalid input to 400,
/// anything else is logged and reported as a 500.
pub(crate) fn error_response(error: Error, context: &str) -> Response {
    let (status, message) = match error {
        Error::NotFound => (
            StatusCode::NOT_FOUND,
            format!("Failed to {context}: not found"),
        ),
        Error::NegativeAmount(amount) => (
            StatusCode::BAD_REQUEST,
            format!("Failed to {context}: amount {amount} must not be negative"),
        ),
        Error::EmptyBudget => (
            StatusCode::BAD_REQUEST,
            format!("Failed to {context}: a budget needs at least one line item"),
        ),
        error => {
            tracing::error!("could not {context}: {error}");
            (StatusCode::INTERNAL_SERVER_ERROR, format!("Failed to {context}"))
        }
    };

    (status, Json(ApiResponse::<()>::error(message))).into_response()
}

/// The body of a DELETE request: `{"id": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteBody {
    /// The id of the record to remove.
    pub id: crate::RecordId,
}

#[cfg(test)]
mod envelope_tests {
    use super::ApiResponse;

    #[test]
    fn success_envelope_omits_error_field() {
        let envelope = ApiResponse::ok(1);

        let json = serde_json::to_string(&envelope).unwrap();

        assert_eq!(json, r#"{"success":true,"data":1}"#);
    }

    #[test]
    fn failure_envelope_omits_data_field() {
        let envelope = ApiResponse::<()>::error("Failed to fetch transactions");

        let json = serde_json::to_string(&envelope).unwrap();

        assert_eq!(
            json,
            r#"{"success":false,"error":"Failed to fetch transactions"}"#
        );
    }

    #[test]
    fn empty_success_envelope_round_trips() {
        let json = r#"{"success":true}"#;

        let envelope: ApiResponse<()> = serde_json::from_str(json).unwrap();

        assert!(envelope.success);
        assert_eq!(envelope.data, None);
        assert_eq!(envelope.error, None);
    }
}
