use axum::http::StatusCode;
use axum::Json;

use crate::state::ErrorResponse;

pub fn json_error(
    status: StatusCode,
    message: impl Into<String>,
) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
            details: None,
        }),
    )
}

pub fn json_error_with_details(
    status: StatusCode,
    message: impl Into<String>,
    details: impl Into<String>,
) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
            details: Some(details.into()),
        }),
    )
}
