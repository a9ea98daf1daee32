use crate::error::FilStreamError;
use crate::transport::http::types::ApiResponse;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Status code for a service error. Bad input is the caller's fault, an unfunded
/// signer is a payment problem, everything else is an upstream failure.
pub fn status_for(err: &FilStreamError) -> StatusCode {
    match err {
        FilStreamError::InvalidCid(_)
        | FilStreamError::InvalidAddress(_)
        | FilStreamError::InvalidAmount(_)
        | FilStreamError::FileSize { .. } => StatusCode::BAD_REQUEST,
        FilStreamError::InsufficientBalance { .. } => StatusCode::PAYMENT_REQUIRED,
        FilStreamError::UploadFailed { source, .. } => status_for(source),
        FilStreamError::Provider { .. }
        | FilStreamError::HttpStatus(_)
        | FilStreamError::MissingEvent { .. } => StatusCode::BAD_GATEWAY,
    }
}

pub fn ok<T: Serialize>(data: T) -> Response {
    match serde_json::to_value(data) {
        Ok(value) => (
            StatusCode::OK,
            Json(ApiResponse {
                success: true,
                data: Some(value),
                error: None,
            }),
        )
            .into_response(),
        Err(e) => error_message(StatusCode::INTERNAL_SERVER_ERROR, format!("Failed to encode response: {}", e)),
    }
}

pub fn error_message(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ApiResponse {
            success: false,
            data: None,
            error: Some(message.into()),
        }),
    )
        .into_response()
}

/// Upload failures carry the failing and committed steps in `data`.
pub fn error_response(err: FilStreamError) -> Response {
    let status = status_for(&err);
    let data = match &err {
        FilStreamError::UploadFailed { step, completed, .. } => Some(serde_json::json!({
            "failedStep": step,
            "completedSteps": completed,
        })),
        _ => None,
    };
    (
        status,
        Json(ApiResponse {
            success: false,
            data,
            error: Some(err.to_string()),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UploadStep;

    #[test]
    fn upload_failures_take_the_status_of_their_cause() {
        let err = FilStreamError::UploadFailed {
            step: UploadStep::CheckBalance,
            completed: vec![UploadStep::StoreContent, UploadStep::GenerateCdnUrl],
            source: Box::new(FilStreamError::InsufficientBalance { required: "20".into() }),
        };
        assert_eq!(status_for(&err), StatusCode::PAYMENT_REQUIRED);
        assert_eq!(
            status_for(&FilStreamError::FileSize {
                context: "Video upload failed",
                size: 1,
                min: 1024,
                max: 2048
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&FilStreamError::provider("Failed to get video", "revert")),
            StatusCode::BAD_GATEWAY
        );
    }
}
