use crate::app_error::{AppError, ErrorCode};
use crate::application::use_cases::thumbnail::GenerationError;
use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the error before it gets converted into a status response.
        tracing::error!(error = ?self, "Request failed");

        match self {
            AppError::Database(_) => {
                error_resp(StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::DatabaseError, None)
            }
            AppError::Conflict => error_resp(StatusCode::CONFLICT, ErrorCode::Conflict, None),
            AppError::Unauthenticated => error_resp(
                StatusCode::UNAUTHORIZED,
                ErrorCode::Unauthenticated,
                Some("unauthenticated".into()),
            ),
            AppError::InvalidSignature => {
                error_resp(StatusCode::UNAUTHORIZED, ErrorCode::InvalidSignature, None)
            }
            AppError::InvalidInput(msg) => {
                error_resp(StatusCode::BAD_REQUEST, ErrorCode::InvalidInput, Some(msg))
            }
            AppError::NotFound => error_resp(StatusCode::NOT_FOUND, ErrorCode::NotFound, None),
            AppError::Provider(_) => {
                error_resp(StatusCode::BAD_GATEWAY, ErrorCode::ProviderError, None)
            }
            AppError::Internal(_) => {
                error_resp(StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::InternalError, None)
            }
        }
    }
}

impl IntoResponse for GenerationError {
    fn into_response(self) -> Response {
        let status = match &self {
            GenerationError::EmptyPrompt
            | GenerationError::UnsafePrompt
            | GenerationError::SafetyRejected(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = ?self, "Thumbnail generation failed");
        } else {
            tracing::warn!(error = ?self, "Thumbnail generation rejected");
        }

        let body = serde_json::json!({
            "code": self.code().as_str(),
            "message": self.to_string(),
            "isSafetyError": self.is_safety(),
            "isQuotaError": self.is_quota(),
        });
        (status, Json(body)).into_response()
    }
}

fn error_resp(status: StatusCode, code: ErrorCode, message: Option<String>) -> Response {
    let body = match message {
        Some(msg) => serde_json::json!({ "code": code.as_str(), "message": msg }),
        None => serde_json::json!({ "code": code.as_str() }),
    };
    (status, Json(body)).into_response()
}
