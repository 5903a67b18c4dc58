use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use ticketbot_intake::{intake::retry_after_secs, IntakeError};

/// Errors returned from the http handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Intake(#[from] IntakeError),
    #[error("Malformed request body: {0}")]
    MalformedBody(#[from] JsonRejection),
    #[error("{0}")]
    BadRequest(&'static str),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Intake(IntakeError::InvalidRequest(_) | IntakeError::NotAMember) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Intake(IntakeError::RateLimited { .. }) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Intake(IntakeError::ProvisioningFailed(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::MalformedBody(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> serde_json::Value {
        match self {
            ApiError::Intake(err @ IntakeError::RateLimited { retry_after }) => {
                json!({ "error": err.to_string(), "retryAfter": retry_after_secs(retry_after) })
            }
            // details of server side failures end up in the logs, not in the response
            ApiError::Intake(IntakeError::ProvisioningFailed(_)) => {
                json!({ "error": "Failed to create the ticket" })
            }
            other => json!({ "error": other.to_string() }),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = self.body();
        if status.is_server_error() {
            let err = anyhow::Error::new(self);
            tracing::error!(
                error.message = %err,
                error.root_cause = %err.root_cause(),
                http.status = %status,
                "Request failed: {err:?}"
            );
        } else {
            tracing::info!(error.message = %self, http.status = %status, "Rejected request");
        }
        (status, Json(body)).into_response()
    }
}
