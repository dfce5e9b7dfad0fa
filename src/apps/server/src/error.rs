use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use hsltalks_core::HslTalksError;
use tracing::{debug, error};

/// Maps core errors onto HTTP responses. Script completion is an expected
/// terminal state, not a server fault.
#[derive(Debug)]
pub struct ApiError(pub HslTalksError);

impl From<HslTalksError> for ApiError {
    fn from(error: HslTalksError) -> Self {
        ApiError(error)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            HslTalksError::ScriptComplete => StatusCode::GONE,
            HslTalksError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: status={}, error={}", status, self.0);
        } else {
            debug!("Request rejected: status={}, error={}", status, self.0);
        }
        (status, self.0.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_complete_is_gone() {
        let response = ApiError::from(HslTalksError::ScriptComplete).into_response();
        assert_eq!(response.status(), StatusCode::GONE);
    }

    #[test]
    fn other_errors_are_server_errors() {
        let err = ApiError::from(HslTalksError::EmptyScript);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let err = ApiError::from(HslTalksError::SessionNotFound("x".to_string()));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
