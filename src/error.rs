use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

use crate::repository::RepositoryError;
use crate::roster::RosterError;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Forbidden(String),
    Conflict(String),
    Unprocessable(String),
    PreconditionRequired(String),
    BadGateway(String),
    ServiceUnavailable(String),
    Internal(String),
}

impl ApiError {
    /// Status follows the error kind; the body is the message the user sees.
    pub fn from_repository(err: &RepositoryError, message: impl Into<String>) -> Self {
        let message = message.into();
        match err {
            RepositoryError::PermissionDenied(_) => ApiError::Forbidden(message),
            RepositoryError::Unavailable(_) => ApiError::ServiceUnavailable(message),
            RepositoryError::Unknown(_) => ApiError::BadGateway(message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg).into_response(),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg).into_response(),
            ApiError::Unprocessable(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, msg).into_response()
            }
            ApiError::PreconditionRequired(msg) => {
                (StatusCode::PRECONDITION_REQUIRED, msg).into_response()
            }
            ApiError::BadGateway(msg) => (StatusCode::BAD_GATEWAY, msg).into_response(),
            ApiError::ServiceUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, msg).into_response()
            }
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg).into_response(),
        }
    }
}

impl From<RosterError> for ApiError {
    fn from(value: RosterError) -> Self {
        match value {
            RosterError::Validation(err) => ApiError::Unprocessable(err.user_message().into()),
            RosterError::Repository { message, source } => {
                ApiError::from_repository(&source, message)
            }
            RosterError::RowOutOfRange { .. } => ApiError::BadRequest(value.to_string()),
            RosterError::SubmitInProgress => ApiError::Conflict(value.to_string()),
            RosterError::NotSubmitting => {
                error!("submission finished without being started");
                ApiError::Internal(value.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ValidationError;

    #[test]
    fn test_repository_errors_map_to_status() {
        let cases = [
            (
                RepositoryError::PermissionDenied("x".into()),
                StatusCode::FORBIDDEN,
            ),
            (
                RepositoryError::Unavailable("x".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (RepositoryError::Unknown("x".into()), StatusCode::BAD_GATEWAY),
        ];
        for (err, status) in cases {
            let response = ApiError::from_repository(&err, "failed").into_response();
            assert_eq!(response.status(), status);
        }
    }

    #[test]
    fn test_validation_is_unprocessable() {
        let err = RosterError::Validation(ValidationError::EmptyClassName);
        let response = ApiError::from(err).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
