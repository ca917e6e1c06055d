//! Error types for the Auth API service.
//!
//! Unknown identifiers and wrong passwords produce the same
//! [`ApiError::InvalidLogin`] response. Nothing in status, code, message or
//! body shape tells them apart.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use warden_auth_core::AuthError;
use warden_types::{AuthResult, AuthenticatedIdentity};

/// API error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

/// API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid login or password")]
    InvalidLogin,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Service unavailable")]
    Unavailable(#[source] AuthError),

    #[error("Internal server error")]
    Auth(#[source] AuthError),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidLogin => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Auth(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidLogin => "INVALID_LOGIN",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Unavailable(_) => "SERVICE_UNAVAILABLE",
            Self::Auth(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        if err.status_code() == 503 {
            Self::Unavailable(err)
        } else {
            Self::Auth(err)
        }
    }
}

/// Turn an authentication result into the identity or the public rejection.
///
/// Both rejection codes collapse into [`ApiError::InvalidLogin`].
pub fn require_authenticated(result: AuthResult) -> ApiResult<AuthenticatedIdentity> {
    let code = result.error_code();
    result.into_identity().ok_or_else(|| {
        tracing::debug!(%code, "Login rejected");
        ApiError::InvalidLogin
    })
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        // Log internal errors
        match &self {
            Self::Auth(err) | Self::Unavailable(err) => {
                tracing::error!(error = %err, code = err.error_code(), "Authentication fault");
            }
            _ => {}
        }

        let body = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use warden_db::DbError;
    use warden_types::{AccountId, ErrorCode, ValidationErrors};

    async fn render(err: ApiError) -> (StatusCode, Vec<u8>) {
        let response = err.into_response();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    #[tokio::test]
    async fn test_rejections_are_indistinguishable() {
        let unknown =
            require_authenticated(AuthResult::rejected(ErrorCode::IdentifierInvalid).unwrap())
                .unwrap_err();
        let wrong =
            require_authenticated(AuthResult::rejected(ErrorCode::CredentialInvalid).unwrap())
                .unwrap_err();

        let (unknown_status, unknown_body) = render(unknown).await;
        let (wrong_status, wrong_body) = render(wrong).await;

        assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
        assert_eq!(unknown_status, wrong_status);
        assert_eq!(unknown_body, wrong_body);
    }

    #[tokio::test]
    async fn test_persistence_failure_is_not_a_rejection() {
        let err = ApiError::from(AuthError::PersistenceFailed {
            account_id: AccountId::new(),
            source: DbError::Validation(ValidationErrors::new().with("session_token", "bad")),
        });

        let (status, body) = render(err).await;
        let body = String::from_utf8(body).unwrap();

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("INTERNAL_ERROR"));
        assert!(!body.contains("INVALID_LOGIN"));
        // Field details stay in the logs
        assert!(!body.contains("session_token"));
    }

    #[tokio::test]
    async fn test_lookup_fault_is_unavailable() {
        let (status, _) = render(ApiError::from(AuthError::Lookup(DbError::NotFound))).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
