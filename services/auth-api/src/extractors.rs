//! Axum extractors for authenticated sessions

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use warden_types::AccountId;

use crate::state::AppState;

/// Caller identified by a previously issued session token.
///
/// Only tokens recorded in this process's [`MemorySessionStore`] resolve. The
/// copy persisted on the account is not consulted, so a restart ends every
/// session and clients log in again.
///
/// [`MemorySessionStore`]: warden_auth_core::MemorySessionStore
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub account_id: AccountId,
    pub username: String,
    pub issued_at: DateTime<Utc>,
    /// Presented token, needed to end the session
    pub token: String,
}

/// Error response for session failures
#[derive(Debug, Serialize)]
struct SessionErrorResponse {
    error: SessionErrorDetail,
}

#[derive(Debug, Serialize)]
struct SessionErrorDetail {
    code: &'static str,
    message: &'static str,
}

/// Session rejection type
#[derive(Debug)]
pub struct SessionRejection {
    status: StatusCode,
    code: &'static str,
    message: &'static str,
}

impl IntoResponse for SessionRejection {
    fn into_response(self) -> Response {
        let body = SessionErrorResponse {
            error: SessionErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl<S> FromRequestParts<S> for SessionUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = SessionRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let token = extract_bearer_token(parts)?;

        let entry = app_state.sessions.find(&token).ok_or_else(|| {
            tracing::debug!("Presented session token is not recognised");
            SessionRejection {
                status: StatusCode::UNAUTHORIZED,
                code: "INVALID_SESSION",
                message: "Invalid or expired session",
            }
        })?;

        Ok(Self {
            account_id: entry.account_id,
            username: entry.username,
            issued_at: entry.issued_at,
            token,
        })
    }
}

/// Extract a bearer token from the Authorization header
fn extract_bearer_token(parts: &Parts) -> Result<String, SessionRejection> {
    let missing = SessionRejection {
        status: StatusCode::UNAUTHORIZED,
        code: "MISSING_TOKEN",
        message: "No session token provided",
    };

    let Some(value) = parts.headers.get(header::AUTHORIZATION) else {
        return Err(missing);
    };
    let value = value.to_str().map_err(|_| SessionRejection {
        status: StatusCode::BAD_REQUEST,
        code: "INVALID_HEADER",
        message: "Invalid Authorization header encoding",
    })?;

    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))
        .map(str::trim)
        .unwrap_or_default();

    if token.is_empty() {
        Err(missing)
    } else {
        Ok(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(auth: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/");
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token(&parts(Some("Bearer abc"))).unwrap(), "abc");
        assert_eq!(extract_bearer_token(&parts(Some("bearer  abc "))).unwrap(), "abc");
    }

    #[test]
    fn test_missing_or_empty_token() {
        assert_eq!(extract_bearer_token(&parts(None)).unwrap_err().code, "MISSING_TOKEN");
        assert_eq!(
            extract_bearer_token(&parts(Some("Bearer "))).unwrap_err().code,
            "MISSING_TOKEN"
        );
        assert_eq!(
            extract_bearer_token(&parts(Some("Basic dXNlcjpwdw=="))).unwrap_err().code,
            "MISSING_TOKEN"
        );
    }
}
