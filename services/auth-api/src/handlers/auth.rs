//! Authentication handlers (login, session, logout)

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use warden_auth_core::{SecretString, SessionSink};

use crate::error::{require_authenticated, ApiError, ApiResult};
use crate::extractors::SessionUser;
use crate::state::AppState;

/// Upper bound on identifier length accepted from clients
const MAX_IDENTIFIER_LEN: usize = 254;

/// Upper bound on password length accepted from clients
const MAX_PASSWORD_LEN: usize = 1024;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    /// Username or email address
    pub identifier: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("identifier", &self.identifier)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl LoginRequest {
    fn validate(&self) -> ApiResult<()> {
        if self.identifier.trim().is_empty() {
            return Err(ApiError::BadRequest("identifier is required".to_string()));
        }
        if self.identifier.len() > MAX_IDENTIFIER_LEN {
            return Err(ApiError::BadRequest("identifier is too long".to_string()));
        }
        if self.password.len() > MAX_PASSWORD_LEN {
            return Err(ApiError::BadRequest("password is too long".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
    pub user: UserInfo,
}

#[derive(Debug, Serialize)]
pub struct UserInfo {
    pub id: String,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: UserInfo,
    pub issued_at: String,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/auth/login
///
/// Check credentials and hand out a session token
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<(StatusCode, Json<LoginResponse>)> {
    req.validate()?;

    let LoginRequest {
        identifier,
        password,
    } = req;
    let result = state
        .auth
        .authenticate(&identifier, SecretString::from(password))
        .await?;
    let identity = require_authenticated(result)?;

    state.sessions.record(&identity).await?;

    tracing::info!(account_id = %identity.account_id, "Login succeeded");

    Ok((
        StatusCode::OK,
        Json(LoginResponse {
            token: identity.token.into_inner(),
            token_type: "Bearer",
            user: UserInfo {
                id: identity.account_id.to_string(),
                username: identity.username,
            },
        }),
    ))
}

/// GET /api/v1/auth/session
///
/// Describe the session behind the presented bearer token
pub async fn session(user: SessionUser) -> Json<SessionResponse> {
    Json(SessionResponse {
        user: UserInfo {
            id: user.account_id.to_string(),
            username: user.username,
        },
        issued_at: user.issued_at.to_rfc3339(),
    })
}

/// POST /api/v1/auth/logout
///
/// Forget the presented session token
pub async fn logout(State(state): State<AppState>, user: SessionUser) -> Json<LogoutResponse> {
    let removed = state.sessions.remove(&user.token);
    tracing::info!(account_id = %user.account_id, "Logout");
    Json(LogoutResponse { success: removed })
}
