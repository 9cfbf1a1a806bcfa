use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap},
    response::IntoResponse,
    Extension, Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::auth::{cookie_value, ADMIN_COOKIE};
use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct LoginBody {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

#[derive(Debug, Serialize)]
pub(super) struct LoginData {
    success: bool,
    message: &'static str,
    token: String,
}

#[derive(Debug, Serialize)]
pub(super) struct LogoutData {
    success: bool,
    message: &'static str,
}

#[derive(Debug, Serialize)]
pub(super) struct SessionData {
    authenticated: bool,
}

/// POST /api/admin/login: issues a session token and sets it as a cookie.
pub(super) async fn login(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<LoginBody>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.auth.check_credentials(&body.username, &body.password) {
        tracing::warn!("admin login rejected");
        return Err(ApiError::new(
            req_id.0,
            "unauthorized",
            "Invalid username or password",
        ));
    }

    let token = state.auth.issue_token(Utc::now()).map_err(|e| {
        tracing::error!(error = %e, "failed to sign admin token");
        ApiError::new(req_id.0.clone(), "internal_error", "Failed to create session")
    })?;
    let cookie = state.auth.session_cookie(&token);
    tracing::info!("admin logged in");

    Ok((
        [(SET_COOKIE, cookie)],
        ApiResponse::json(
            req_id.0,
            LoginData {
                success: true,
                message: "Login successful",
                token,
            },
        ),
    ))
}

pub(super) async fn logout(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    (
        [(SET_COOKIE, state.auth.cleared_cookie())],
        ApiResponse::json(
            req_id.0,
            LogoutData {
                success: true,
                message: "Logged out successfully",
            },
        ),
    )
}

/// GET /api/admin/check: whether the `admin_token` cookie holds a valid
/// session. Never fails.
pub(super) async fn check(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    headers: HeaderMap,
) -> Json<ApiResponse<SessionData>> {
    let authenticated = cookie_value(&headers, ADMIN_COOKIE)
        .is_some_and(|token| state.auth.verify(token).is_some());
    ApiResponse::json(req_id.0, SessionData { authenticated })
}
