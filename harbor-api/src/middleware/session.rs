/// Session gate middleware
///
/// Runs on every protected route (public routes are simply not layered with
/// it). Validates the bearer access token, re-reads the user row, and
/// applies the gate decision:
///
/// - no/invalid session → 401 with `redirect_to: "/signin"`
/// - session with unconfirmed email → 403 with `redirect_to: "/verify-email"`
///   and the pending email echoed back for the resend screen
/// - confirmed session → [`AuthContext`] is inserted into request
///   extensions and the request proceeds
///
/// Because the user row is re-read per request, confirming the email in
/// another tab takes effect on the next request without re-login.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use harbor_shared::{
    auth::{
        context::AuthContext,
        gate::{self, GateDecision, SessionState},
        jwt,
    },
    models::user::User,
};
use serde::Serialize;

use crate::app::AppState;

/// Body returned when the gate refuses a request
#[derive(Debug, Serialize)]
pub struct GateRefusal {
    /// Error code ("unauthorized" or "email_unconfirmed")
    pub error: &'static str,

    /// Human-readable message
    pub message: String,

    /// Client-side route to navigate to
    pub redirect_to: &'static str,

    /// Email awaiting confirmation (only on the verify-email refusal)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl GateRefusal {
    fn sign_in(message: impl Into<String>) -> Response {
        let body = Json(GateRefusal {
            error: "unauthorized",
            message: message.into(),
            redirect_to: "/signin",
            email: None,
        });
        (StatusCode::UNAUTHORIZED, body).into_response()
    }

    fn verify_email(email: String) -> Response {
        let body = Json(GateRefusal {
            error: "email_unconfirmed",
            message: "Confirm your email address to continue".to_string(),
            redirect_to: "/verify-email",
            email: Some(email),
        });
        (StatusCode::FORBIDDEN, body).into_response()
    }
}

/// Session gate middleware layer
///
/// Applied with `axum::middleware::from_fn_with_state`.
pub async fn session_gate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    // Extract bearer token; absence is an anonymous session.
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    let Some(token) = token else {
        return GateRefusal::sign_in("Missing credentials");
    };

    let claims = match jwt::validate_access_token(token, state.jwt_secret()) {
        Ok(claims) => claims,
        Err(e) => return GateRefusal::sign_in(format!("Invalid session: {}", e)),
    };

    // Re-read the user row so confirmation state is always current.
    let user = match User::find_by_id(state.db(), claims.sub).await {
        Ok(user) => user,
        Err(e) => {
            tracing::error!(error = %e, "Session lookup failed");
            return crate::error::ApiError::InternalError(format!("Session lookup failed: {}", e))
                .into_response();
        }
    };

    let Some(user) = user else {
        // Token validated but the account is gone (e.g. deleted by an admin).
        return GateRefusal::sign_in("Session no longer valid");
    };

    let session_state = if user.email_verified {
        SessionState::Verified
    } else {
        SessionState::Unverified
    };

    match gate::decide(session_state) {
        GateDecision::SignIn => GateRefusal::sign_in("Session no longer valid"),
        GateDecision::VerifyEmail => GateRefusal::verify_email(user.email),
        GateDecision::Allow => {
            let context = AuthContext::new(user.id, user.email, user.email_verified);
            req.extensions_mut().insert(context);
            next.run(req).await
        }
    }
}
