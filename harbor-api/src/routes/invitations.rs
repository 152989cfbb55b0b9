/// Invitation endpoints
///
/// Thin HTTP adapters over [`harbor_shared::invitations::InvitationService`].
/// The acting identity for accept/reject comes exclusively from the session
/// gate's `AuthContext`; bodies carry only the opaque token.
///
/// # Endpoints
///
/// - `POST /v1/invitations/verify` - Resolve a token (public)
/// - `POST /v1/invitations/accept` - Join the workspace (gated)
/// - `POST /v1/invitations/reject` - Decline the invitation (gated)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Extension, Json};
use harbor_shared::{
    auth::context::AuthContext,
    invitations::InvitationError,
    models::{invitation::Invitation, membership::Membership},
};
use serde::{Deserialize, Serialize};

/// Request carrying an invitation link token
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    /// Opaque token from the `/invite/confirm?token=...` link
    pub token: String,
}

/// Verify response
#[derive(Debug, Serialize)]
pub struct VerifyResponse {
    /// The pending invitation
    pub invitation: Invitation,

    /// Whether the invited email already has an account; routes the
    /// visitor to sign-in instead of sign-up
    pub user_exists: bool,
}

/// Accept response
#[derive(Debug, Serialize)]
pub struct AcceptResponse {
    /// Always true (failures surface as error responses)
    pub success: bool,

    /// True when the caller was already a member; the call is still a
    /// success
    pub already_member: bool,

    /// Human-readable outcome ("joined workspace" / "already a member")
    pub message: String,

    /// The membership row
    pub membership: Membership,
}

/// Reject response
#[derive(Debug, Serialize)]
pub struct RejectResponse {
    /// Always true (failures surface as error responses)
    pub success: bool,
}

/// Verify an invitation token
///
/// Public: the token itself is the credential, and the visitor may not
/// have an account yet. Read-only.
///
/// # Errors
///
/// - `404 Not Found`: no invitation matches the token
/// - `410 Gone`: the invitation was already used, or has expired
pub async fn verify(
    State(state): State<AppState>,
    Json(req): Json<TokenRequest>,
) -> ApiResult<Json<VerifyResponse>> {
    let verified = state.invitations.verify(&req.token).await?;

    Ok(Json(VerifyResponse {
        invitation: verified.invitation,
        user_exists: verified.user_exists,
    }))
}

/// Accept an invitation
///
/// Idempotent: duplicate retries and racing tabs all converge to one
/// membership row and a success response.
///
/// # Errors
///
/// - `404` / `410`: as for verify
/// - `403 Forbidden`: the invitation targets a different email; the
///   response carries a sign-in redirect that resumes acceptance under the
///   original token
pub async fn accept(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<TokenRequest>,
) -> ApiResult<Json<AcceptResponse>> {
    let acceptance = state
        .invitations
        .accept(&auth, &req.token)
        .await
        .map_err(|e| mismatch_with_resume(e, &req.token))?;

    Ok(Json(AcceptResponse {
        success: true,
        already_member: acceptance.already_member,
        message: acceptance.message().to_string(),
        membership: acceptance.membership,
    }))
}

/// Reject an invitation
///
/// Terminal: a rejected invitation can never be accepted afterwards.
///
/// # Errors
///
/// Same taxonomy as accept.
pub async fn reject(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<TokenRequest>,
) -> ApiResult<Json<RejectResponse>> {
    state
        .invitations
        .reject(&auth, &req.token)
        .await
        .map_err(|e| mismatch_with_resume(e, &req.token))?;

    Ok(Json(RejectResponse { success: true }))
}

/// Upgrades an email mismatch into the resume-under-token redirect; the
/// client signs the wrong account out and navigates there.
fn mismatch_with_resume(err: InvitationError, token: &str) -> ApiError {
    match err {
        InvitationError::EmailMismatch => ApiError::EmailMismatch {
            signin_url: format!("/signin?invite_token={}", token),
        },
        other => ApiError::from(other),
    }
}
