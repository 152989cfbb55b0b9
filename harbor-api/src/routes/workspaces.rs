/// Workspace endpoints
///
/// # Endpoints
///
/// - `GET /v1/workspaces` - The caller's workspaces as `{ id, name, slug }[]`
/// - `POST /v1/workspaces` - Create a workspace; the creator becomes owner
/// - `POST /v1/workspaces/:id/invitations` - Invite an email (owner/admin)
/// - `GET /v1/admin/workspaces` - Every workspace (superadmin only)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use harbor_shared::{
    auth::{context::AuthContext, token},
    models::{
        invitation::{self, CreateInvitation, Invitation},
        membership::{CreateMembership, MemberRole, Membership},
        profile::Profile,
        workspace::{CreateWorkspace, Workspace, WorkspaceSummary},
    },
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Create-workspace request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateWorkspaceRequest {
    /// Display name; the slug is derived from it
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,
}

/// Invite request
#[derive(Debug, Deserialize, Validate)]
pub struct InviteRequest {
    /// Email to invite
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Role granted on acceptance (defaults to member)
    #[serde(default)]
    pub role: Option<MemberRole>,
}

/// Invite response
///
/// The plaintext token appears here exactly once; only its hash is stored.
#[derive(Debug, Serialize)]
pub struct InviteResponse {
    /// Invitation ID
    pub invitation_id: Uuid,

    /// Invited email
    pub email: String,

    /// Role granted on acceptance
    pub role: MemberRole,

    /// Link token for `/invite/confirm?token=...`
    pub token: String,

    /// When the token stops verifying
    pub expires_at: DateTime<Utc>,
}

/// List the caller's workspaces
pub async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<WorkspaceSummary>>> {
    let workspaces = Workspace::list_for_user(&state.db, auth.user_id).await?;

    Ok(Json(workspaces))
}

/// Create a workspace
///
/// The creator becomes the workspace owner. Backs the workspace-creation
/// step of onboarding.
pub async fn create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateWorkspaceRequest>,
) -> ApiResult<Json<Workspace>> {
    req.validate()?;

    let workspace = Workspace::create(
        &state.db,
        CreateWorkspace {
            name: req.name,
            created_by: auth.user_id,
        },
    )
    .await?;

    Membership::insert_or_get(
        &state.db,
        CreateMembership {
            workspace_id: workspace.id,
            user_id: auth.user_id,
            role: MemberRole::Owner,
        },
    )
    .await?;

    Ok(Json(workspace))
}

/// Invite an email to a workspace
///
/// Requires an owner or admin membership in the target workspace.
/// Re-inviting an address with a pending invitation rotates its token
/// instead of stacking a second offer.
///
/// # Errors
///
/// - `404 Not Found`: no such workspace
/// - `403 Forbidden`: caller is not an owner/admin of the workspace
pub async fn invite(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(workspace_id): Path<Uuid>,
    Json(req): Json<InviteRequest>,
) -> ApiResult<Json<InviteResponse>> {
    req.validate()?;

    Workspace::find_by_id(&state.db, workspace_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Workspace not found".to_string()))?;

    let caller_role = Membership::get_role(&state.db, workspace_id, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::Forbidden("Not a member of this workspace".to_string()))?;

    if !caller_role.can_manage_members() {
        return Err(ApiError::Forbidden(
            "Only owners and admins can invite members".to_string(),
        ));
    }

    let (plaintext, token_hash) = token::generate_invite_token();

    let created = Invitation::create_or_refresh(
        &state.db,
        CreateInvitation {
            workspace_id,
            email: req.email,
            role: req.role.unwrap_or(MemberRole::Member),
            token_hash,
            invited_by: auth.user_id,
            expires_at: Utc::now() + invitation::default_ttl(),
        },
    )
    .await?;

    tracing::info!(
        invitation_id = %created.id,
        workspace_id = %workspace_id,
        email = %created.email,
        "Created workspace invitation"
    );

    Ok(Json(InviteResponse {
        invitation_id: created.id,
        email: created.email,
        role: created.role,
        token: plaintext,
        expires_at: created.expires_at,
    }))
}

/// List every workspace (superadmin only)
///
/// # Errors
///
/// - `403 Forbidden`: caller is not a superadmin
pub async fn admin_list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<WorkspaceSummary>>> {
    let profile = Profile::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Profile not found".to_string()))?;

    if !profile.is_superadmin {
        return Err(ApiError::Forbidden(
            "Superadmin access required".to_string(),
        ));
    }

    let workspaces = Workspace::list_all(&state.db).await?;

    Ok(Json(workspaces))
}
