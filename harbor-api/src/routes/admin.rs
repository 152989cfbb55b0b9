/// Administrative endpoints
///
/// # Endpoints
///
/// - `DELETE /v1/admin/users/:id` - Delete a user account

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use harbor_shared::{
    auth::context::AuthContext,
    models::{profile::Profile, user::User},
};
use serde::Serialize;
use uuid::Uuid;

/// Delete-user response
#[derive(Debug, Serialize)]
pub struct DeleteUserResponse {
    /// Operation outcome
    pub success: bool,
}

/// Delete a user account
///
/// Caller must hold `is_admin` or `is_superadmin`. Superadmin accounts can
/// never be deleted, by anyone. Deletion cascades the profile and
/// memberships; invitations the user sent keep their rows with
/// `invited_by` nulled.
///
/// # Errors
///
/// - `403 Forbidden`: caller lacks admin rights, or the target is a
///   superadmin
/// - `404 Not Found`: no such user
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<DeleteUserResponse>> {
    let caller = Profile::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Profile not found".to_string()))?;

    if !caller.can_administer() {
        return Err(ApiError::Forbidden("Admin access required".to_string()));
    }

    if let Some(target) = Profile::find_by_id(&state.db, user_id).await? {
        if target.is_superadmin {
            return Err(ApiError::Forbidden(
                "Superadmin accounts cannot be deleted".to_string(),
            ));
        }
    }

    let deleted = User::delete(&state.db, user_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    tracing::info!(
        deleted_user_id = %user_id,
        deleted_by = %auth.user_id,
        "User deleted"
    );

    Ok(Json(DeleteUserResponse { success: true }))
}
