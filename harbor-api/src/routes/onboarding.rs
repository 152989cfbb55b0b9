/// Onboarding endpoints
///
/// The decision endpoint computes what a freshly loaded client should show
/// from server-recorded state, and persists the dashboard-visited marker
/// when the user has workspaces, so future loads skip the check
/// entirely. Completion stamps the profile and applies whatever fields the
/// flow collected.
///
/// # Endpoints
///
/// - `GET /v1/onboarding` - Compute the routing decision
/// - `POST /v1/onboarding/complete` - Record completion (+ profile fields)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Extension, Json};
use chrono::Utc;
use harbor_shared::{
    auth::context::AuthContext,
    models::{
        profile::{Profile, UpdateProfile},
        workspace::Workspace,
    },
    onboarding::{self, OnboardingDecision, OnboardingSnapshot},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Completion request; all fields optional
#[derive(Debug, Deserialize, Validate)]
pub struct CompleteRequest {
    /// Given name collected by the flow
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub first_name: Option<String>,

    /// Family name collected by the flow
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub last_name: Option<String>,

    /// Self-declared job role
    #[validate(length(max = 100, message = "Role must be at most 100 characters"))]
    pub role: Option<String>,

    /// Self-declared company size bracket
    #[validate(length(max = 50, message = "Company size must be at most 50 characters"))]
    pub company_size: Option<String>,

    /// Goals selected in the flow
    pub goals: Option<Vec<String>>,
}

/// Completion response
#[derive(Debug, Serialize)]
pub struct CompleteResponse {
    /// Operation outcome
    pub success: bool,

    /// The updated profile
    pub profile: Profile,
}

/// Compute the onboarding routing decision
///
/// Side effect: when the caller already has workspaces, the
/// dashboard-visited marker is persisted so the workspace-creation prompt
/// never reappears.
pub async fn decision(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<OnboardingDecision>> {
    let profile = Profile::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Profile not found".to_string()))?;

    let workspaces = Workspace::list_for_user(&state.db, auth.user_id).await?;

    let snapshot = OnboardingSnapshot::from_profile(&profile, workspaces.len());
    let decision = onboarding::decide(&snapshot, Utc::now());

    if !workspaces.is_empty() && !profile.dashboard_visited {
        Profile::mark_dashboard_visited(&state.db, auth.user_id).await?;
    }

    Ok(Json(decision))
}

/// Record onboarding completion
///
/// Applies the collected profile fields, then stamps
/// `onboarding_completed_at`. The stamp suppresses re-showing the flow for
/// a short window even if a client still holds stale state.
pub async fn complete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CompleteRequest>,
) -> ApiResult<Json<CompleteResponse>> {
    req.validate()?;

    Profile::update_details(
        &state.db,
        auth.user_id,
        UpdateProfile {
            first_name: req.first_name,
            last_name: req.last_name,
            role: req.role,
            company_size: req.company_size,
            goals: req.goals,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Profile not found".to_string()))?;

    Profile::mark_onboarding_completed(&state.db, auth.user_id).await?;

    let profile = Profile::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Profile not found".to_string()))?;

    Ok(Json(CompleteResponse {
        success: true,
        profile,
    }))
}
