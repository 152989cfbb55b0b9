/// Onboarding routing decision
///
/// Decides, from already-fetched state, whether a freshly loaded session
/// should see the full onboarding flow (profile completion + workspace
/// creation), the workspace-creation-only variant, or neither. This is a
/// pure function: the HTTP layer fetches the profile and memberships,
/// calls [`decide`], and persists the visited marker when workspaces exist
/// so future loads skip the check entirely.
///
/// The state that the original system kept in browser-local storage
/// (completion timestamp, dashboard-visited flag) is server-recorded on the
/// profile row, so every client observes the same answer.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::models::profile::Profile;

/// Completions within this window suppress onboarding entirely, so a user
/// who just closed the flow doesn't see it flicker back from stale cached
/// state.
pub fn just_completed_window() -> Duration {
    Duration::seconds(10)
}

/// State the decision is computed from
#[derive(Debug, Clone)]
pub struct OnboardingSnapshot {
    /// Both name parts present and non-empty
    pub has_name: bool,

    /// Number of workspaces the user belongs to
    pub workspace_count: usize,

    /// Whether the user has previously landed on the dashboard with
    /// workspaces present
    pub dashboard_visited: bool,

    /// When the user last completed the onboarding flow
    pub completed_at: Option<DateTime<Utc>>,
}

impl OnboardingSnapshot {
    /// Builds a snapshot from a loaded profile and membership count
    pub fn from_profile(profile: &Profile, workspace_count: usize) -> Self {
        Self {
            has_name: profile.has_name(),
            workspace_count,
            dashboard_visited: profile.dashboard_visited,
            completed_at: profile.onboarding_completed_at,
        }
    }

    fn has_workspaces(&self) -> bool {
        self.workspace_count > 0
    }

    fn just_completed(&self, now: DateTime<Utc>) -> bool {
        self.completed_at
            .map_or(false, |at| now - at < just_completed_window())
    }
}

/// What the client should show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OnboardingDecision {
    /// Show the full onboarding flow (profile completion + workspace
    /// creation)
    pub show_onboarding: bool,

    /// Show only the workspace-creation step
    pub show_workspace_creation_only: bool,
}

impl OnboardingDecision {
    /// Neither flow shows
    pub const NONE: Self = Self {
        show_onboarding: false,
        show_workspace_creation_only: false,
    };
}

/// Decides which onboarding flow, if any, to show
///
/// Rules, in order:
/// 1. A completion within [`just_completed_window`] suppresses everything.
/// 2. Members of at least one workspace never see onboarding.
/// 3. A profile without a full name gets the full flow.
/// 4. A named profile with no workspaces gets the workspace-creation step,
///    unless the dashboard-visited marker is already set.
pub fn decide(snapshot: &OnboardingSnapshot, now: DateTime<Utc>) -> OnboardingDecision {
    if snapshot.just_completed(now) {
        return OnboardingDecision::NONE;
    }

    if snapshot.has_workspaces() {
        return OnboardingDecision::NONE;
    }

    if !snapshot.has_name {
        return OnboardingDecision {
            show_onboarding: true,
            show_workspace_creation_only: false,
        };
    }

    if !snapshot.dashboard_visited {
        return OnboardingDecision {
            show_onboarding: false,
            show_workspace_creation_only: true,
        };
    }

    OnboardingDecision::NONE
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(
        has_name: bool,
        workspace_count: usize,
        dashboard_visited: bool,
    ) -> OnboardingSnapshot {
        OnboardingSnapshot {
            has_name,
            workspace_count,
            dashboard_visited,
            completed_at: None,
        }
    }

    #[test]
    fn test_workspaces_suppress_onboarding() {
        let now = Utc::now();
        assert_eq!(decide(&snapshot(false, 2, false), now), OnboardingDecision::NONE);
        assert_eq!(decide(&snapshot(true, 1, false), now), OnboardingDecision::NONE);
    }

    #[test]
    fn test_missing_name_shows_full_onboarding() {
        let decision = decide(&snapshot(false, 0, false), Utc::now());
        assert!(decision.show_onboarding);
        assert!(!decision.show_workspace_creation_only);
    }

    #[test]
    fn test_named_without_workspaces_shows_creation_only() {
        let decision = decide(&snapshot(true, 0, false), Utc::now());
        assert!(!decision.show_onboarding);
        assert!(decision.show_workspace_creation_only);
    }

    #[test]
    fn test_visited_marker_skips_creation_prompt() {
        let decision = decide(&snapshot(true, 0, true), Utc::now());
        assert_eq!(decision, OnboardingDecision::NONE);
    }

    #[test]
    fn test_recent_completion_suppresses_everything() {
        let now = Utc::now();
        let mut snap = snapshot(false, 0, false);
        snap.completed_at = Some(now - Duration::seconds(3));

        assert_eq!(decide(&snap, now), OnboardingDecision::NONE);
    }

    #[test]
    fn test_stale_completion_does_not_suppress() {
        let now = Utc::now();
        let mut snap = snapshot(false, 0, false);
        snap.completed_at = Some(now - Duration::seconds(30));

        assert!(decide(&snap, now).show_onboarding);
    }
}
