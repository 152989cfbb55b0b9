/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Account endpoints (register, login, refresh, email confirmation)
/// - `invitations`: Invitation verify / accept / reject
/// - `workspaces`: Workspace listing, creation, and invitations
/// - `onboarding`: Onboarding routing decision and completion
/// - `admin`: Administrative operations

pub mod admin;
pub mod auth;
pub mod health;
pub mod invitations;
pub mod onboarding;
pub mod workspaces;
