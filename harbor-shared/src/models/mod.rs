/// Database models for Harbor
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: Identity accounts (credentials, email-confirmation state)
/// - `profile`: Application-level user records
/// - `workspace`: Team/tenant containers
/// - `membership`: User-workspace relationships with roles
/// - `invitation`: Pending offers to join a workspace

pub mod invitation;
pub mod membership;
pub mod profile;
pub mod user;
pub mod workspace;
