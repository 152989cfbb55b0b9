/// Profile model and database operations
///
/// The profile is the application-level user record supplementing the
/// identity account: display names, self-declared role and company size,
/// goals, admin flags, and the server-recorded onboarding state. The row id
/// equals the user id.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE profiles (
///     id UUID PRIMARY KEY REFERENCES users(id) ON DELETE CASCADE,
///     email CITEXT NOT NULL,
///     first_name VARCHAR(100),
///     last_name VARCHAR(100),
///     role VARCHAR(100),
///     company_size VARCHAR(50),
///     goals TEXT[] NOT NULL DEFAULT '{}',
///     is_admin BOOLEAN NOT NULL DEFAULT FALSE,
///     is_superadmin BOOLEAN NOT NULL DEFAULT FALSE,
///     onboarding_completed_at TIMESTAMPTZ,
///     dashboard_visited BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// The onboarding columns are authoritative: what the original system kept
/// in browser-local flags is recorded here so every client observes the
/// same state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Application-level user record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    /// User ID (same as the identity account id)
    pub id: Uuid,

    /// Denormalized email copy, used for invitation matching
    pub email: String,

    /// Given name (collected during onboarding)
    pub first_name: Option<String>,

    /// Family name (collected during onboarding)
    pub last_name: Option<String>,

    /// Self-declared job role
    pub role: Option<String>,

    /// Self-declared company size bracket
    pub company_size: Option<String>,

    /// Goals selected during onboarding
    pub goals: Vec<String>,

    /// Platform administrator
    pub is_admin: bool,

    /// Platform superadministrator (cannot be deleted)
    pub is_superadmin: bool,

    /// When the user finished the onboarding flow (None if never)
    pub onboarding_completed_at: Option<DateTime<Utc>>,

    /// Whether the user has landed on the dashboard with workspaces present
    pub dashboard_visited: bool,

    /// When the profile was created
    pub created_at: DateTime<Utc>,

    /// When the profile was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a profile alongside a new identity account
#[derive(Debug, Clone)]
pub struct CreateProfile {
    /// User ID (must match the identity account)
    pub id: Uuid,

    /// Email copied from the identity account
    pub email: String,

    /// Optional given name supplied at registration
    pub first_name: Option<String>,

    /// Optional family name supplied at registration
    pub last_name: Option<String>,
}

/// Fields collected by the onboarding flow
///
/// Only non-None fields are written.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfile {
    /// New given name
    pub first_name: Option<String>,

    /// New family name
    pub last_name: Option<String>,

    /// New job role
    pub role: Option<String>,

    /// New company size bracket
    pub company_size: Option<String>,

    /// Replacement goals list
    pub goals: Option<Vec<String>>,
}

impl Profile {
    /// Whether both name parts are present and non-empty
    pub fn has_name(&self) -> bool {
        let filled = |v: &Option<String>| v.as_deref().map_or(false, |s| !s.trim().is_empty());
        filled(&self.first_name) && filled(&self.last_name)
    }

    /// Whether the profile may exercise admin endpoints
    pub fn can_administer(&self) -> bool {
        self.is_admin || self.is_superadmin
    }

    /// Creates a profile row
    ///
    /// # Errors
    ///
    /// Returns an error if a profile already exists for the id or the
    /// referenced user is missing.
    pub async fn create(pool: &PgPool, data: CreateProfile) -> Result<Self, sqlx::Error> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (id, email, first_name, last_name)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, first_name, last_name, role, company_size, goals,
                      is_admin, is_superadmin, onboarding_completed_at, dashboard_visited,
                      created_at, updated_at
            "#,
        )
        .bind(data.id)
        .bind(data.email)
        .bind(data.first_name)
        .bind(data.last_name)
        .fetch_one(pool)
        .await?;

        Ok(profile)
    }

    /// Finds a profile by user ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, email, first_name, last_name, role, company_size, goals,
                   is_admin, is_superadmin, onboarding_completed_at, dashboard_visited,
                   created_at, updated_at
            FROM profiles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(profile)
    }

    /// Checks whether any profile exists for an email
    ///
    /// Used by invitation verification as the "this email already has an
    /// account" signal.
    pub async fn exists_by_email(pool: &PgPool, email: &str) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(SELECT 1 FROM profiles WHERE email = $1)
            "#,
        )
        .bind(email)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Applies onboarding-collected fields
    ///
    /// Only non-None fields in `data` are written; `updated_at` is bumped.
    ///
    /// # Returns
    ///
    /// The updated profile if found, None if no profile exists for the id.
    pub async fn update_details(
        pool: &PgPool,
        id: Uuid,
        data: UpdateProfile,
    ) -> Result<Option<Self>, sqlx::Error> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles
            SET first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                role = COALESCE($4, role),
                company_size = COALESCE($5, company_size),
                goals = COALESCE($6, goals),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, email, first_name, last_name, role, company_size, goals,
                      is_admin, is_superadmin, onboarding_completed_at, dashboard_visited,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(data.first_name)
        .bind(data.last_name)
        .bind(data.role)
        .bind(data.company_size)
        .bind(data.goals)
        .fetch_optional(pool)
        .await?;

        Ok(profile)
    }

    /// Stamps the onboarding flow as completed
    pub async fn mark_onboarding_completed(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE profiles
            SET onboarding_completed_at = NOW(), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Records that the user has seen the dashboard with workspaces present
    ///
    /// Once set, the onboarding router skips the workspace-creation prompt
    /// for good.
    pub async fn mark_dashboard_visited(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE profiles
            SET dashboard_visited = TRUE, updated_at = NOW()
            WHERE id = $1 AND dashboard_visited = FALSE
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(first: Option<&str>, last: Option<&str>) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            email: "a@x.com".to_string(),
            first_name: first.map(String::from),
            last_name: last.map(String::from),
            role: None,
            company_size: None,
            goals: vec![],
            is_admin: false,
            is_superadmin: false,
            onboarding_completed_at: None,
            dashboard_visited: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_has_name() {
        assert!(profile(Some("Ada"), Some("Lovelace")).has_name());
        assert!(!profile(Some("Ada"), None).has_name());
        assert!(!profile(None, Some("Lovelace")).has_name());
        assert!(!profile(Some(""), Some("Lovelace")).has_name());
        assert!(!profile(Some("   "), Some("Lovelace")).has_name());
    }

    #[test]
    fn test_can_administer() {
        let mut p = profile(None, None);
        assert!(!p.can_administer());
        p.is_admin = true;
        assert!(p.can_administer());
        p.is_admin = false;
        p.is_superadmin = true;
        assert!(p.can_administer());
    }
}
