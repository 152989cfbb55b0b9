/// Membership model and database operations
///
/// A membership is the realized relationship between a user and a
/// workspace. The table's composite primary key is the only concurrency
/// safeguard the invitation flow relies on: two racing accepts both funnel
/// through [`Membership::insert_or_get`] and converge to a single row.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE member_role AS ENUM ('owner', 'admin', 'member');
///
/// CREATE TABLE workspace_members (
///     workspace_id UUID NOT NULL REFERENCES workspaces(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     role member_role NOT NULL DEFAULT 'member',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     PRIMARY KEY (workspace_id, user_id)
/// );
/// ```
///
/// # Roles
///
/// - **owner**: created the workspace; full control
/// - **admin**: can invite and remove members
/// - **member**: regular access

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Role of a user within a workspace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "member_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    /// Created the workspace; full control
    Owner,

    /// Can invite and remove members
    Admin,

    /// Regular access
    Member,
}

impl MemberRole {
    /// Converts role to string for display
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberRole::Owner => "owner",
            MemberRole::Admin => "admin",
            MemberRole::Member => "member",
        }
    }

    /// Whether this role can invite members and manage invitations
    pub fn can_manage_members(&self) -> bool {
        matches!(self, MemberRole::Owner | MemberRole::Admin)
    }
}

/// Membership record: user-workspace relationship with a role
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Membership {
    /// Workspace ID
    pub workspace_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// Role within the workspace
    pub role: MemberRole,

    /// When the membership was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new membership
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMembership {
    /// Workspace ID
    pub workspace_id: Uuid,

    /// User ID
    pub user_id: Uuid,

    /// Role to assign (defaults to Member)
    #[serde(default = "default_role")]
    pub role: MemberRole,
}

fn default_role() -> MemberRole {
    MemberRole::Member
}

impl Membership {
    /// Inserts a membership, or returns the existing one
    ///
    /// This is the idempotent acceptance primitive: the insert carries
    /// `ON CONFLICT (workspace_id, user_id) DO NOTHING`, and when the row
    /// already existed (including when a concurrent call won the race) the
    /// existing row is read back instead. The caller never sees a
    /// constraint violation.
    ///
    /// # Returns
    ///
    /// `(membership, newly_created)`; `newly_created` is false when the
    /// user was already a member.
    ///
    /// # Errors
    ///
    /// Returns an error if the workspace or user doesn't exist (foreign key
    /// violation) or the database is unreachable.
    pub async fn insert_or_get(
        pool: &PgPool,
        data: CreateMembership,
    ) -> Result<(Self, bool), sqlx::Error> {
        let inserted = sqlx::query_as::<_, Membership>(
            r#"
            INSERT INTO workspace_members (workspace_id, user_id, role)
            VALUES ($1, $2, $3)
            ON CONFLICT (workspace_id, user_id) DO NOTHING
            RETURNING workspace_id, user_id, role, created_at
            "#,
        )
        .bind(data.workspace_id)
        .bind(data.user_id)
        .bind(data.role)
        .fetch_optional(pool)
        .await?;

        if let Some(membership) = inserted {
            return Ok((membership, true));
        }

        // Conflict: the row exists (possibly written by a concurrent call
        // a moment ago). Read it back.
        let existing = Self::find(pool, data.workspace_id, data.user_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;

        Ok((existing, false))
    }

    /// Finds a specific membership by workspace and user
    pub async fn find(
        pool: &PgPool,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            SELECT workspace_id, user_id, role, created_at
            FROM workspace_members
            WHERE workspace_id = $1 AND user_id = $2
            "#,
        )
        .bind(workspace_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(membership)
    }

    /// Checks if a user belongs to a workspace (any role)
    pub async fn exists(
        pool: &PgPool,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM workspace_members
                WHERE workspace_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(workspace_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Gets a user's role in a workspace
    ///
    /// # Returns
    ///
    /// The role if the user is a member, None otherwise.
    pub async fn get_role(
        pool: &PgPool,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<MemberRole>, sqlx::Error> {
        let role: Option<MemberRole> = sqlx::query_scalar(
            r#"
            SELECT role FROM workspace_members
            WHERE workspace_id = $1 AND user_id = $2
            "#,
        )
        .bind(workspace_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(role)
    }

    /// Lists all memberships of a user
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let memberships = sqlx::query_as::<_, Membership>(
            r#"
            SELECT workspace_id, user_id, role, created_at
            FROM workspace_members
            WHERE user_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(memberships)
    }

    /// Lists all members of a workspace
    pub async fn list_by_workspace(
        pool: &PgPool,
        workspace_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let memberships = sqlx::query_as::<_, Membership>(
            r#"
            SELECT workspace_id, user_id, role, created_at
            FROM workspace_members
            WHERE workspace_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(workspace_id)
        .fetch_all(pool)
        .await?;

        Ok(memberships)
    }

    /// Counts memberships for a workspace
    pub async fn count_by_workspace(pool: &PgPool, workspace_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM workspace_members WHERE workspace_id = $1")
                .bind(workspace_id)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }

    /// Removes a user from a workspace
    ///
    /// # Returns
    ///
    /// True if a membership was deleted, false if none existed.
    pub async fn delete(
        pool: &PgPool,
        workspace_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM workspace_members WHERE workspace_id = $1 AND user_id = $2")
                .bind(workspace_id)
                .bind(user_id)
                .execute(pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_role_as_str() {
        assert_eq!(MemberRole::Owner.as_str(), "owner");
        assert_eq!(MemberRole::Admin.as_str(), "admin");
        assert_eq!(MemberRole::Member.as_str(), "member");
    }

    #[test]
    fn test_role_permissions() {
        assert!(MemberRole::Owner.can_manage_members());
        assert!(MemberRole::Admin.can_manage_members());
        assert!(!MemberRole::Member.can_manage_members());
    }

    #[test]
    fn test_create_membership_default_role() {
        assert_eq!(default_role(), MemberRole::Member);
    }

    // Integration tests for insert_or_get (including the race convergence
    // property) live in harbor-api/tests/.
}
