/// Invitation model and database operations
///
/// An invitation is a pending offer for a specific email to join a specific
/// workspace with a specific role. Rows are keyed by the SHA-256 hash of the
/// opaque link token; the plaintext is never stored. An invitation leaves
/// `pending` exactly once: the status updates are guarded with
/// `WHERE status = 'pending'`.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE invitation_status AS ENUM ('pending', 'accepted', 'rejected');
///
/// CREATE TABLE workspace_invitations (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     workspace_id UUID NOT NULL REFERENCES workspaces(id) ON DELETE CASCADE,
///     email CITEXT NOT NULL,
///     role member_role NOT NULL DEFAULT 'member',
///     status invitation_status NOT NULL DEFAULT 'pending',
///     token_hash CHAR(64) NOT NULL UNIQUE,
///     invited_by UUID REFERENCES users(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     expires_at TIMESTAMPTZ NOT NULL,
///     accepted_at TIMESTAMPTZ
/// );
/// ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::membership::MemberRole;

/// Lifecycle state of an invitation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "invitation_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    /// Outstanding; may still be accepted or rejected
    Pending,

    /// Consumed by acceptance (terminal)
    Accepted,

    /// Declined by the invitee (terminal)
    Rejected,
}

/// Invitation record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Invitation {
    /// Unique invitation ID
    pub id: Uuid,

    /// Target workspace
    pub workspace_id: Uuid,

    /// Invited email (case-insensitive via CITEXT)
    pub email: String,

    /// Role granted on acceptance
    pub role: MemberRole,

    /// Lifecycle state
    pub status: InvitationStatus,

    /// SHA-256 hex of the link token
    #[serde(skip_serializing)]
    pub token_hash: String,

    /// User who sent the invitation (None if since deleted)
    pub invited_by: Option<Uuid>,

    /// When the invitation was created
    pub created_at: DateTime<Utc>,

    /// After this instant the token no longer verifies
    pub expires_at: DateTime<Utc>,

    /// When the invitation was accepted (None unless accepted)
    pub accepted_at: Option<DateTime<Utc>>,
}

/// Input for creating an invitation
#[derive(Debug, Clone)]
pub struct CreateInvitation {
    /// Target workspace
    pub workspace_id: Uuid,

    /// Invited email
    pub email: String,

    /// Role granted on acceptance
    pub role: MemberRole,

    /// SHA-256 hex of the link token
    pub token_hash: String,

    /// Inviting user
    pub invited_by: Uuid,

    /// Expiry instant
    pub expires_at: DateTime<Utc>,
}

/// How long a fresh invitation token stays valid
pub fn default_ttl() -> Duration {
    Duration::days(7)
}

impl Invitation {
    /// Whether the token expiry has passed
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Creates an invitation, or refreshes the pending one for the same
    /// (workspace, email)
    ///
    /// Re-inviting an address that already has a pending invitation rotates
    /// the token and expiry on the existing row instead of stacking a
    /// second offer.
    pub async fn create_or_refresh(
        pool: &PgPool,
        data: CreateInvitation,
    ) -> Result<Self, sqlx::Error> {
        let refreshed = sqlx::query_as::<_, Invitation>(
            r#"
            UPDATE workspace_invitations
            SET token_hash = $3, role = $4, invited_by = $5, expires_at = $6
            WHERE workspace_id = $1 AND email = $2 AND status = 'pending'
            RETURNING id, workspace_id, email, role, status, token_hash,
                      invited_by, created_at, expires_at, accepted_at
            "#,
        )
        .bind(data.workspace_id)
        .bind(&data.email)
        .bind(&data.token_hash)
        .bind(data.role)
        .bind(data.invited_by)
        .bind(data.expires_at)
        .fetch_optional(pool)
        .await?;

        if let Some(invitation) = refreshed {
            return Ok(invitation);
        }

        let invitation = sqlx::query_as::<_, Invitation>(
            r#"
            INSERT INTO workspace_invitations
                (workspace_id, email, role, token_hash, invited_by, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, workspace_id, email, role, status, token_hash,
                      invited_by, created_at, expires_at, accepted_at
            "#,
        )
        .bind(data.workspace_id)
        .bind(&data.email)
        .bind(data.role)
        .bind(&data.token_hash)
        .bind(data.invited_by)
        .bind(data.expires_at)
        .fetch_one(pool)
        .await?;

        Ok(invitation)
    }

    /// Finds an invitation by its token hash
    pub async fn find_by_token_hash(
        pool: &PgPool,
        token_hash: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let invitation = sqlx::query_as::<_, Invitation>(
            r#"
            SELECT id, workspace_id, email, role, status, token_hash,
                   invited_by, created_at, expires_at, accepted_at
            FROM workspace_invitations
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(pool)
        .await?;

        Ok(invitation)
    }

    /// Finds an invitation by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let invitation = sqlx::query_as::<_, Invitation>(
            r#"
            SELECT id, workspace_id, email, role, status, token_hash,
                   invited_by, created_at, expires_at, accepted_at
            FROM workspace_invitations
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(invitation)
    }

    /// Marks a pending invitation accepted, stamping `accepted_at`
    ///
    /// The `status = 'pending'` guard makes the transition single-shot: a
    /// second call is a no-op.
    ///
    /// # Returns
    ///
    /// True if the row transitioned, false if it had already left `pending`.
    pub async fn mark_accepted(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE workspace_invitations
            SET status = 'accepted', accepted_at = NOW()
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Marks a pending invitation rejected
    ///
    /// # Returns
    ///
    /// True if the row transitioned, false if it had already left `pending`.
    pub async fn mark_rejected(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE workspace_invitations
            SET status = 'rejected'
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists pending invitations for a workspace
    pub async fn list_pending_by_workspace(
        pool: &PgPool,
        workspace_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let invitations = sqlx::query_as::<_, Invitation>(
            r#"
            SELECT id, workspace_id, email, role, status, token_hash,
                   invited_by, created_at, expires_at, accepted_at
            FROM workspace_invitations
            WHERE workspace_id = $1 AND status = 'pending'
            ORDER BY created_at ASC
            "#,
        )
        .bind(workspace_id)
        .fetch_all(pool)
        .await?;

        Ok(invitations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ttl() {
        assert_eq!(default_ttl(), Duration::days(7));
    }

    #[test]
    fn test_is_expired() {
        let now = Utc::now();
        let invitation = Invitation {
            id: Uuid::new_v4(),
            workspace_id: Uuid::new_v4(),
            email: "a@x.com".to_string(),
            role: MemberRole::Member,
            status: InvitationStatus::Pending,
            token_hash: "0".repeat(64),
            invited_by: None,
            created_at: now - Duration::days(8),
            expires_at: now - Duration::days(1),
            accepted_at: None,
        };

        assert!(invitation.is_expired(now));
        assert!(!invitation.is_expired(now - Duration::days(2)));
    }

    // Integration tests for the single-shot status transition live in
    // harbor-api/tests/.
}
