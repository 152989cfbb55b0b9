/// Workspace invitation service
///
/// One service owns the whole invitation lifecycle (`verify`, `accept`,
/// `reject`) behind a single authorization policy, with the HTTP routes as
/// thin adapters. The acting user always comes from the verified session
/// context; nothing in this module trusts a caller-supplied user id.
///
/// # Lifecycle
///
/// ```text
/// admin invites email ──► pending ──verify──► (read-only)
///                           │
///                           ├─accept──► accepted + membership row
///                           └─reject──► rejected
/// ```
///
/// Acceptance is idempotent: the membership insert is an insert-or-get on
/// the `(workspace_id, user_id)` primary key, so duplicate client retries
/// and racing tabs both converge to one membership row and a success
/// response.

use sqlx::PgPool;
use tracing::warn;

use crate::auth::context::AuthContext;
use crate::auth::token::hash_token;
use crate::models::invitation::{Invitation, InvitationStatus};
use crate::models::membership::{CreateMembership, Membership};
use crate::models::profile::Profile;

/// Error taxonomy for invitation operations
///
/// `AlreadyMember` is deliberately absent: an accept that finds an existing
/// membership is a success, reported via [`Acceptance::already_member`].
#[derive(Debug, thiserror::Error)]
pub enum InvitationError {
    /// No invitation matches the presented token
    #[error("Invitation not found")]
    NotFound,

    /// The invitation has already been accepted or rejected
    #[error("Invitation has already been used")]
    AlreadyUsed,

    /// The invitation token has expired
    #[error("Invitation has expired")]
    Expired,

    /// The invitation targets a different email than the caller's
    #[error("Invitation was issued to a different email address")]
    EmailMismatch,

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result of verifying an invitation token
#[derive(Debug, Clone)]
pub struct VerifiedInvitation {
    /// The pending invitation
    pub invitation: Invitation,

    /// Whether a profile already exists for the invited email; routes the
    /// visitor to sign-in rather than sign-up
    pub user_exists: bool,
}

/// Result of accepting an invitation
#[derive(Debug, Clone)]
pub struct Acceptance {
    /// The membership (new, or pre-existing)
    pub membership: Membership,

    /// True when the caller was already a member and the accept was a no-op
    pub already_member: bool,
}

impl Acceptance {
    /// Human-readable outcome for the response body
    pub fn message(&self) -> &'static str {
        if self.already_member {
            "already a member"
        } else {
            "joined workspace"
        }
    }
}

/// Authorization policy shared by every mutating invitation operation
///
/// The invitation's target email must equal the authenticated caller's
/// email (case-insensitively). A mismatch refuses the operation without
/// touching any row; the client signs the wrong account out and resumes
/// under the original token.
#[derive(Debug, Clone, Copy, Default)]
pub struct InvitationPolicy;

impl InvitationPolicy {
    /// Checks that the caller may consume the invitation
    pub fn authorize(
        &self,
        invitation: &Invitation,
        actor: &AuthContext,
    ) -> Result<(), InvitationError> {
        if invitation.email.eq_ignore_ascii_case(&actor.email) {
            Ok(())
        } else {
            Err(InvitationError::EmailMismatch)
        }
    }
}

/// The invitation service
///
/// Cheap to clone; holds the connection pool and the authorization policy.
#[derive(Clone)]
pub struct InvitationService {
    pool: PgPool,
    policy: InvitationPolicy,
}

impl InvitationService {
    /// Creates a service over a connection pool
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            policy: InvitationPolicy,
        }
    }

    /// Verifies an invitation token
    ///
    /// Read-only: resolves the pending invitation behind the token and
    /// reports whether the invited email already has an account.
    ///
    /// # Errors
    ///
    /// - [`InvitationError::NotFound`] if no invitation matches the token
    /// - [`InvitationError::AlreadyUsed`] if the invitation left `pending`
    /// - [`InvitationError::Expired`] if the token expiry has passed
    pub async fn verify(&self, token: &str) -> Result<VerifiedInvitation, InvitationError> {
        let invitation = self.resolve_pending(token).await?;

        let user_exists = Profile::exists_by_email(&self.pool, &invitation.email).await?;

        Ok(VerifiedInvitation {
            invitation,
            user_exists,
        })
    }

    /// Accepts an invitation on behalf of the authenticated caller
    ///
    /// Idempotent and safe under races: the membership insert-or-get is the
    /// only authoritative write. Marking the invitation `accepted` is
    /// best-effort bookkeeping: if that update fails, the membership still
    /// stands and the call still succeeds.
    ///
    /// # Errors
    ///
    /// Verification errors as in [`verify`](Self::verify), plus
    /// [`InvitationError::EmailMismatch`] when the invitation targets a
    /// different email than the caller's.
    pub async fn accept(
        &self,
        actor: &AuthContext,
        token: &str,
    ) -> Result<Acceptance, InvitationError> {
        let invitation = self.resolve(token).await?;

        match invitation.status {
            // Re-accepting an accepted invitation is the duplicate-retry /
            // second-tab case; it must stay a success.
            InvitationStatus::Accepted => {}
            InvitationStatus::Rejected => return Err(InvitationError::AlreadyUsed),
            InvitationStatus::Pending => {
                if invitation.is_expired(chrono::Utc::now()) {
                    return Err(InvitationError::Expired);
                }
            }
        }

        self.policy.authorize(&invitation, actor)?;

        let (membership, newly_created) = Membership::insert_or_get(
            &self.pool,
            CreateMembership {
                workspace_id: invitation.workspace_id,
                user_id: actor.user_id,
                role: invitation.role,
            },
        )
        .await?;

        // Membership is the source of truth for access; the invitation row
        // is bookkeeping. Log and continue rather than unwinding the join.
        if let Err(e) = Invitation::mark_accepted(&self.pool, invitation.id).await {
            warn!(
                invitation_id = %invitation.id,
                error = %e,
                "Failed to mark invitation accepted; membership stands"
            );
        }

        Ok(Acceptance {
            membership,
            already_member: !newly_created,
        })
    }

    /// Rejects an invitation on behalf of the authenticated caller
    ///
    /// Terminal: a rejected invitation can never be accepted.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`accept`](Self::accept). Losing a race against a
    /// concurrent accept/reject surfaces as `AlreadyUsed`.
    pub async fn reject(&self, actor: &AuthContext, token: &str) -> Result<(), InvitationError> {
        let invitation = self.resolve_pending(token).await?;

        self.policy.authorize(&invitation, actor)?;

        let transitioned = Invitation::mark_rejected(&self.pool, invitation.id).await?;
        if !transitioned {
            return Err(InvitationError::AlreadyUsed);
        }

        Ok(())
    }

    /// Looks up the invitation behind a token
    async fn resolve(&self, token: &str) -> Result<Invitation, InvitationError> {
        let token_hash = hash_token(token);

        Invitation::find_by_token_hash(&self.pool, &token_hash)
            .await?
            .ok_or(InvitationError::NotFound)
    }

    /// Looks up the invitation behind a token and checks it is still
    /// consumable
    async fn resolve_pending(&self, token: &str) -> Result<Invitation, InvitationError> {
        let invitation = self.resolve(token).await?;

        if invitation.status != InvitationStatus::Pending {
            return Err(InvitationError::AlreadyUsed);
        }

        if invitation.is_expired(chrono::Utc::now()) {
            return Err(InvitationError::Expired);
        }

        Ok(invitation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::membership::MemberRole;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn invitation_for(email: &str) -> Invitation {
        Invitation {
            id: Uuid::new_v4(),
            workspace_id: Uuid::new_v4(),
            email: email.to_string(),
            role: MemberRole::Member,
            status: InvitationStatus::Pending,
            token_hash: "0".repeat(64),
            invited_by: None,
            created_at: Utc::now(),
            expires_at: Utc::now() + Duration::days(7),
            accepted_at: None,
        }
    }

    #[test]
    fn test_policy_accepts_matching_email() {
        let policy = InvitationPolicy;
        let invitation = invitation_for("a@x.com");
        let actor = AuthContext::new(Uuid::new_v4(), "a@x.com", true);

        assert!(policy.authorize(&invitation, &actor).is_ok());
    }

    #[test]
    fn test_policy_is_case_insensitive() {
        let policy = InvitationPolicy;
        let invitation = invitation_for("A@X.com");
        let actor = AuthContext::new(Uuid::new_v4(), "a@x.COM", true);

        assert!(policy.authorize(&invitation, &actor).is_ok());
    }

    #[test]
    fn test_policy_refuses_mismatched_email() {
        let policy = InvitationPolicy;
        let invitation = invitation_for("a@x.com");
        let actor = AuthContext::new(Uuid::new_v4(), "b@x.com", true);

        assert!(matches!(
            policy.authorize(&invitation, &actor),
            Err(InvitationError::EmailMismatch)
        ));
    }

    #[test]
    fn test_acceptance_message() {
        let membership = Membership {
            workspace_id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            role: MemberRole::Member,
            created_at: Utc::now(),
        };

        let fresh = Acceptance {
            membership: membership.clone(),
            already_member: false,
        };
        assert_eq!(fresh.message(), "joined workspace");

        let repeat = Acceptance {
            membership,
            already_member: true,
        };
        assert_eq!(repeat.message(), "already a member");
    }

    // The verify/accept/reject paths against a real database, including the
    // double-accept and race-convergence properties, are covered in
    // harbor-api/tests/.
}
