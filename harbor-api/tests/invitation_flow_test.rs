/// Integration tests for the invitation lifecycle
///
/// These drive the full router against a real database and verify the
/// end-to-end properties:
/// - verify → accept creates exactly one membership and flips the
///   invitation to accepted
/// - accepting twice (sequentially or concurrently) still yields one row
/// - email mismatch refuses without mutating anything
/// - consumed and expired tokens answer 410

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{body_json, TestContext};
use harbor_shared::auth::token::{generate_invite_token, hash_token};
use harbor_shared::models::invitation::{CreateInvitation, Invitation, InvitationStatus};
use harbor_shared::models::membership::{MemberRole, Membership};
use serde_json::json;
use uuid::Uuid;

/// Creates a workspace through the API, returning its id
async fn create_workspace(ctx: &TestContext, token: &str, name: &str) -> Uuid {
    let response = ctx
        .request("POST", "/v1/workspaces", Some(token), Some(json!({ "name": name })))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    body["id"].as_str().unwrap().parse().unwrap()
}

/// Invites an email through the API, returning the plaintext link token
async fn invite(ctx: &TestContext, token: &str, workspace_id: Uuid, email: &str) -> String {
    let response = ctx
        .request(
            "POST",
            &format!("/v1/workspaces/{}/invitations", workspace_id),
            Some(token),
            Some(json!({ "email": email })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_verify_unknown_token_returns_not_found() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx
        .request(
            "POST",
            "/v1/invitations/verify",
            None,
            Some(json!({ "token": "hinv_00000000000000000000000000000000" })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_json(response).await;
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_full_acceptance_flow() {
    let ctx = TestContext::new().await.unwrap();

    let owner = ctx.create_user(true).await.unwrap();
    let workspace_id = create_workspace(&ctx, &owner.token, "Acceptance Flow").await;

    let invitee = ctx.create_user(true).await.unwrap();
    let link_token = invite(&ctx, &owner.token, workspace_id, &invitee.email).await;

    // Verify resolves the invitation and reports the existing account.
    let response = ctx
        .request(
            "POST",
            "/v1/invitations/verify",
            None,
            Some(json!({ "token": link_token })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["user_exists"], true);
    assert_eq!(body["invitation"]["status"], "pending");
    let invitation_id: Uuid = body["invitation"]["id"].as_str().unwrap().parse().unwrap();

    // Accept joins the workspace.
    let response = ctx
        .request(
            "POST",
            "/v1/invitations/accept",
            Some(&invitee.token),
            Some(json!({ "token": link_token })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["already_member"], false);
    assert_eq!(body["membership"]["role"], "member");

    // Exactly one membership row for the invitee; invitation is accepted.
    let membership = Membership::find(&ctx.db, workspace_id, invitee.id)
        .await
        .unwrap()
        .expect("membership row exists");
    assert_eq!(membership.role, MemberRole::Member);

    let invitation = Invitation::find_by_id(&ctx.db, invitation_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(invitation.status, InvitationStatus::Accepted);
    assert!(invitation.accepted_at.is_some());

    // A second accept is still a success, reported as already-member, and
    // the row count doesn't change.
    let response = ctx
        .request(
            "POST",
            "/v1/invitations/accept",
            Some(&invitee.token),
            Some(json!({ "token": link_token })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["already_member"], true);
    assert_eq!(body["message"], "already a member");

    let count = Membership::count_by_workspace(&ctx.db, workspace_id)
        .await
        .unwrap();
    assert_eq!(count, 2); // owner + invitee

    ctx.cleanup_users(&[owner.id, invitee.id]).await.unwrap();
}

#[tokio::test]
async fn test_sequential_accepts_are_idempotent() {
    let ctx = TestContext::new().await.unwrap();

    let owner = ctx.create_user(true).await.unwrap();
    let workspace_id = create_workspace(&ctx, &owner.token, "Idempotent Accepts").await;

    let invitee = ctx.create_user(true).await.unwrap();

    // Plant the invitation directly so the test holds the plaintext token.
    let (link_token, token_hash) = generate_invite_token();
    Invitation::create_or_refresh(
        &ctx.db,
        CreateInvitation {
            workspace_id,
            email: invitee.email.clone(),
            role: MemberRole::Member,
            token_hash,
            invited_by: owner.id,
            expires_at: Utc::now() + Duration::days(7),
        },
    )
    .await
    .unwrap();

    let first = ctx
        .request(
            "POST",
            "/v1/invitations/accept",
            Some(&invitee.token),
            Some(json!({ "token": link_token })),
        )
        .await;
    assert_eq!(first.status(), StatusCode::OK);

    // Rewind the invitation to pending, as if the bookkeeping update had
    // failed; the membership row must still short-circuit the retry, and
    // the retry must re-mark the invitation accepted.
    sqlx::query("UPDATE workspace_invitations SET status = 'pending', accepted_at = NULL WHERE workspace_id = $1")
        .bind(workspace_id)
        .execute(&ctx.db)
        .await
        .unwrap();

    let second = ctx
        .request(
            "POST",
            "/v1/invitations/accept",
            Some(&invitee.token),
            Some(json!({ "token": link_token })),
        )
        .await;
    assert_eq!(second.status(), StatusCode::OK);

    let body = body_json(second).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["already_member"], true);
    assert_eq!(body["message"], "already a member");

    // Still exactly one membership row (owner + invitee = 2 total), and the
    // short-circuit re-marked the invitation accepted.
    let count = Membership::count_by_workspace(&ctx.db, workspace_id)
        .await
        .unwrap();
    assert_eq!(count, 2);

    let pending = Invitation::list_pending_by_workspace(&ctx.db, workspace_id)
        .await
        .unwrap();
    assert!(pending.is_empty());

    ctx.cleanup_users(&[owner.id, invitee.id]).await.unwrap();
}

#[tokio::test]
async fn test_concurrent_accepts_converge_to_one_row() {
    let ctx = TestContext::new().await.unwrap();

    let owner = ctx.create_user(true).await.unwrap();
    let workspace_id = create_workspace(&ctx, &owner.token, "Racing Tabs").await;

    let invitee = ctx.create_user(true).await.unwrap();
    let link_token = invite(&ctx, &owner.token, workspace_id, &invitee.email).await;

    // Two tabs accept at once.
    let (a, b) = tokio::join!(
        ctx.request(
            "POST",
            "/v1/invitations/accept",
            Some(&invitee.token),
            Some(json!({ "token": link_token })),
        ),
        ctx.request(
            "POST",
            "/v1/invitations/accept",
            Some(&invitee.token),
            Some(json!({ "token": link_token })),
        ),
    );

    // Both converge to success; the loser of the insert race reports
    // already-member instead of surfacing a constraint error.
    assert_eq!(a.status(), StatusCode::OK);
    assert_eq!(b.status(), StatusCode::OK);

    let count = Membership::count_by_workspace(&ctx.db, workspace_id)
        .await
        .unwrap();
    assert_eq!(count, 2); // owner + invitee, never three

    ctx.cleanup_users(&[owner.id, invitee.id]).await.unwrap();
}

#[tokio::test]
async fn test_email_mismatch_refuses_without_mutating() {
    let ctx = TestContext::new().await.unwrap();

    let owner = ctx.create_user(true).await.unwrap();
    let workspace_id = create_workspace(&ctx, &owner.token, "Mismatch").await;

    let invitee = ctx.create_user(true).await.unwrap();
    let interloper = ctx.create_user(true).await.unwrap();
    let link_token = invite(&ctx, &owner.token, workspace_id, &invitee.email).await;

    let response = ctx
        .request(
            "POST",
            "/v1/invitations/accept",
            Some(&interloper.token),
            Some(json!({ "token": link_token })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let body = body_json(response).await;
    assert_eq!(body["error"], "email_mismatch");
    let redirect = body["redirect_to"].as_str().unwrap();
    assert!(redirect.starts_with("/signin?invite_token="));
    assert!(redirect.contains(&link_token));

    // Nothing was mutated: no membership, invitation still pending.
    assert!(!Membership::exists(&ctx.db, workspace_id, interloper.id)
        .await
        .unwrap());

    let invitation = Invitation::find_by_token_hash(&ctx.db, &hash_token(&link_token))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(invitation.status, InvitationStatus::Pending);

    ctx.cleanup_users(&[owner.id, invitee.id, interloper.id])
        .await
        .unwrap();
}

#[tokio::test]
async fn test_expired_invitation_is_gone() {
    let ctx = TestContext::new().await.unwrap();

    let owner = ctx.create_user(true).await.unwrap();
    let workspace_id = create_workspace(&ctx, &owner.token, "Expired").await;

    let (link_token, token_hash) = generate_invite_token();
    Invitation::create_or_refresh(
        &ctx.db,
        CreateInvitation {
            workspace_id,
            email: "expired@example.com".to_string(),
            role: MemberRole::Member,
            token_hash,
            invited_by: owner.id,
            expires_at: Utc::now() - Duration::days(1),
        },
    )
    .await
    .unwrap();

    let response = ctx
        .request(
            "POST",
            "/v1/invitations/verify",
            None,
            Some(json!({ "token": link_token })),
        )
        .await;

    assert_eq!(response.status(), StatusCode::GONE);

    let body = body_json(response).await;
    assert_eq!(body["message"], "Invitation has expired");

    ctx.cleanup_users(&[owner.id]).await.unwrap();
}

#[tokio::test]
async fn test_reject_is_terminal() {
    let ctx = TestContext::new().await.unwrap();

    let owner = ctx.create_user(true).await.unwrap();
    let workspace_id = create_workspace(&ctx, &owner.token, "Rejection").await;

    let invitee = ctx.create_user(true).await.unwrap();
    let link_token = invite(&ctx, &owner.token, workspace_id, &invitee.email).await;

    let response = ctx
        .request(
            "POST",
            "/v1/invitations/reject",
            Some(&invitee.token),
            Some(json!({ "token": link_token })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["success"], true);

    // The token is dead afterwards.
    let response = ctx
        .request(
            "POST",
            "/v1/invitations/accept",
            Some(&invitee.token),
            Some(json!({ "token": link_token })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::GONE);

    assert!(!Membership::exists(&ctx.db, workspace_id, invitee.id)
        .await
        .unwrap());

    ctx.cleanup_users(&[owner.id, invitee.id]).await.unwrap();
}

#[tokio::test]
async fn test_reinvite_rotates_pending_token() {
    let ctx = TestContext::new().await.unwrap();

    let owner = ctx.create_user(true).await.unwrap();
    let workspace_id = create_workspace(&ctx, &owner.token, "Reinvite").await;

    let email = format!("rotate-{}@example.com", Uuid::new_v4());
    let first_token = invite(&ctx, &owner.token, workspace_id, &email).await;
    let second_token = invite(&ctx, &owner.token, workspace_id, &email).await;

    assert_ne!(first_token, second_token);

    // The old link is dead, the new one resolves, and only one pending
    // invitation exists for the email.
    let response = ctx
        .request(
            "POST",
            "/v1/invitations/verify",
            None,
            Some(json!({ "token": first_token })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = ctx
        .request(
            "POST",
            "/v1/invitations/verify",
            None,
            Some(json!({ "token": second_token })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let pending = Invitation::list_pending_by_workspace(&ctx.db, workspace_id)
        .await
        .unwrap();
    assert_eq!(pending.len(), 1);

    ctx.cleanup_users(&[owner.id]).await.unwrap();
}
