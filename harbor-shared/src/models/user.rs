/// User model and database operations
///
/// This module provides the identity account: credentials and
/// email-confirmation state. Application data (names, goals, admin flags)
/// lives on the companion `profile` row keyed by the same id.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email CITEXT NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     email_verified BOOLEAN NOT NULL DEFAULT FALSE,
///     email_verified_at TIMESTAMPTZ,
///     email_verify_token_hash CHAR(64),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     last_login_at TIMESTAMPTZ
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Identity account record
///
/// Passwords are stored as Argon2id hashes, never in plaintext. The
/// email-confirmation token is likewise stored only as a SHA-256 hash.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Email address (case-insensitive via CITEXT), unique across accounts
    pub email: String,

    /// Argon2id password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Whether the email address has been confirmed
    pub email_verified: bool,

    /// When the email address was confirmed (None if never)
    pub email_verified_at: Option<DateTime<Utc>>,

    /// SHA-256 hash of the outstanding confirmation token, if any
    #[serde(skip_serializing)]
    pub email_verify_token_hash: Option<String>,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,

    /// When the user last logged in (None if never)
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Input for creating a new identity account
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Email address (stored case-insensitively)
    pub email: String,

    /// Argon2id password hash (NOT a plaintext password)
    pub password_hash: String,

    /// Hash of the confirmation token issued at registration
    pub email_verify_token_hash: Option<String>,
}

impl User {
    /// Creates a new identity account
    ///
    /// # Errors
    ///
    /// Returns an error if the email already exists (unique constraint
    /// violation) or the database is unreachable.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, email_verify_token_hash)
            VALUES ($1, $2, $3)
            RETURNING id, email, password_hash, email_verified, email_verified_at,
                      email_verify_token_hash, created_at, updated_at, last_login_at
            "#,
        )
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.email_verify_token_hash)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, email_verified, email_verified_at,
                   email_verify_token_hash, created_at, updated_at, last_login_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by email address (case-insensitive via CITEXT)
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, email_verified, email_verified_at,
                   email_verify_token_hash, created_at, updated_at, last_login_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Confirms the email matching an outstanding confirmation token
    ///
    /// Matches the token hash, flips `email_verified`, stamps
    /// `email_verified_at`, and clears the hash so the token is single-use.
    ///
    /// # Returns
    ///
    /// The updated user if a matching unconfirmed account was found, None
    /// otherwise (unknown or already-consumed token).
    pub async fn confirm_email_by_token_hash(
        pool: &PgPool,
        token_hash: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET email_verified = TRUE,
                email_verified_at = NOW(),
                email_verify_token_hash = NULL,
                updated_at = NOW()
            WHERE email_verify_token_hash = $1 AND email_verified = FALSE
            RETURNING id, email, password_hash, email_verified, email_verified_at,
                      email_verify_token_hash, created_at, updated_at, last_login_at
            "#,
        )
        .bind(token_hash)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Rotates the confirmation token for an unconfirmed account
    ///
    /// # Returns
    ///
    /// True if an unconfirmed account with that email existed and was
    /// updated, false otherwise.
    pub async fn rotate_confirmation_token(
        pool: &PgPool,
        email: &str,
        token_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET email_verify_token_hash = $2, updated_at = NOW()
            WHERE email = $1 AND email_verified = FALSE
            "#,
        )
        .bind(email)
        .bind(token_hash)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Updates the last login timestamp, typically after successful
    /// authentication
    pub async fn update_last_login(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET last_login_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a user by ID
    ///
    /// Cascades to the profile and memberships; invitations the user sent
    /// keep their rows with `invited_by` nulled.
    ///
    /// # Returns
    ///
    /// True if a user was deleted, false if no such user existed.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
