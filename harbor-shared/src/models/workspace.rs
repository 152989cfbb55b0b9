/// Workspace model and database operations
///
/// A workspace is the tenant/team container users join through invitations.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE workspaces (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(100) NOT NULL,
///     slug VARCHAR(120) NOT NULL UNIQUE,
///     created_by UUID REFERENCES users(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Workspace record
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Workspace {
    /// Unique workspace ID (UUID v4)
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// URL-safe unique identifier derived from the name
    pub slug: String,

    /// User who created the workspace (None if since deleted)
    pub created_by: Option<Uuid>,

    /// When the workspace was created
    pub created_at: DateTime<Utc>,
}

/// The listing shape returned to clients: `{ id, name, slug }`
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct WorkspaceSummary {
    /// Workspace ID
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// URL-safe identifier
    pub slug: String,
}

/// Input for creating a workspace
#[derive(Debug, Clone)]
pub struct CreateWorkspace {
    /// Display name; the slug is derived from it
    pub name: String,

    /// Creating user
    pub created_by: Uuid,
}

/// Derives a URL-safe slug from a workspace name
pub fn to_slug(val: &str) -> String {
    val.to_lowercase()
        .replace(|c: char| !c.is_alphanumeric() && c != ' ', "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

impl Workspace {
    /// Creates a workspace
    ///
    /// The slug is derived from the name; if it is already taken, a short
    /// random suffix is appended and the insert retried once.
    ///
    /// # Errors
    ///
    /// Returns an error if both slug candidates collide or the database is
    /// unreachable.
    pub async fn create(pool: &PgPool, data: CreateWorkspace) -> Result<Self, sqlx::Error> {
        let slug = to_slug(&data.name);

        match Self::insert(pool, &data, &slug).await {
            Ok(workspace) => Ok(workspace),
            Err(e) if is_unique_violation(&e) => {
                let suffixed = format!("{}-{}", slug, random_suffix());
                Self::insert(pool, &data, &suffixed).await
            }
            Err(e) => Err(e),
        }
    }

    async fn insert(
        pool: &PgPool,
        data: &CreateWorkspace,
        slug: &str,
    ) -> Result<Self, sqlx::Error> {
        let workspace = sqlx::query_as::<_, Workspace>(
            r#"
            INSERT INTO workspaces (name, slug, created_by)
            VALUES ($1, $2, $3)
            RETURNING id, name, slug, created_by, created_at
            "#,
        )
        .bind(&data.name)
        .bind(slug)
        .bind(data.created_by)
        .fetch_one(pool)
        .await?;

        Ok(workspace)
    }

    /// Finds a workspace by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let workspace = sqlx::query_as::<_, Workspace>(
            r#"
            SELECT id, name, slug, created_by, created_at
            FROM workspaces
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(workspace)
    }

    /// Lists the workspaces a user is a member of
    ///
    /// Backs `GET /v1/workspaces`; ordered by when the user joined.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: Uuid,
    ) -> Result<Vec<WorkspaceSummary>, sqlx::Error> {
        let workspaces = sqlx::query_as::<_, WorkspaceSummary>(
            r#"
            SELECT w.id, w.name, w.slug
            FROM workspaces w
            JOIN workspace_members m ON m.workspace_id = w.id
            WHERE m.user_id = $1
            ORDER BY m.created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(workspaces)
    }

    /// Lists every workspace (superadmin listing)
    pub async fn list_all(pool: &PgPool) -> Result<Vec<WorkspaceSummary>, sqlx::Error> {
        let workspaces = sqlx::query_as::<_, WorkspaceSummary>(
            r#"
            SELECT id, name, slug
            FROM workspaces
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(workspaces)
    }

    /// Deletes a workspace (cascades memberships and invitations)
    ///
    /// # Returns
    ///
    /// True if a workspace was deleted, false if none existed.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM workspaces WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Checks whether a sqlx error is a unique-constraint violation
fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some("23505"),
        _ => false,
    }
}

fn random_suffix() -> String {
    const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();

    (0..4)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_slug() {
        assert_eq!(to_slug("Acme Marketing"), "acme-marketing");
        assert_eq!(to_slug("  Spaced   Out  "), "spaced-out");
        assert_eq!(to_slug("Weird!@# Chars"), "weird-chars");
        assert_eq!(to_slug("already-lower"), "alreadylower");
    }

    #[test]
    fn test_random_suffix_shape() {
        let s = random_suffix();
        assert_eq!(s.len(), 4);
        assert!(s.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }
}
