/// Common test utilities for integration tests
///
/// Shared infrastructure for driving the full router against a real
/// database:
/// - Test database setup (migrations run on first connect)
/// - Test user/profile creation with known tokens
/// - JWT generation
/// - Request/response helpers

use axum::body::Body;
use axum::http::{Request, Response};
use harbor_api::app::{build_router, AppState};
use harbor_api::config::Config;
use harbor_shared::auth::jwt::{create_token, Claims, TokenType};
use harbor_shared::auth::token::hash_token;
use harbor_shared::models::profile::{CreateProfile, Profile};
use harbor_shared::models::user::{CreateUser, User};
use sqlx::PgPool;
use tower::Service as _;
use uuid::Uuid;

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
}

impl TestContext {
    /// Creates a new test context against the configured database
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db = PgPool::connect(&config.database.url).await?;

        // Run migrations (path relative to Cargo.toml, not this file)
        sqlx::migrate!("../migrations").run(&db).await?;

        let state = AppState::new(db.clone(), config.clone());
        let app = build_router(state);

        Ok(TestContext { db, app, config })
    }

    /// Creates an identity account plus profile and returns it with a
    /// bearer token
    ///
    /// The email gets a random local part so tests don't collide.
    pub async fn create_user(&self, verified: bool) -> anyhow::Result<TestUser> {
        self.create_user_with_email(&format!("test-{}@example.com", Uuid::new_v4()), verified)
            .await
    }

    /// Creates an identity account plus profile for a specific email
    pub async fn create_user_with_email(
        &self,
        email: &str,
        verified: bool,
    ) -> anyhow::Result<TestUser> {
        let user = User::create(
            &self.db,
            CreateUser {
                email: email.to_string(),
                password_hash: "$argon2id$test-hash-not-used".to_string(),
                email_verify_token_hash: None,
            },
        )
        .await?;

        if verified {
            sqlx::query(
                "UPDATE users SET email_verified = TRUE, email_verified_at = NOW() WHERE id = $1",
            )
            .bind(user.id)
            .execute(&self.db)
            .await?;
        }

        Profile::create(
            &self.db,
            CreateProfile {
                id: user.id,
                email: user.email.clone(),
                first_name: None,
                last_name: None,
            },
        )
        .await?;

        let claims = Claims::new(user.id, TokenType::Access);
        let token = create_token(&claims, &self.config.jwt.secret)?;

        Ok(TestUser {
            id: user.id,
            email: user.email,
            token,
        })
    }

    /// Plants a known email-confirmation token for an unverified account
    pub async fn plant_confirmation_token(
        &self,
        email: &str,
        plaintext: &str,
    ) -> anyhow::Result<()> {
        let updated =
            User::rotate_confirmation_token(&self.db, email, &hash_token(plaintext)).await?;
        anyhow::ensure!(updated, "no unverified account for {}", email);
        Ok(())
    }

    /// Grants admin/superadmin flags on a profile
    pub async fn grant_admin(&self, user_id: Uuid, superadmin: bool) -> anyhow::Result<()> {
        sqlx::query("UPDATE profiles SET is_admin = TRUE, is_superadmin = $2 WHERE id = $1")
            .bind(user_id)
            .bind(superadmin)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    /// Sends a JSON request through the router
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        bearer: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = bearer {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.app.clone().call(request).await.unwrap()
    }

    /// Deletes test users (cascades profiles and memberships)
    pub async fn cleanup_users(&self, user_ids: &[Uuid]) -> anyhow::Result<()> {
        for id in user_ids {
            User::delete(&self.db, *id).await?;
        }
        Ok(())
    }
}

/// A created test account
pub struct TestUser {
    pub id: Uuid,
    pub email: String,
    pub token: String,
}

/// Reads a response body as JSON
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
