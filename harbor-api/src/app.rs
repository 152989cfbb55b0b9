/// Application state and router builder
///
/// This module defines the shared application state and builds the Axum
/// router with all routes and middleware.
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                          # Health check (public)
/// └── /v1/                             # API v1 (versioned)
///     ├── /auth/                       # Account endpoints (public)
///     │   ├── POST /register
///     │   ├── POST /login
///     │   ├── POST /refresh
///     │   ├── POST /confirm-email
///     │   └── POST /resend-confirmation
///     ├── /invitations/
///     │   ├── POST /verify             # Public: the token is the credential
///     │   ├── POST /accept             # Gated
///     │   └── POST /reject             # Gated
///     ├── /workspaces/                 # Gated
///     │   ├── GET  /
///     │   ├── POST /
///     │   └── POST /:id/invitations
///     ├── /onboarding/                 # Gated
///     │   ├── GET  /
///     │   └── POST /complete
///     └── /admin/                      # Gated + admin checks in handlers
///         ├── GET    /workspaces
///         └── DELETE /users/:id
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Request tracing (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer, origins from config)
/// 3. Security headers
/// 4. Session gate (per-route-group)

use crate::{config::Config, middleware::security::SecurityHeadersLayer};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, post},
    Router,
};
use harbor_shared::invitations::InvitationService;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor; uses Arc
/// internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Invitation lifecycle service
    pub invitations: InvitationService,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        let invitations = InvitationService::new(db.clone());
        Self {
            db,
            config: Arc::new(config),
            invitations,
        }
    }

    /// Gets the database pool
    pub fn db(&self) -> &PgPool {
        &self.db
    }

    /// Gets the JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    use crate::middleware::session::session_gate;
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Account routes (public)
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh))
        .route("/confirm-email", post(routes::auth::confirm_email))
        .route(
            "/resend-confirmation",
            post(routes::auth::resend_confirmation),
        );

    // Invitation verification is public: the opaque token is the credential,
    // and the visitor may not have an account yet.
    let invitation_public_routes =
        Router::new().route("/verify", post(routes::invitations::verify));

    // Everything below runs behind the session gate.
    let invitation_routes = Router::new()
        .route("/accept", post(routes::invitations::accept))
        .route("/reject", post(routes::invitations::reject));

    let workspace_routes = Router::new()
        .route(
            "/",
            get(routes::workspaces::list).post(routes::workspaces::create),
        )
        .route("/:id/invitations", post(routes::workspaces::invite));

    let onboarding_routes = Router::new()
        .route("/", get(routes::onboarding::decision))
        .route("/complete", post(routes::onboarding::complete));

    let admin_routes = Router::new()
        .route("/workspaces", get(routes::workspaces::admin_list))
        .route("/users/:id", delete(routes::admin::delete_user));

    let gated_routes = Router::new()
        .nest("/invitations", invitation_routes)
        .nest("/workspaces", workspace_routes)
        .nest("/onboarding", onboarding_routes)
        .nest("/admin", admin_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_gate,
        ));

    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/invitations", invitation_public_routes)
        .merge(gated_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        // Production mode: configured origins only
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}
