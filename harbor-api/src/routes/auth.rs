/// Account endpoints
///
/// Registration, login, token refresh, and the email-confirmation flow.
/// Confirmation tokens are logged rather than delivered; email delivery is
/// an external concern, and the logged token keeps the flow testable
/// end-to-end.
///
/// # Endpoints
///
/// - `POST /v1/auth/register` - Register a new account
/// - `POST /v1/auth/login` - Login and get tokens
/// - `POST /v1/auth/refresh` - Refresh access token
/// - `POST /v1/auth/confirm-email` - Consume a confirmation token
/// - `POST /v1/auth/resend-confirmation` - Rotate the confirmation token

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Json};
use harbor_shared::{
    auth::{jwt, password, token},
    models::{
        profile::{CreateProfile, Profile},
        user::{CreateUser, User},
    },
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password (validated for strength)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    /// Optional given name
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub first_name: Option<String>,

    /// Optional family name
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub last_name: Option<String>,
}

/// Register response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    /// User ID
    pub user_id: String,

    /// Access token (24h)
    pub access_token: String,

    /// Refresh token (30d)
    pub refresh_token: String,

    /// Whether the email still needs confirmation (always true here)
    pub email_verification_required: bool,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// User ID
    pub user_id: String,

    /// Access token (24h)
    pub access_token: String,

    /// Refresh token (30d)
    pub refresh_token: String,

    /// Whether the email has been confirmed
    pub email_verified: bool,
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token
    pub refresh_token: String,
}

/// Refresh token response
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// New access token (24h)
    pub access_token: String,
}

/// Confirm-email request
#[derive(Debug, Deserialize)]
pub struct ConfirmEmailRequest {
    /// Confirmation token from the link
    pub token: String,
}

/// Resend-confirmation request
#[derive(Debug, Deserialize, Validate)]
pub struct ResendConfirmationRequest {
    /// Email awaiting confirmation
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Generic success response
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    /// Operation outcome
    pub success: bool,
}

/// Register a new account
///
/// Creates the identity account and its profile, issues an
/// email-confirmation token, and returns a token pair. The session is
/// usable immediately, but the session gate holds protected routes until
/// the email is confirmed.
///
/// # Errors
///
/// - `422`: Validation failed
/// - `409 Conflict`: Email already exists
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<RegisterResponse>> {
    req.validate()?;

    password::validate_password_strength(&req.password)
        .map_err(ApiError::BadRequest)?;

    let password_hash = password::hash_password(&req.password)?;

    let (confirmation_token, confirmation_hash) = token::generate_confirmation_token();

    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email.clone(),
            password_hash,
            email_verify_token_hash: Some(confirmation_hash),
        },
    )
    .await?;

    Profile::create(
        &state.db,
        CreateProfile {
            id: user.id,
            email: user.email.clone(),
            first_name: req.first_name,
            last_name: req.last_name,
        },
    )
    .await?;

    // Delivery is out of scope; surface the token for the operator.
    tracing::info!(
        user_id = %user.id,
        email = %user.email,
        token = %confirmation_token,
        "Issued email confirmation token"
    );

    let access_claims = jwt::Claims::new(user.id, jwt::TokenType::Access);
    let refresh_claims = jwt::Claims::new(user.id, jwt::TokenType::Refresh);

    let access_token = jwt::create_token(&access_claims, state.jwt_secret())?;
    let refresh_token = jwt::create_token(&refresh_claims, state.jwt_secret())?;

    Ok(Json(RegisterResponse {
        user_id: user.id.to_string(),
        access_token,
        refresh_token,
        email_verification_required: true,
    }))
}

/// Login
///
/// # Errors
///
/// - `422`: Validation failed
/// - `401 Unauthorized`: Invalid credentials (unknown email and wrong
///   password are indistinguishable)
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    req.validate()?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    User::update_last_login(&state.db, user.id).await?;

    let access_claims = jwt::Claims::new(user.id, jwt::TokenType::Access);
    let refresh_claims = jwt::Claims::new(user.id, jwt::TokenType::Refresh);

    let access_token = jwt::create_token(&access_claims, state.jwt_secret())?;
    let refresh_token = jwt::create_token(&refresh_claims, state.jwt_secret())?;

    Ok(Json(LoginResponse {
        user_id: user.id.to_string(),
        access_token,
        refresh_token,
        email_verified: user.email_verified,
    }))
}

/// Token refresh
///
/// Exchanges a refresh token for a new access token.
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid or expired refresh token
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let access_token = jwt::refresh_access_token(&req.refresh_token, state.jwt_secret())?;

    Ok(Json(RefreshResponse { access_token }))
}

/// Consume an email-confirmation token
///
/// Single-use: the stored hash is cleared on success, so replaying the
/// token fails.
///
/// # Errors
///
/// - `400 Bad Request`: Unknown or already-consumed token
pub async fn confirm_email(
    State(state): State<AppState>,
    Json(req): Json<ConfirmEmailRequest>,
) -> ApiResult<Json<SuccessResponse>> {
    let token_hash = token::hash_token(&req.token);

    let user = User::confirm_email_by_token_hash(&state.db, &token_hash)
        .await?
        .ok_or_else(|| {
            ApiError::BadRequest("Invalid or expired confirmation token".to_string())
        })?;

    tracing::info!(user_id = %user.id, "Email confirmed");

    Ok(Json(SuccessResponse { success: true }))
}

/// Rotate the confirmation token for an unconfirmed account
///
/// Always answers 200, whether or not the email matches an unconfirmed
/// account, so the endpoint can't be used to enumerate accounts.
pub async fn resend_confirmation(
    State(state): State<AppState>,
    Json(req): Json<ResendConfirmationRequest>,
) -> ApiResult<Json<SuccessResponse>> {
    req.validate()?;

    let (confirmation_token, confirmation_hash) = token::generate_confirmation_token();

    let rotated =
        User::rotate_confirmation_token(&state.db, &req.email, &confirmation_hash).await?;

    if rotated {
        tracing::info!(
            email = %req.email,
            token = %confirmation_token,
            "Rotated email confirmation token"
        );
    }

    Ok(Json(SuccessResponse { success: true }))
}
