/// Authentication endpoints
///
/// - `POST /v1/register` - Create an account and receive a token
/// - `POST /v1/login` - Exchange credentials for a token
/// - `GET /v1/user` - Current user (bearer)
/// - `POST /v1/logout` - Revoke the current token (bearer)
///
/// Logging in revokes every token the user held before, so a user has one
/// live session after each login.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, EMAIL_TAKEN},
    extract::ValidatedJson,
    routes::MessageResponse,
};
use axum::{extract::State, http::StatusCode, Extension, Json};
use kanban_shared::{
    auth::{
        middleware::AuthContext,
        password,
        token::{issue_token, rotate_tokens},
    },
    models::{
        access_token::AccessToken,
        user::{normalize_email, CreateUser, User},
    },
};
use serde::{Deserialize, Serialize};
use validator::Validate;

const BAD_CREDENTIALS: &str = "Incorrect login details";

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name
    #[serde(default)]
    #[validate(length(
        min = 1,
        max = 255,
        message = "The name field is required and may not be greater than 255 characters."
    ))]
    pub name: String,

    /// Email address, stored lower-cased
    #[serde(default)]
    #[validate(
        email(message = "The email must be a valid email address."),
        length(max = 255, message = "The email may not be greater than 255 characters.")
    )]
    pub email: String,

    /// Password, at least 8 characters
    #[serde(default)]
    #[validate(
        length(min = 8, message = "The password must be at least 8 characters."),
        must_match(
            other = "password_confirmation",
            message = "The password confirmation does not match."
        )
    )]
    pub password: String,

    #[serde(default)]
    pub password_confirmation: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(email(message = "The email must be a valid email address."))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 1, message = "The password field is required."))]
    pub password: String,
}

/// Returned by register and login
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: User,

    /// Bearer token for subsequent requests
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: User,
}

/// Register a new user
///
/// ```text
/// POST /v1/register
///
/// {
///   "name": "Ada",
///   "email": "ada@example.com",
///   "password": "correct horse",
///   "password_confirmation": "correct horse"
/// }
/// ```
///
/// # Errors
///
/// - `422`: Validation failed or the email is taken
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let email = normalize_email(&req.email);

    if User::email_exists(&state.db, &email).await? {
        return Err(ApiError::validation("email", EMAIL_TAKEN));
    }

    let password_hash = password::hash_password(&req.password)?;

    // The unique constraint still catches a concurrent registration
    let user = User::create(
        &state.db,
        CreateUser {
            name: req.name.trim().to_string(),
            email,
            password_hash,
        },
    )
    .await?;

    let issued = issue_token(&state.db, user.id, state.jwt_secret(), state.token_ttl()).await?;

    tracing::info!(user_id = user.id, "Registered user");

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user,
            token: issued.token,
        }),
    ))
}

/// Log in with email and password
///
/// # Errors
///
/// - `401`: Unknown email or wrong password (same message for both)
/// - `422`: Validation failed
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let email = normalize_email(&req.email);

    let Some(user) = User::find_by_email(&state.db, &email).await? else {
        tracing::warn!("Login attempt for unknown email");
        return Err(ApiError::Unauthorized(BAD_CREDENTIALS.to_string()));
    };

    if !password::verify_password(&req.password, &user.password_hash)? {
        tracing::warn!(user_id = user.id, "Login attempt with wrong password");
        return Err(ApiError::Unauthorized(BAD_CREDENTIALS.to_string()));
    }

    let issued = rotate_tokens(&state.db, user.id, state.jwt_secret(), state.token_ttl()).await?;

    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(AuthResponse {
        user,
        token: issued.token,
    }))
}

/// Current user
pub async fn current_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<UserResponse>> {
    // Tokens cascade with their user, so this only races a concurrent delete
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User no longer exists".to_string()))?;

    Ok(Json(UserResponse { user }))
}

/// Revoke the token used for this request
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<MessageResponse>> {
    AccessToken::revoke(&state.db, auth.token_id).await?;

    tracing::info!(user_id = auth.user_id, token_id = %auth.token_id, "User logged out");

    Ok(Json(MessageResponse::new("Logged out")))
}
