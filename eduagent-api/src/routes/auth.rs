/// Authentication and account endpoints
///
/// # Endpoints
///
/// - `POST /api/auth/signup` - Create an account and get a session token
/// - `POST /api/auth/login` - Exchange credentials for a session token
/// - `GET /api/auth/me` - Current user's profile
/// - `PATCH /api/auth/me` - Update username or learning preferences
///
/// Sessions are a single signed token (30 days by default); there is no
/// refresh flow.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{extract::State, Extension, Json};
use eduagent_shared::{
    auth::{middleware::AuthContext, password},
    models::user::{CreateUser, Preferences, UpdateUser, User, UserStats},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Signup request
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 3, max = 64, message = "Username must be 3-64 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Checked against the password policy separately
    pub password: String,

    #[serde(default)]
    pub preferences: Option<Preferences>,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub password: String,
}

/// Profile update request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 3, max = 64, message = "Username must be 3-64 characters"))]
    pub username: Option<String>,

    pub preferences: Option<Preferences>,
}

impl SignupRequest {
    /// Trims the username to the form it is stored in, so length checks see
    /// the stored value
    fn normalize(&mut self) {
        self.username = self.username.trim().to_string();
    }
}

impl UpdateProfileRequest {
    fn normalize(&mut self) {
        if let Some(username) = self.username.as_mut() {
            *username = username.trim().to_string();
        }
    }
}

/// User fields returned with a session token
#[derive(Debug, Serialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub stats: UserStats,
}

impl From<User> for SessionUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            stats: user.stats.0,
        }
    }
}

/// Signup and login response
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub user: SessionUser,
}

fn invalid_credentials() -> ApiError {
    ApiError::Unauthorized("Invalid email or password".to_string())
}

/// Register a new user
///
/// ```text
/// POST /api/auth/signup
///
/// {
///   "username": "ada",
///   "email": "ada@example.com",
///   "password": "correct horse battery",
///   "preferences": { "learningStyle": "auditory", "interests": ["ml"] }
/// }
/// ```
///
/// # Errors
///
/// - `409 Conflict`: Email or username already registered
/// - `422 Unprocessable Entity`: Validation failed
pub async fn signup(
    State(state): State<AppState>,
    Json(mut req): Json<SignupRequest>,
) -> ApiResult<Json<SessionResponse>> {
    req.normalize();
    req.validate()?;

    password::validate_password(&req.password).map_err(|message| {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "password".to_string(),
            message,
        }])
    })?;

    if User::exists(&state.db, &req.email, &req.username).await? {
        return Err(ApiError::Conflict("User already exists".to_string()));
    }

    let password_hash = password::hash_password(&req.password)?;

    // A concurrent signup can still race past the check; the unique
    // constraints turn that into a 409 as well.
    let user = User::create(
        &state.db,
        CreateUser {
            username: req.username,
            email: req.email,
            password_hash,
            preferences: req.preferences.unwrap_or_default(),
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, "User registered");

    let token = state.issue_token(user.id, &user.username)?;
    Ok(Json(SessionResponse {
        token,
        user: user.into(),
    }))
}

/// Log in with email and password
///
/// Unknown email and wrong password produce the same 401.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<SessionResponse>> {
    req.validate()?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(invalid_credentials)?;

    if !password::verify_password(&req.password, &user.password_hash)? {
        tracing::info!(user_id = %user.id, "Rejected login with wrong password");
        return Err(invalid_credentials());
    }

    let token = state.issue_token(user.id, &user.username)?;
    Ok(Json(SessionResponse {
        token,
        user: user.into(),
    }))
}

/// Current user's full profile
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<User>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// Update username and/or preferences
///
/// Tokens keep the username they were issued with until the next login.
pub async fn update_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(mut req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<User>> {
    req.normalize();
    req.validate()?;

    let user = User::update(
        &state.db,
        auth.user_id,
        UpdateUser {
            username: req.username,
            preferences: req.preferences,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}
