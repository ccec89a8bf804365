// SPDX-License-Identifier: MIT

//! User registration, login and profile routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_jwt, AuthUser};
use crate::models::user::{Address, CarbonProfile, User};
use crate::models::Badge;
use crate::routes::validate_payload;
use crate::services::{badges_for, password};
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{delete, get, patch, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

/// Routes open without a session (registration and login).
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users/register", post(register))
        .route("/users/login", post(login))
}

/// Routes that require a valid session.
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users/me", get(get_me))
        .route("/users/me/badges", get(get_my_badges))
        .route("/users/change-password", post(change_password))
        .route("/users", get(list_users))
        .route("/users/{username}", get(get_by_username))
        .route("/users/{username}", patch(edit_profile))
        .route("/users/{username}", delete(delete_by_username))
}

// ─── Responses ───────────────────────────────────────────────

/// User profile as returned by the API. Never carries the password hash.
#[derive(Serialize)]
pub struct UserResponse {
    pub user_id: u64,
    pub username: String,
    pub email: String,
    pub mobile_number: Option<String>,
    pub profile_image: Option<String>,
    pub date_of_birth: Option<String>,
    pub address: Option<Address>,
    pub carbon_profile: Option<CarbonProfile>,
    pub footprint_history: Vec<crate::models::MonthlyTotal>,
    pub total_points: u64,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            username: user.username,
            email: user.email,
            mobile_number: user.mobile_number,
            profile_image: user.profile_image,
            date_of_birth: user.date_of_birth,
            address: user.address,
            carbon_profile: user.carbon_profile,
            footprint_history: user.footprint_history,
            total_points: user.total_points,
            created_at: user.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

// ─── Registration & Login ────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 64))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    #[serde(default)]
    pub mobile_number: Option<String>,
}

/// Register a new user.
///
/// If a calculator footprint exists for the same email or mobile number,
/// it is adopted into the new profile as the starting carbon summary.
async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>> {
    validate_payload(&payload)?;

    if state
        .db
        .find_user_by_username(&payload.username)
        .await?
        .is_some()
    {
        return Err(AppError::BadRequest("Username already taken".to_string()));
    }
    if state.db.find_user_by_email(&payload.email).await?.is_some() {
        return Err(AppError::BadRequest("Email already in use".to_string()));
    }

    // Adopt an existing calculator footprint, matched by email first
    let mut existing_footprint = state.db.find_footprint_by_email(&payload.email).await?;
    if existing_footprint.is_none() {
        if let Some(mobile) = payload.mobile_number.as_deref() {
            existing_footprint = state.db.find_footprint_by_mobile(mobile).await?;
        }
    }

    let carbon_profile = existing_footprint.map(|fp| CarbonProfile {
        total_co2_emissions: fp.total_carbon_footprint,
        vehicles: fp.vehicles,
        electricity_usage: fp.electricity_usage,
        calculated_from: Some(fp.start_date),
        country: fp.country,
        state: fp.state,
    });

    let user_id = state.db.next_sequence("users").await?;
    let user = User {
        user_id,
        username: payload.username,
        email: payload.email,
        password_hash: password::hash_password(&payload.password)?,
        mobile_number: payload.mobile_number,
        profile_image: None,
        date_of_birth: None,
        address: None,
        carbon_profile,
        footprint_history: Vec::new(),
        total_points: 0,
        created_at: chrono::Utc::now().to_rfc3339(),
    };

    state.db.upsert_user(&user).await?;

    tracing::info!(user_id, username = %user.username, "User registered");

    let token = create_jwt(user_id, &state.config.jwt_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Log in with email and password.
async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let user = state.db.find_user_by_email(&payload.email).await?;

    // Same error for unknown email and wrong password
    let user = match user {
        Some(user) if password::verify_password(&payload.password, &user.password_hash) => user,
        _ => return Err(AppError::BadRequest("Invalid credentials".to_string())),
    };

    let token = create_jwt(user.user_id, &state.config.jwt_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    Ok(Json(AuthResponse {
        token,
        user: user.into(),
    }))
}

// ─── Profile ─────────────────────────────────────────────────

/// Get the authenticated user's profile.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<UserResponse>> {
    let user = state
        .db
        .get_user(auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", auth.user_id)))?;
    Ok(Json(user.into()))
}

/// Badges earned from the authenticated user's running point total.
#[derive(Serialize)]
pub struct BadgesResponse {
    pub total_points: u64,
    pub badges: Vec<Badge>,
}

async fn get_my_badges(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<BadgesResponse>> {
    let user = state
        .db
        .get_user(auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", auth.user_id)))?;

    Ok(Json(BadgesResponse {
        total_points: user.total_points,
        badges: badges_for(user.total_points),
    }))
}

/// List all users.
async fn list_users(State(state): State<Arc<AppState>>) -> Result<Json<Vec<UserResponse>>> {
    let users = state.db.list_users().await?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}

/// Get a user by username.
async fn get_by_username(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<UserResponse>> {
    let user = state
        .db
        .find_user_by_username(&username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User '{}' not found", username)))?;
    Ok(Json(user.into()))
}

#[derive(Deserialize)]
pub struct EditProfileRequest {
    #[serde(default)]
    pub new_username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub profile_image: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub address: Option<Address>,
}

/// Edit a user's profile fields. Username and email changes re-check
/// uniqueness before being applied.
async fn edit_profile(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
    Json(payload): Json<EditProfileRequest>,
) -> Result<Json<UserResponse>> {
    let mut user = state
        .db
        .find_user_by_username(&username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User '{}' not found", username)))?;

    if let Some(new_username) = payload.new_username {
        if new_username != user.username {
            if state
                .db
                .find_user_by_username(&new_username)
                .await?
                .is_some()
            {
                return Err(AppError::BadRequest("Username already taken".to_string()));
            }
            user.username = new_username;
        }
    }

    if let Some(email) = payload.email {
        if email != user.email {
            if state.db.find_user_by_email(&email).await?.is_some() {
                return Err(AppError::BadRequest("Email already in use".to_string()));
            }
            user.email = email;
        }
    }

    if let Some(image) = payload.profile_image {
        user.profile_image = Some(image);
    }
    if let Some(dob) = payload.date_of_birth {
        crate::time_utils::parse_date_dmy(&dob)?;
        user.date_of_birth = Some(dob);
    }
    if let Some(address) = payload.address {
        user.address = Some(address);
    }

    state.db.upsert_user(&user).await?;
    Ok(Json(user.into()))
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub success: bool,
    pub message: String,
}

/// Delete a user by username.
async fn delete_by_username(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<StatusResponse>> {
    let user = state
        .db
        .find_user_by_username(&username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User '{}' not found", username)))?;

    state.db.delete_user(user.user_id).await?;
    tracing::info!(user_id = user.user_id, username = %username, "User deleted");

    Ok(Json(StatusResponse {
        success: true,
        message: "User deleted successfully".to_string(),
    }))
}

#[derive(Deserialize, Validate)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    #[validate(length(min = 8))]
    pub new_password: String,
}

/// Change the authenticated user's password.
async fn change_password(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<StatusResponse>> {
    validate_payload(&payload)?;

    let mut user = state
        .db
        .get_user(auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", auth.user_id)))?;

    if !password::verify_password(&payload.current_password, &user.password_hash) {
        return Err(AppError::BadRequest(
            "Current password is incorrect".to_string(),
        ));
    }

    user.password_hash = password::hash_password(&payload.new_password)?;
    state.db.upsert_user(&user).await?;

    Ok(Json(StatusResponse {
        success: true,
        message: "Password changed successfully".to_string(),
    }))
}
