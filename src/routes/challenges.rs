// SPDX-License-Identifier: MIT

//! Eco-challenge catalog and completion routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::challenge::ChallengeCadence;
use crate::models::{ChallengeCompletion, CompletionStatus, EcoChallenge};
use crate::routes::validate_payload;
use crate::services::upload::{self, MAX_IMAGES_PER_SUBMISSION};
use crate::AppState;
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    routing::{delete, get, patch, post, put},
    Extension, Json, Router,
};
use futures_util::{stream, StreamExt, TryStreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Catalog routes (readable and editable without a session, as the
/// catalog is managed by the operator frontend).
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/challenges", post(add_challenge))
        .route("/challenges/{cadence}", get(list_challenges))
        .route("/challenges/id/{id}", get(get_challenge))
        .route("/challenges/id/{id}", put(update_challenge))
        .route("/challenges/id/{id}", delete(delete_challenge))
        .route("/challenges/id/{id}/image", post(set_challenge_image))
}

/// Completion routes (require a session).
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/challenges/completions", post(submit_completion))
        .route(
            "/challenges/completions/{id}/status",
            patch(update_completion_status),
        )
        .route(
            "/challenges/completions/user/{user_id}",
            get(completions_by_user),
        )
        .route(
            "/challenges/completions/user/{user_id}/challenge/{challenge_id}",
            get(completions_by_user_and_challenge),
        )
        .route(
            "/challenges/completions/user/{user_id}/stats",
            get(completion_stats),
        )
}

// ─── Catalog ─────────────────────────────────────────────────

/// Add a new challenge.
async fn add_challenge(
    State(state): State<Arc<AppState>>,
    Json(mut payload): Json<EcoChallenge>,
) -> Result<(StatusCode, Json<EcoChallenge>)> {
    validate_payload(&payload)?;

    payload.challenge_id = state.db.next_sequence("challenges").await?;
    state.db.upsert_challenge(&payload).await?;

    tracing::info!(
        challenge_id = payload.challenge_id,
        name = %payload.name,
        "Challenge added"
    );
    Ok((StatusCode::CREATED, Json(payload)))
}

/// List challenges in a rotation (`week` or `month`).
async fn list_challenges(
    State(state): State<Arc<AppState>>,
    Path(cadence): Path<String>,
) -> Result<Json<Vec<EcoChallenge>>> {
    let cadence = ChallengeCadence::parse(&cadence)
        .ok_or_else(|| AppError::BadRequest("Cadence must be 'week' or 'month'".to_string()))?;
    Ok(Json(state.db.list_challenges(cadence).await?))
}

/// Get a challenge by ID.
async fn get_challenge(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<EcoChallenge>> {
    state
        .db
        .get_challenge(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Challenge not found".to_string()))
}

/// Replace a challenge by ID.
async fn update_challenge(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(mut payload): Json<EcoChallenge>,
) -> Result<Json<EcoChallenge>> {
    validate_payload(&payload)?;

    if state.db.get_challenge(id).await?.is_none() {
        return Err(AppError::NotFound("Challenge not found".to_string()));
    }

    payload.challenge_id = id;
    state.db.upsert_challenge(&payload).await?;
    Ok(Json(payload))
}

/// Upload the illustration image for a challenge.
///
/// Multipart form with a single `image` file. Replaces any previous
/// illustration path on the challenge.
async fn set_challenge_image(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    mut multipart: Multipart,
) -> Result<Json<EcoChallenge>> {
    let mut challenge = state
        .db
        .get_challenge(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Challenge not found".to_string()))?;

    let mut image: Option<String> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() == Some("image") {
            let original_name = field.file_name().unwrap_or("illustration").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Invalid image upload: {}", e)))?;
            image =
                Some(upload::save_image(&state.config.upload_dir, &original_name, 0, &data).await?);
        }
    }

    challenge.image =
        Some(image.ok_or_else(|| AppError::Validation("image file is required".to_string()))?);
    state.db.upsert_challenge(&challenge).await?;
    Ok(Json(challenge))
}

#[derive(Serialize)]
pub struct DeleteChallengeResponse {
    pub message: String,
}

/// Delete a challenge by ID.
async fn delete_challenge(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<DeleteChallengeResponse>> {
    if state.db.get_challenge(id).await?.is_none() {
        return Err(AppError::NotFound("Challenge not found".to_string()));
    }

    state.db.delete_challenge(id).await?;
    Ok(Json(DeleteChallengeResponse {
        message: "Challenge deleted successfully".to_string(),
    }))
}

// ─── Completions ─────────────────────────────────────────────

/// Submit a photo-proof completion for a challenge.
///
/// Multipart form: `challenge_id` and `description` text fields plus up
/// to 11 `images` files. A new pending record is created even if an
/// earlier submission for this challenge was declined.
async fn submit_completion(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ChallengeCompletion>)> {
    let mut challenge_id: Option<u64> = None;
    let mut description: Option<String> = None;
    let mut uploads: Vec<(String, axum::body::Bytes)> = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        match field.name() {
            Some("challenge_id") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Invalid challenge_id: {}", e)))?;
                challenge_id = Some(text.parse().map_err(|_| {
                    AppError::BadRequest("challenge_id must be a number".to_string())
                })?);
            }
            Some("description") => {
                description = Some(field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Invalid description: {}", e))
                })?);
            }
            Some("images") => {
                if uploads.len() >= MAX_IMAGES_PER_SUBMISSION {
                    return Err(AppError::BadRequest(format!(
                        "At most {} images per submission",
                        MAX_IMAGES_PER_SUBMISSION
                    )));
                }
                let original_name = field.file_name().unwrap_or("proof").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Invalid image upload: {}", e)))?;
                uploads.push((original_name, data));
            }
            _ => {} // Unknown fields are ignored
        }
    }

    let challenge_id = challenge_id
        .ok_or_else(|| AppError::Validation("challenge_id is required".to_string()))?;
    let description = description
        .filter(|d| !d.is_empty())
        .ok_or_else(|| AppError::Validation("description is required".to_string()))?;

    let challenge = state
        .db
        .get_challenge(challenge_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Challenge not found".to_string()))?;

    if uploads.len() < challenge.required_images as usize {
        return Err(AppError::Validation(format!(
            "Challenge requires at least {} proof image(s)",
            challenge.required_images
        )));
    }

    // Nothing touches the disk until the submission is known to be
    // valid; the writes themselves run a few at a time
    let upload_dir = &state.config.upload_dir;
    let images: Vec<String> = stream::iter(uploads.into_iter().enumerate())
        .map(|(index, (original_name, data))| async move {
            upload::save_image(upload_dir, &original_name, index, &data).await
        })
        .buffered(4)
        .try_collect()
        .await?;

    let completion = ChallengeCompletion {
        completion_id: state.db.next_sequence("challenge_completions").await?,
        challenge_id,
        user_id: auth.user_id,
        images,
        description,
        status: CompletionStatus::Pending,
        points_achieved: challenge.points,
        carbon_saving: challenge.carbon_saving.clone(),
        submitted_at: chrono::Utc::now().to_rfc3339(),
    };

    state.db.insert_completion(&completion).await?;

    tracing::info!(
        completion_id = completion.completion_id,
        challenge_id,
        user_id = auth.user_id,
        "Challenge completion submitted"
    );
    Ok((StatusCode::CREATED, Json(completion)))
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    /// `success` or `declined`
    pub status: String,
}

/// Approve or decline a pending completion.
///
/// Approval credits the snapshotted points to the submitting user;
/// the transition is only legal from `pending`.
async fn update_completion_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<ChallengeCompletion>> {
    let status = CompletionStatus::parse(&payload.status)
        .filter(|s| *s != CompletionStatus::Pending)
        .ok_or_else(|| {
            AppError::BadRequest("Status must be 'success' or 'declined'".to_string())
        })?;

    let completion = state.db.resolve_completion(id, status).await?;
    Ok(Json(completion))
}

/// All completions submitted by a user.
async fn completions_by_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<u64>,
) -> Result<Json<Vec<ChallengeCompletion>>> {
    let completions = state.db.completions_for_user(user_id).await?;
    if completions.is_empty() {
        return Err(AppError::NotFound(
            "No challenge completions found for this user".to_string(),
        ));
    }
    Ok(Json(completions))
}

/// Completions by a user for one challenge.
async fn completions_by_user_and_challenge(
    State(state): State<Arc<AppState>>,
    Path((user_id, challenge_id)): Path<(u64, u64)>,
) -> Result<Json<Vec<ChallengeCompletion>>> {
    let completions = state
        .db
        .completions_for_user_and_challenge(user_id, challenge_id)
        .await?;
    if completions.is_empty() {
        return Err(AppError::NotFound(
            "No challenge completions found for this user with the specified challenge".to_string(),
        ));
    }
    Ok(Json(completions))
}

/// Per-status counts for a user's submissions.
#[derive(Serialize)]
pub struct CompletionStatsResponse {
    pub pending: u32,
    pub success: u32,
    pub declined: u32,
    /// Points actually credited (approved submissions only)
    pub points_earned: u64,
}

async fn completion_stats(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<u64>,
) -> Result<Json<CompletionStatsResponse>> {
    let completions = state.db.completions_for_user(user_id).await?;

    let mut stats = CompletionStatsResponse {
        pending: 0,
        success: 0,
        declined: 0,
        points_earned: 0,
    };
    for completion in &completions {
        match completion.status {
            CompletionStatus::Pending => stats.pending += 1,
            CompletionStatus::Success => {
                stats.success += 1;
                stats.points_earned += completion.points_achieved;
            }
            CompletionStatus::Declined => stats.declined += 1,
        }
    }

    Ok(Json(stats))
}
