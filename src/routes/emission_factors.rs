// SPDX-License-Identifier: MIT

//! Region emission factor CRUD routes.

use crate::error::{AppError, Result};
use crate::models::RegionFactors;
use crate::routes::validate_payload;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/emission-factors", post(add_factors))
        .route("/emission-factors", get(list_factors))
        .route("/emission-factors/{country}", put(update_factors))
        .route("/emission-factors/{country}", delete(delete_factors))
}

/// Add the factor table for a country.
async fn add_factors(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegionFactors>,
) -> Result<(StatusCode, Json<RegionFactors>)> {
    validate_payload(&payload)?;
    state.db.upsert_region_factors(&payload).await?;
    tracing::info!(country = %payload.country, states = payload.states.len(), "Emission factors added");
    Ok((StatusCode::CREATED, Json(payload)))
}

/// List all countries' factor tables.
async fn list_factors(State(state): State<Arc<AppState>>) -> Result<Json<Vec<RegionFactors>>> {
    Ok(Json(state.db.list_region_factors().await?))
}

/// Replace the factor table for an existing country.
async fn update_factors(
    State(state): State<Arc<AppState>>,
    Path(country): Path<String>,
    Json(mut payload): Json<RegionFactors>,
) -> Result<Json<RegionFactors>> {
    validate_payload(&payload)?;

    if state.db.get_region_factors(&country).await?.is_none() {
        return Err(AppError::NotFound(format!(
            "Emission factor not found for {}",
            country
        )));
    }

    // The path decides which document is replaced
    payload.country = country;
    state.db.upsert_region_factors(&payload).await?;
    Ok(Json(payload))
}

#[derive(Serialize)]
pub struct DeleteFactorsResponse {
    pub message: String,
}

/// Delete a country's factor table.
async fn delete_factors(
    State(state): State<Arc<AppState>>,
    Path(country): Path<String>,
) -> Result<Json<DeleteFactorsResponse>> {
    if state.db.get_region_factors(&country).await?.is_none() {
        return Err(AppError::NotFound(format!(
            "Emission factor not found for {}",
            country
        )));
    }

    state.db.delete_region_factors(&country).await?;
    Ok(Json(DeleteFactorsResponse {
        message: "Emission factor deleted".to_string(),
    }))
}
