// SPDX-License-Identifier: MIT

//! Footprint calculator and monthly snapshot routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{
    FlightClass, FlightUsage, FootprintSnapshot, FuelType, MonthlySnapshot, VehicleUsage,
};
use crate::models::user::MonthlyTotal;
use crate::routes::validate_payload;
use crate::services::emissions::{
    aggregate_footprint, compute_electricity_emissions, compute_flight_emissions,
    compute_vehicle_emissions,
};
use crate::services::footprint::{build_snapshot, footprint_id, ElapsedPeriod, SnapshotInput};
use crate::time_utils::{add_one_month, format_date_dmy, month_key, parse_date_dmy};
use crate::AppState;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

/// Public calculator endpoint (no registration required).
pub fn public_routes() -> Router<Arc<AppState>> {
    Router::new().route("/footprints", post(create_footprint))
}

/// Monthly snapshot endpoints for registered users.
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/footprints/monthly", post(create_monthly_snapshot))
        .route("/footprints/monthly", get(get_monthly_snapshot))
        .route("/footprints/monthly/history", get(get_monthly_history))
        .route("/footprints/monthly/latest", get(get_latest_monthly_snapshot))
}

// ─── Calculator Footprint ────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct CreateFootprintRequest {
    #[validate(length(min = 1))]
    pub user_name: String,
    /// dd/mm/yyyy
    pub start_date: String,
    #[validate(nested)]
    pub vehicles: Vec<VehicleUsage>,
    #[serde(default)]
    #[validate(nested)]
    pub flights: Vec<FlightUsage>,
    #[validate(length(min = 1))]
    pub country: String,
    #[validate(length(min = 1))]
    pub state: String,
    /// kWh per month
    #[validate(range(min = 0.0))]
    pub electricity_usage: f64,
    #[serde(default)]
    #[validate(email)]
    pub email: Option<String>,
    #[serde(default)]
    pub mobile_number: Option<String>,
}

/// Create a footprint from usage details.
///
/// Computes vehicle, flight and electricity emissions for the period
/// since `start_date` and stores the snapshot under a generated
/// `{user_name}-NNN` ID.
async fn create_footprint(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateFootprintRequest>,
) -> Result<(StatusCode, Json<FootprintSnapshot>)> {
    validate_payload(&payload)?;

    // Reject unknown fuel types and flight classes before touching storage
    for vehicle in &payload.vehicles {
        FuelType::parse(&vehicle.fuel_type)?;
    }
    for flight in &payload.flights {
        FlightClass::parse(&flight.class)?;
    }

    if let Some(email) = payload.email.as_deref() {
        if state.db.find_footprint_by_email(email).await?.is_some() {
            return Err(AppError::BadRequest("Email already exists".to_string()));
        }
    }
    if let Some(mobile) = payload.mobile_number.as_deref() {
        if state.db.find_footprint_by_mobile(mobile).await?.is_some() {
            return Err(AppError::BadRequest(
                "Mobile number already exists".to_string(),
            ));
        }
    }

    let start = parse_date_dmy(&payload.start_date)?;
    let today = chrono::Utc::now().date_naive();
    let period = ElapsedPeriod::between(start, today);

    // Region lookup is the only external input to the calculators
    let factor = state
        .db
        .region_factor(&payload.country, &payload.state)
        .await?;
    let electricity =
        compute_electricity_emissions(factor, payload.electricity_usage, period.months);

    let sequence = state.db.next_sequence("footprints").await?;
    let snapshot = build_snapshot(
        SnapshotInput {
            footprint_id: footprint_id(&payload.user_name, sequence),
            user_name: &payload.user_name,
            start,
            vehicles: &payload.vehicles,
            flights: &payload.flights,
            electricity_usage: payload.electricity_usage,
            electricity,
            country: &payload.country,
            state: &payload.state,
            email: payload.email,
            mobile_number: payload.mobile_number,
        },
        period,
        &chrono::Utc::now().to_rfc3339(),
    )?;

    state.db.insert_footprint(&snapshot).await?;

    tracing::info!(
        footprint_id = %snapshot.footprint_id,
        total_kg = snapshot.total_carbon_footprint,
        "Footprint created"
    );

    Ok((StatusCode::CREATED, Json(snapshot)))
}

// ─── Monthly Snapshots ───────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct MonthlySnapshotRequest {
    /// dd/mm/yyyy, the month being recorded
    pub start_date: String,
    /// kWh for the month
    #[validate(range(min = 0.0))]
    pub electricity_usage: f64,
    #[validate(nested)]
    pub vehicle_usage: Vec<VehicleUsage>,
    #[serde(default)]
    #[validate(nested)]
    pub flight_usage: Vec<FlightUsage>,
}

/// Compute and store one calendar month's footprint.
///
/// The country/state come from the user's carbon profile. At most one
/// snapshot may exist per (user, month); duplicates are rejected by the
/// storage layer.
async fn create_monthly_snapshot(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<MonthlySnapshotRequest>,
) -> Result<(StatusCode, Json<MonthlySnapshot>)> {
    validate_payload(&payload)?;

    let start = parse_date_dmy(&payload.start_date)?;
    let month = month_key(start);

    let user = state
        .db
        .get_user(auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {} not found", auth.user_id)))?;

    let profile = user.carbon_profile.as_ref().ok_or_else(|| {
        AppError::BadRequest(
            "No carbon profile on record; create a footprint first".to_string(),
        )
    })?;

    let factor = state
        .db
        .region_factor(&profile.country, &profile.state)
        .await?;

    let vehicles = compute_vehicle_emissions(&payload.vehicle_usage)?;
    let flights = compute_flight_emissions(&payload.flight_usage)?;
    // One month of electricity
    let electricity = compute_electricity_emissions(factor, payload.electricity_usage, 1);
    let total = aggregate_footprint(&vehicles, &flights, electricity.total_emissions);

    let snapshot = MonthlySnapshot {
        user_id: user.user_id,
        user_name: user.username.clone(),
        month: month.clone(),
        start_date: format_date_dmy(start),
        end_date: format_date_dmy(add_one_month(start)),
        electricity_usage: payload.electricity_usage,
        vehicle_usage: vehicles,
        flight_usage: flights,
        total_co2_emissions: total,
        country: profile.country.clone(),
        state: profile.state.clone(),
        created_at: chrono::Utc::now().to_rfc3339(),
    };

    // Create-only write; a second snapshot for this month fails here
    state.db.create_monthly_snapshot(&snapshot).await?;

    // Roll the snapshot back if the history entry cannot be recorded,
    // so the two never drift apart
    let history_entry = MonthlyTotal {
        month: month.clone(),
        total_co2_emissions: total,
    };
    if let Err(err) = state
        .db
        .append_monthly_total(user.user_id, history_entry)
        .await
    {
        if let Err(cleanup_err) = state.db.delete_monthly_snapshot(user.user_id, &month).await {
            tracing::error!(
                user_id = user.user_id,
                month = %month,
                error = %cleanup_err,
                "Failed to remove monthly snapshot after history append failure"
            );
        }
        return Err(err);
    }

    tracing::info!(
        user_id = user.user_id,
        month = %month,
        total_kg = total,
        "Monthly snapshot created"
    );

    Ok((StatusCode::CREATED, Json(snapshot)))
}

#[derive(Deserialize)]
struct MonthQuery {
    /// MM/YYYY
    month: String,
}

/// Get the authenticated user's snapshot for a given month.
async fn get_monthly_snapshot(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Query(params): Query<MonthQuery>,
) -> Result<Json<MonthlySnapshot>> {
    state
        .db
        .get_monthly_snapshot(auth.user_id, &params.month)
        .await?
        .map(Json)
        .ok_or_else(|| {
            AppError::NotFound("No carbon footprint found for this month".to_string())
        })
}

/// All of the authenticated user's monthly snapshots, oldest first.
async fn get_monthly_history(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<MonthlySnapshot>>> {
    Ok(Json(
        state.db.monthly_snapshots_for_user(auth.user_id).await?,
    ))
}

/// Get the authenticated user's most recent monthly snapshot.
async fn get_latest_monthly_snapshot(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<MonthlySnapshot>> {
    state
        .db
        .latest_monthly_snapshot(auth.user_id)
        .await?
        .map(Json)
        .ok_or_else(|| {
            AppError::NotFound("No carbon footprint record found for this user".to_string())
        })
}
