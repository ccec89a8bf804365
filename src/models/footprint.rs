// SPDX-License-Identifier: MIT

//! Footprint snapshot documents.

use crate::models::{FlightUsage, VehicleUsage};
use serde::{Deserialize, Serialize};

/// Running footprint created by the public calculator.
///
/// Stored in `footprints`, keyed by `footprint_id` (`{user_name}-NNN`).
/// Immutable once computed; superseded by monthly snapshots after the
/// user registers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FootprintSnapshot {
    pub footprint_id: String,
    pub user_name: String,
    /// Period start, dd/mm/yyyy
    pub start_date: String,
    pub total_days: i64,
    pub total_weeks: i64,
    pub total_months: i64,
    pub vehicles: Vec<VehicleUsage>,
    pub flights: Vec<FlightUsage>,
    /// Monthly electricity usage in kWh
    pub electricity_usage: f64,
    /// kWh over the whole period
    pub total_electricity_usage: f64,
    pub total_co2_emissions_of_electricity: f64,
    /// Grand total across vehicles, flights and electricity (kg)
    pub total_carbon_footprint: f64,
    pub country: String,
    pub state: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub mobile_number: Option<String>,
    /// Creation timestamp (ISO 8601)
    pub created_at: String,
}

/// One calendar month of emissions for a registered user.
///
/// Stored in `monthly_footprints`, keyed by `{user_id}_{MM-YYYY}` so the
/// storage layer enforces at most one snapshot per (user, month).
/// Never updated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlySnapshot {
    pub user_id: u64,
    pub user_name: String,
    /// Month key, MM/YYYY
    pub month: String,
    /// Period start, dd/mm/yyyy
    pub start_date: String,
    /// Period end (start + 1 month), dd/mm/yyyy
    pub end_date: String,
    /// Monthly electricity usage in kWh
    pub electricity_usage: f64,
    pub vehicle_usage: Vec<VehicleUsage>,
    pub flight_usage: Vec<FlightUsage>,
    /// Total kg CO2 for the month
    pub total_co2_emissions: f64,
    pub country: String,
    pub state: String,
    /// Creation timestamp (ISO 8601)
    pub created_at: String,
}
