// SPDX-License-Identifier: MIT

//! The emissions calculator.
//!
//! Pure arithmetic over fixed per-activity emission factors. The only
//! external input is the region electricity factor, which callers fetch
//! from the emission-factor store and pass in as a plain number.

use crate::error::Result;
use crate::models::{FlightClass, FlightUsage, FuelType, VehicleUsage};

/// Round to 2 decimal places (kg CO2 display precision).
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Compute per-entry vehicle emissions.
///
/// Each entry yields `(km / efficiency) * factor * count` kg CO2.
/// Fails on the first unrecognized fuel type; no entry is defaulted.
pub fn compute_vehicle_emissions(entries: &[VehicleUsage]) -> Result<Vec<VehicleUsage>> {
    entries
        .iter()
        .map(|entry| {
            let fuel = FuelType::parse(&entry.fuel_type)?;
            let total = (entry.kilometers_traveled / entry.average_fuel_efficiency)
                * fuel.emission_factor()
                * f64::from(entry.count);
            Ok(VehicleUsage {
                total_co2_emissions: total,
                ..entry.clone()
            })
        })
        .collect()
}

/// Compute per-entry flight emissions, `hours * factor` kg CO2.
///
/// Totals are rounded to 2 decimals but stay numeric end-to-end.
pub fn compute_flight_emissions(entries: &[FlightUsage]) -> Result<Vec<FlightUsage>> {
    entries
        .iter()
        .map(|entry| {
            let class = FlightClass::parse(&entry.class)?;
            let total = round2(entry.hours * class.emission_factor());
            Ok(FlightUsage {
                total_co2_emissions: total,
                ..entry.clone()
            })
        })
        .collect()
}

/// Electricity usage and emissions over a period.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElectricityTotals {
    /// kWh over the whole period
    pub total_usage: f64,
    /// kg CO2 over the whole period
    pub total_emissions: f64,
}

/// Compute electricity totals from a region factor (kg CO2 per kWh).
pub fn compute_electricity_emissions(
    region_factor: f64,
    kwh_per_month: f64,
    months: i64,
) -> ElectricityTotals {
    let total_usage = kwh_per_month * months as f64;
    ElectricityTotals {
        total_usage,
        total_emissions: total_usage * region_factor,
    }
}

/// Sum computed vehicle, flight and electricity totals into one kg figure.
pub fn aggregate_footprint(
    vehicles: &[VehicleUsage],
    flights: &[FlightUsage],
    electricity_emissions: f64,
) -> f64 {
    let vehicle_total: f64 = vehicles.iter().map(|v| v.total_co2_emissions).sum();
    let flight_total: f64 = flights.iter().map(|f| f.total_co2_emissions).sum();
    vehicle_total + flight_total + electricity_emissions
}
