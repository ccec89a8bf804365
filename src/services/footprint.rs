// SPDX-License-Identifier: MIT

//! Footprint period math and snapshot assembly.

use crate::error::Result;
use crate::models::{FlightUsage, FootprintSnapshot, VehicleUsage};
use crate::services::emissions::{
    aggregate_footprint, compute_flight_emissions, compute_vehicle_emissions, ElectricityTotals,
};
use crate::time_utils::format_date_dmy;
use chrono::NaiveDate;

/// Average days per month used to convert elapsed days into billing months.
const DAYS_PER_MONTH: f64 = 30.44;

/// Elapsed time between a footprint's start date and today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElapsedPeriod {
    pub days: i64,
    pub weeks: i64,
    pub months: i64,
}

impl ElapsedPeriod {
    /// Whole days/weeks/months elapsed from `start` to `today`.
    ///
    /// A start date in the future counts as zero elapsed time.
    pub fn between(start: NaiveDate, today: NaiveDate) -> Self {
        let days = (today - start).num_days().max(0);
        Self {
            days,
            weeks: days / 7,
            months: (days as f64 / DAYS_PER_MONTH).floor() as i64,
        }
    }
}

/// Format a footprint document ID from a user name and an allocated
/// sequence number: `{user_name}-NNN`.
pub fn footprint_id(user_name: &str, sequence: u64) -> String {
    format!("{}-{:03}", user_name, sequence)
}

/// Inputs for assembling a [`FootprintSnapshot`].
pub struct SnapshotInput<'a> {
    pub footprint_id: String,
    pub user_name: &'a str,
    pub start: NaiveDate,
    pub vehicles: &'a [VehicleUsage],
    pub flights: &'a [FlightUsage],
    pub electricity_usage: f64,
    pub electricity: ElectricityTotals,
    pub country: &'a str,
    pub state: &'a str,
    pub email: Option<String>,
    pub mobile_number: Option<String>,
}

/// Run the calculators over the raw entries and assemble the stored
/// snapshot. The electricity totals are computed by the caller because
/// they need the region factor from the store.
pub fn build_snapshot(
    input: SnapshotInput<'_>,
    period: ElapsedPeriod,
    now: &str,
) -> Result<FootprintSnapshot> {
    let vehicles = compute_vehicle_emissions(input.vehicles)?;
    let flights = compute_flight_emissions(input.flights)?;
    let total =
        aggregate_footprint(&vehicles, &flights, input.electricity.total_emissions);

    Ok(FootprintSnapshot {
        footprint_id: input.footprint_id,
        user_name: input.user_name.to_string(),
        start_date: format_date_dmy(input.start),
        total_days: period.days,
        total_weeks: period.weeks,
        total_months: period.months,
        vehicles,
        flights,
        electricity_usage: input.electricity_usage,
        total_electricity_usage: input.electricity.total_usage,
        total_co2_emissions_of_electricity: input.electricity.total_emissions,
        total_carbon_footprint: total,
        country: input.country.to_string(),
        state: input.state.to_string(),
        email: input.email,
        mobile_number: input.mobile_number,
        created_at: now.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::emissions::compute_electricity_emissions;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_elapsed_period() {
        let period = ElapsedPeriod::between(date(2024, 1, 1), date(2024, 4, 1));
        assert_eq!(period.days, 91);
        assert_eq!(period.weeks, 13);
        assert_eq!(period.months, 2); // floor(91 / 30.44)
    }

    #[test]
    fn test_elapsed_period_future_start_is_zero() {
        let period = ElapsedPeriod::between(date(2030, 1, 1), date(2024, 1, 1));
        assert_eq!(period.days, 0);
        assert_eq!(period.weeks, 0);
        assert_eq!(period.months, 0);
    }

    #[test]
    fn test_footprint_id_format() {
        assert_eq!(footprint_id("asha", 1), "asha-001");
        assert_eq!(footprint_id("asha", 42), "asha-042");
        assert_eq!(footprint_id("asha", 1000), "asha-1000");
    }

    #[test]
    fn test_build_snapshot_totals() {
        let vehicles = vec![VehicleUsage {
            vehicle_type: "car".to_string(),
            fuel_type: "diesel".to_string(),
            count: 2,
            kilometers_traveled: 1000.0,
            average_fuel_efficiency: 20.0,
            total_co2_emissions: 0.0,
        }];
        let flights = vec![FlightUsage {
            class: "business".to_string(),
            hours: 5.0,
            total_co2_emissions: 0.0,
        }];
        let electricity = compute_electricity_emissions(0.82, 100.0, 3);

        let snapshot = build_snapshot(
            SnapshotInput {
                footprint_id: "asha-001".to_string(),
                user_name: "asha",
                start: date(2024, 1, 1),
                vehicles: &vehicles,
                flights: &flights,
                electricity_usage: 100.0,
                electricity,
                country: "India",
                state: "Karnataka",
                email: None,
                mobile_number: None,
            },
            ElapsedPeriod::between(date(2024, 1, 1), date(2024, 4, 1)),
            "2024-04-01T00:00:00Z",
        )
        .unwrap();

        assert_eq!(snapshot.start_date, "01/01/2024");
        assert_eq!(snapshot.total_electricity_usage, 300.0);
        assert!((snapshot.total_carbon_footprint - (268.0 + 938.15 + 246.0)).abs() < 1e-9);
    }

    #[test]
    fn test_build_snapshot_propagates_unknown_fuel() {
        let vehicles = vec![VehicleUsage {
            vehicle_type: "car".to_string(),
            fuel_type: "steam".to_string(),
            count: 1,
            kilometers_traveled: 10.0,
            average_fuel_efficiency: 10.0,
            total_co2_emissions: 0.0,
        }];

        let result = build_snapshot(
            SnapshotInput {
                footprint_id: "x-001".to_string(),
                user_name: "x",
                start: date(2024, 1, 1),
                vehicles: &vehicles,
                flights: &[],
                electricity_usage: 0.0,
                electricity: compute_electricity_emissions(0.5, 0.0, 0),
                country: "India",
                state: "Karnataka",
                email: None,
                mobile_number: None,
            },
            ElapsedPeriod::between(date(2024, 1, 1), date(2024, 2, 1)),
            "now",
        );
        assert!(result.is_err());
    }
}
