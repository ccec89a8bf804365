// SPDX-License-Identifier: MIT

//! Vehicle and flight usage entries.
//!
//! Fuel types and flight classes arrive as free-form strings and are parsed
//! case-insensitively. Unrecognized values are rejected, never defaulted.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Recognized vehicle fuel types with their emission factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuelType {
    Petrol,
    Diesel,
    Cng,
    Electric,
}

impl FuelType {
    /// Parse a fuel type string (case-insensitive).
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        match raw.to_lowercase().as_str() {
            "petrol" => Ok(Self::Petrol),
            "diesel" => Ok(Self::Diesel),
            "cng" => Ok(Self::Cng),
            "electric" => Ok(Self::Electric),
            _ => Err(AppError::UnknownFuelType(raw.to_string())),
        }
    }

    /// Emission factor in kg CO2 per liter-equivalent of fuel.
    pub fn emission_factor(self) -> f64 {
        match self {
            Self::Petrol => 2.31,
            Self::Diesel => 2.68,
            Self::Cng => 1.86,
            Self::Electric => 0.0,
        }
    }
}

/// Recognized flight classes with their emission factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightClass {
    Economy,
    Business,
    First,
}

impl FlightClass {
    /// Parse a flight class string (case-insensitive).
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        match raw.to_lowercase().as_str() {
            "economy" => Ok(Self::Economy),
            "business" => Ok(Self::Business),
            "first" => Ok(Self::First),
            _ => Err(AppError::UnknownFlightClass(raw.to_string())),
        }
    }

    /// Emission factor in kg CO2 per flight hour.
    pub fn emission_factor(self) -> f64 {
        match self {
            Self::Economy => 75.05,
            Self::Business => 187.63,
            Self::First => 225.15,
        }
    }
}

/// One vehicle usage entry. The raw fuel type string is preserved in
/// storage; `total_co2_emissions` is derived by the emissions calculator.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VehicleUsage {
    /// Vehicle kind (car, bike, scooter, ...)
    pub vehicle_type: String,
    /// Fuel type (petrol, diesel, cng, electric)
    pub fuel_type: String,
    /// Number of vehicles of this configuration
    #[serde(default = "default_count")]
    pub count: u32,
    #[validate(range(min = 0.0))]
    pub kilometers_traveled: f64,
    /// Kilometers per liter-equivalent, must be positive
    #[validate(range(exclusive_min = 0.0))]
    pub average_fuel_efficiency: f64,
    /// Derived: total kg CO2 for this entry
    #[serde(default)]
    pub total_co2_emissions: f64,
}

fn default_count() -> u32 {
    1
}

/// One flight usage entry. Emissions are carried as a numeric kg value
/// end-to-end, never a formatted string.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FlightUsage {
    /// Flight class (economy, business, first)
    pub class: String,
    #[validate(range(min = 0.0))]
    pub hours: f64,
    /// Derived: total kg CO2 for this entry, rounded to 2 decimals
    #[serde(default)]
    pub total_co2_emissions: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fuel_type_parse_case_insensitive() {
        assert_eq!(FuelType::parse("Petrol").unwrap(), FuelType::Petrol);
        assert_eq!(FuelType::parse("DIESEL").unwrap(), FuelType::Diesel);
        assert_eq!(FuelType::parse("cng").unwrap(), FuelType::Cng);
        assert_eq!(FuelType::parse("Electric").unwrap(), FuelType::Electric);
    }

    #[test]
    fn test_fuel_type_rejects_unknown() {
        let err = FuelType::parse("hydrogen").unwrap_err();
        assert!(matches!(err, AppError::UnknownFuelType(_)));
    }

    #[test]
    fn test_flight_class_rejects_unknown() {
        let err = FlightClass::parse("premium economy").unwrap_err();
        assert!(matches!(err, AppError::UnknownFlightClass(_)));
    }

    #[test]
    fn test_emission_factors() {
        assert_eq!(FuelType::Petrol.emission_factor(), 2.31);
        assert_eq!(FuelType::Diesel.emission_factor(), 2.68);
        assert_eq!(FuelType::Cng.emission_factor(), 1.86);
        assert_eq!(FuelType::Electric.emission_factor(), 0.0);
        assert_eq!(FlightClass::Economy.emission_factor(), 75.05);
        assert_eq!(FlightClass::Business.emission_factor(), 187.63);
        assert_eq!(FlightClass::First.emission_factor(), 225.15);
    }
}
