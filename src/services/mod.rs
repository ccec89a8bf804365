// SPDX-License-Identifier: MIT

//! Services module - business logic layer.

pub mod badges;
pub mod emissions;
pub mod footprint;
pub mod password;
pub mod upload;

pub use badges::badges_for;
pub use emissions::{
    aggregate_footprint, compute_electricity_emissions, compute_flight_emissions,
    compute_vehicle_emissions, ElectricityTotals,
};
pub use footprint::ElapsedPeriod;
