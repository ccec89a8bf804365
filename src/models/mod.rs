// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod badge;
pub mod challenge;
pub mod chat;
pub mod emission_factor;
pub mod footprint;
pub mod usage;
pub mod user;

pub use badge::Badge;
pub use challenge::{ChallengeCompletion, CompletionStatus, EcoChallenge};
pub use chat::{Chat, Message};
pub use emission_factor::RegionFactors;
pub use footprint::{FootprintSnapshot, MonthlySnapshot};
pub use usage::{FlightClass, FlightUsage, FuelType, VehicleUsage};
pub use user::{MonthlyTotal, User};
