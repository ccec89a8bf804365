//! User model for storage and API.

use crate::models::VehicleUsage;
use serde::{Deserialize, Serialize};

/// User profile stored in Firestore, keyed by `user_id`.
///
/// The password hash is part of the stored document; API responses use
/// `routes::users::UserResponse` which never includes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub user_id: u64,
    pub username: String,
    pub email: String,
    /// PBKDF2 password hash, `pbkdf2$iters$salt$hash`
    pub password_hash: String,
    #[serde(default)]
    pub mobile_number: Option<String>,
    #[serde(default)]
    pub profile_image: Option<String>,
    /// dd/mm/yyyy
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub address: Option<Address>,
    /// Footprint summary adopted from the public calculator at registration
    #[serde(default)]
    pub carbon_profile: Option<CarbonProfile>,
    /// One entry per monthly snapshot, in creation order
    #[serde(default)]
    pub footprint_history: Vec<MonthlyTotal>,
    /// Running eco-challenge points, credited on approval
    #[serde(default)]
    pub total_points: u64,
    /// Creation timestamp (ISO 8601)
    pub created_at: String,
}

/// Postal address, all fields optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

/// Snapshot of a pre-registration footprint attached to the user profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarbonProfile {
    pub total_co2_emissions: f64,
    pub vehicles: Vec<VehicleUsage>,
    pub electricity_usage: f64,
    /// Start date the footprint was calculated from, dd/mm/yyyy
    #[serde(default)]
    pub calculated_from: Option<String>,
    pub country: String,
    pub state: String,
}

/// One month's total in the user's footprint history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyTotal {
    /// MM/YYYY
    pub month: String,
    pub total_co2_emissions: f64,
}
