// SPDX-License-Identifier: MIT

//! Region electricity emission factors.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Emission factors for one country, stored in `emission_factors` and
/// keyed by country name.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegionFactors {
    #[validate(length(min = 1))]
    pub country: String,
    #[validate(length(min = 1))]
    pub states: Vec<StateFactor>,
}

/// Per-state factor in kg CO2 per kWh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateFactor {
    pub state: String,
    pub emission_factor: f64,
}

impl RegionFactors {
    /// Look up the factor for a state, exact name match.
    pub fn factor_for(&self, state: &str) -> Option<f64> {
        self.states
            .iter()
            .find(|s| s.state == state)
            .map(|s| s.emission_factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factor_for() {
        let factors = RegionFactors {
            country: "India".to_string(),
            states: vec![
                StateFactor {
                    state: "Karnataka".to_string(),
                    emission_factor: 0.82,
                },
                StateFactor {
                    state: "Kerala".to_string(),
                    emission_factor: 0.79,
                },
            ],
        };

        assert_eq!(factors.factor_for("Karnataka"), Some(0.82));
        assert_eq!(factors.factor_for("karnataka"), None); // exact match only
        assert_eq!(factors.factor_for("Goa"), None);
    }
}
