// SPDX-License-Identifier: MIT

//! Badges earned from cumulative eco-challenge points.
//!
//! Badges are derived, never stored: a badge is a pure function of the
//! user's running point total.

use serde::Serialize;

/// A badge earned at a points threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub title: &'static str,
    /// Minimum points (inclusive) to earn this badge
    pub threshold: u64,
}
