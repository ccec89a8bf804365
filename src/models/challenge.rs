// SPDX-License-Identifier: MIT

//! Eco-challenge catalog and completion submissions.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A challenge users can complete for points.
///
/// Stored in `challenges`, keyed by `challenge_id`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EcoChallenge {
    #[serde(default)]
    pub challenge_id: u64,
    pub task_no: u32,
    #[validate(length(min = 1))]
    pub name: String,
    /// What the user is asked to do
    #[validate(length(min = 1))]
    pub challenge: String,
    #[serde(default)]
    pub benefits_to_society: Option<String>,
    pub points: u64,
    /// Illustration image path under /uploads
    #[serde(default)]
    pub image: Option<String>,
    /// Human-readable timeline ("1 week", ...)
    #[serde(default)]
    pub timeline: Option<String>,
    /// How many proof images a submission must include
    #[serde(default = "default_required_images")]
    pub required_images: u32,
    /// Estimated CO2 saving, display text
    #[serde(default)]
    pub carbon_saving: Option<String>,
    pub cadence: ChallengeCadence,
}

fn default_required_images() -> u32 {
    1
}

/// Weekly or monthly challenge rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeCadence {
    Week,
    Month,
}

impl ChallengeCadence {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "week" => Some(Self::Week),
            "month" => Some(Self::Month),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Week => "week",
            Self::Month => "month",
        }
    }
}

/// Lifecycle of a completion submission.
///
/// `Pending` moves to `Success` or `Declined` exactly once; a declined
/// submission is resubmitted as a new record, never mutated back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompletionStatus {
    Pending,
    Success,
    Declined,
}

impl CompletionStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(Self::Pending),
            "success" => Some(Self::Success),
            "declined" => Some(Self::Declined),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Declined => "declined",
        }
    }
}

/// One photo-proof submission for a challenge.
///
/// Stored in `challenge_completions`, keyed by `completion_id`.
/// `points_achieved` snapshots the challenge's points at submission time
/// so later challenge edits do not change pending credits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeCompletion {
    pub completion_id: u64,
    pub challenge_id: u64,
    pub user_id: u64,
    /// Proof image paths under /uploads
    pub images: Vec<String>,
    pub description: String,
    pub status: CompletionStatus,
    pub points_achieved: u64,
    #[serde(default)]
    pub carbon_saving: Option<String>,
    /// Submission timestamp (ISO 8601)
    pub submitted_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [
            CompletionStatus::Pending,
            CompletionStatus::Success,
            CompletionStatus::Declined,
        ] {
            assert_eq!(CompletionStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(CompletionStatus::parse("approved"), None);
    }

    #[test]
    fn test_cadence_parse() {
        assert_eq!(ChallengeCadence::parse("week"), Some(ChallengeCadence::Week));
        assert_eq!(ChallengeCadence::parse("month"), Some(ChallengeCadence::Month));
        assert_eq!(ChallengeCadence::parse("daily"), None);
    }
}
