// SPDX-License-Identifier: MIT

//! Badge evaluation over cumulative challenge points.

use crate::models::Badge;

/// Badge ladder, ordered by threshold. The top tier is aspirational and
/// sits above every reachable threshold.
const BADGE_LADDER: &[(u64, &str)] = &[
    (2000, "Eco Starter"),
    (5000, "Green Contributor"),
    (10000, "Eco Warrior"),
    (20000, "Sustainability Champion"),
    (35000, "Planet Protector"),
    (55000, "Climate Hero"),
    (75000, "Earth Guardian"),
    (89900, "Eco Master"),
    (u64::MAX, "Global Eco Legend"),
];

/// All badges earned at `points`, lowest threshold first.
///
/// The boundary is inclusive: points equal to a threshold earn the badge.
pub fn badges_for(points: u64) -> Vec<Badge> {
    BADGE_LADDER
        .iter()
        .take_while(|(threshold, _)| *threshold <= points)
        .map(|&(threshold, title)| Badge { title, threshold })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_points_is_empty() {
        assert!(badges_for(0).is_empty());
        assert!(badges_for(1999).is_empty());
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let badges = badges_for(2000);
        assert_eq!(badges.len(), 1);
        assert_eq!(badges[0].title, "Eco Starter");
    }

    #[test]
    fn test_top_reachable_threshold() {
        let badges = badges_for(89900);
        assert_eq!(badges.len(), 8);
        assert_eq!(badges.last().unwrap().title, "Eco Master");
        assert!(badges.iter().all(|b| b.title != "Global Eco Legend"));
    }

    #[test]
    fn test_monotonic_in_points() {
        let mut previous = 0;
        for points in [0, 1999, 2000, 4999, 5000, 30000, 89899, 89900, 1_000_000] {
            let count = badges_for(points).len();
            assert!(count >= previous, "badge count decreased at {points}");
            previous = count;
        }
    }

    #[test]
    fn test_higher_badge_implies_all_lower() {
        let badges = badges_for(35000);
        let thresholds: Vec<u64> = badges.iter().map(|b| b.threshold).collect();
        assert_eq!(thresholds, vec![2000, 5000, 10000, 20000, 35000]);
    }
}
