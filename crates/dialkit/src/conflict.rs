//! Conflict policy on top of the orbit layout.
//!
//! The layout always produces an assignment; with only two rings a cluster of
//! three or more labels necessarily puts overlapping labels on the same ring.
//! Whether that counts as a conflict is decided here, not by the layout.

use crate::city::{City, CityId};
use crate::cluster::Cluster;
use crate::label::LabelMetrics;
use crate::layout::DialLayout;
use crate::orbit::OrbitAssignment;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub const DEFAULT_MAX_CLUSTER_SIZE: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConflictPolicy {
    /// Largest cluster accepted before it is reported. Zero is treated as one,
    /// since a single label always fits.
    pub max_cluster_size: usize,
}

impl Default for ConflictPolicy {
    fn default() -> Self {
        Self {
            max_cluster_size: DEFAULT_MAX_CLUSTER_SIZE,
        }
    }
}

impl ConflictPolicy {
    pub fn is_crowded(&self, cluster: &Cluster) -> bool {
        cluster.len() > self.max_cluster_size.max(1)
    }
}

/// A crowded cluster and the same-ring overlaps it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    /// Members in dial order.
    pub cities: Vec<CityId>,
    pub collisions: Vec<(CityId, CityId)>,
}

impl Conflict {
    fn from_cluster(cluster: &Cluster, layout: &DialLayout) -> Self {
        let collisions = layout
            .collisions()
            .into_iter()
            .filter(|(a, b)| cluster.contains(a) && cluster.contains(b))
            .collect();
        Self {
            cities: cluster.cities_by_angle().into_iter().cloned().collect(),
            collisions,
        }
    }

    pub fn involves(&self, city: &CityId) -> bool {
        self.cities.contains(city)
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.cities.iter().map(|c| c.as_str()).collect();
        write!(
            f,
            "{} ({} same-ring overlaps)",
            names.join(", "),
            self.collisions.len()
        )
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum AdditionError {
    #[error("City '{0}' is already selected")]
    AlreadySelected(CityId),
    #[error("City '{0}' has no resolvable time zone")]
    UnresolvedZone(CityId),
    #[error("Adding '{candidate}' crowds its label: {conflict}")]
    Crowded {
        candidate: CityId,
        conflict: Conflict,
    },
}

pub fn conflicts_in(layout: &DialLayout, policy: &ConflictPolicy) -> Vec<Conflict> {
    layout
        .clusters()
        .iter()
        .filter(|cluster| policy.is_crowded(cluster))
        .map(|cluster| Conflict::from_cluster(cluster, layout))
        .collect()
}

/// Crowded clusters in the current selection.
pub fn find_conflicts(
    cities: &[City],
    at: DateTime<Utc>,
    metrics: &LabelMetrics,
    policy: &ConflictPolicy,
) -> Vec<Conflict> {
    conflicts_in(&DialLayout::compute(cities, at, metrics), policy)
}

/// Lays out `selection` plus `candidate` and returns the new assignment, unless
/// the candidate's own cluster ends up crowded. Crowding elsewhere in the
/// selection does not block the addition.
pub fn check_addition(
    selection: &[City],
    candidate: &City,
    at: DateTime<Utc>,
    metrics: &LabelMetrics,
    policy: &ConflictPolicy,
) -> Result<OrbitAssignment, AdditionError> {
    if selection.iter().any(|city| city.id == candidate.id) {
        return Err(AdditionError::AlreadySelected(candidate.id.clone()));
    }
    if candidate.time_zone().is_none() {
        return Err(AdditionError::UnresolvedZone(candidate.id.clone()));
    }

    let cities: Vec<City> = selection
        .iter()
        .chain(std::iter::once(candidate))
        .cloned()
        .collect();
    let layout = DialLayout::compute(&cities, at, metrics);

    if let Some(cluster) = layout
        .cluster_of(&candidate.id)
        .filter(|cluster| policy.is_crowded(cluster))
    {
        let conflict = Conflict::from_cluster(cluster, &layout);
        log::debug!("Rejecting '{}': {}", candidate.id, conflict);
        return Err(AdditionError::Crowded {
            candidate: candidate.id.clone(),
            conflict,
        });
    }

    Ok(layout.into_assignment())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()
    }

    fn europe() -> Vec<City> {
        vec![
            City::new("london", "LON", "Europe/London"),
            City::new("paris", "PAR", "Europe/Paris"),
        ]
    }

    #[test]
    fn test_policy_threshold() {
        let policy = ConflictPolicy::default();
        let layout = DialLayout::compute(&europe(), noon(), &LabelMetrics::default());
        assert_eq!(layout.clusters().len(), 1);
        assert!(!policy.is_crowded(&layout.clusters()[0]));

        let strict = ConflictPolicy {
            max_cluster_size: 1,
        };
        assert!(strict.is_crowded(&layout.clusters()[0]));
    }

    #[test]
    fn test_zero_threshold_still_accepts_lone_labels() {
        let policy = ConflictPolicy {
            max_cluster_size: 0,
        };
        let metrics = LabelMetrics::default();

        let tokyo = City::new("tokyo", "TYO", "Asia/Tokyo");
        let lone = DialLayout::compute(std::slice::from_ref(&tokyo), noon(), &metrics);
        assert!(!policy.is_crowded(&lone.clusters()[0]));

        let pair = DialLayout::compute(&europe(), noon(), &metrics);
        assert!(policy.is_crowded(&pair.clusters()[0]));
    }

    #[test]
    fn test_addition_accepted_when_pair_fits() {
        let tokyo = City::new("tokyo", "TYO", "Asia/Tokyo");
        let assignment = check_addition(
            &europe(),
            &tokyo,
            noon(),
            &LabelMetrics::default(),
            &ConflictPolicy::default(),
        )
        .unwrap();
        assert_eq!(assignment.len(), 3);
        assert!(assignment.contains(&tokyo.id));
    }

    #[test]
    fn test_third_neighbour_is_rejected() {
        let berlin = City::new("berlin", "BER", "Europe/Berlin");
        let err = check_addition(
            &europe(),
            &berlin,
            noon(),
            &LabelMetrics::default(),
            &ConflictPolicy::default(),
        )
        .unwrap_err();

        match err {
            AdditionError::Crowded {
                candidate,
                conflict,
            } => {
                assert_eq!(candidate, berlin.id);
                assert_eq!(conflict.cities.len(), 3);
                assert!(conflict.involves(&CityId::new("london")));
                assert!(!conflict.collisions.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_duplicate_and_unzoned_candidates_are_rejected() {
        let metrics = LabelMetrics::default();
        let policy = ConflictPolicy::default();

        let dup = City::new("paris", "PAR", "Europe/Paris");
        assert_eq!(
            check_addition(&europe(), &dup, noon(), &metrics, &policy),
            Err(AdditionError::AlreadySelected(dup.id.clone()))
        );

        let lost = City::new("lost", "LST", "Mars/Olympus");
        assert_eq!(
            check_addition(&europe(), &lost, noon(), &metrics, &policy),
            Err(AdditionError::UnresolvedZone(lost.id.clone()))
        );
    }

    #[test]
    fn test_existing_crowding_does_not_block_unrelated_city() {
        let mut selection = europe();
        selection.push(City::new("berlin", "BER", "Europe/Berlin"));
        let metrics = LabelMetrics::default();
        let policy = ConflictPolicy::default();

        assert_eq!(find_conflicts(&selection, noon(), &metrics, &policy).len(), 1);

        let tokyo = City::new("tokyo", "TYO", "Asia/Tokyo");
        assert!(check_addition(&selection, &tokyo, noon(), &metrics, &policy).is_ok());
    }

    #[test]
    fn test_no_conflicts_for_spread_out_selection() {
        let cities = vec![
            City::new("london", "LON", "Europe/London"),
            City::new("tokyo", "TYO", "Asia/Tokyo"),
            City::new("newyork", "NYC", "America/New_York"),
        ];
        let conflicts = find_conflicts(
            &cities,
            noon(),
            &LabelMetrics::default(),
            &ConflictPolicy::default(),
        );
        assert!(conflicts.is_empty());
    }

    #[test]
    fn test_conflict_display() {
        let conflict = Conflict {
            cities: vec![CityId::new("a"), CityId::new("b"), CityId::new("c")],
            collisions: vec![(CityId::new("a"), CityId::new("c"))],
        };
        assert_eq!(conflict.to_string(), "a, b, c (1 same-ring overlaps)");
    }
}
