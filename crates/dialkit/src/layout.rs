//! End-to-end label layout for one instant.

use crate::angle::{self, Sector};
use crate::city::{City, CityId};
use crate::cluster::{self, Cluster};
use crate::label::{LabelInterval, LabelMetrics, LabelPlacement};
use crate::orbit::{self, Orbit, OrbitAssignment};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use strum::IntoEnumIterator;

/// Labels of every placeable city, in input order. Cities without a resolvable
/// zone are skipped, and a repeated id keeps its first occurrence.
pub fn place_labels(
    cities: &[City],
    at: DateTime<Utc>,
    metrics: &LabelMetrics,
) -> Vec<LabelPlacement> {
    let mut seen = HashSet::new();
    cities
        .iter()
        .filter(|city| {
            let fresh = seen.insert(&city.id);
            if !fresh {
                log::debug!("Ignoring repeated city '{}'", city.id);
            }
            fresh
        })
        .filter_map(|city| {
            let placement = LabelPlacement::for_city(city, at, metrics);
            if placement.is_none() {
                log::debug!(
                    "Skipping '{}': no resolvable time zone ({:?})",
                    city.id,
                    city.zone
                );
            }
            placement
        })
        .collect()
}

/// Orbit for every city with a resolvable zone at `at`.
pub fn assign_orbits(
    cities: &[City],
    at: DateTime<Utc>,
    metrics: &LabelMetrics,
) -> OrbitAssignment {
    DialLayout::compute(cities, at, metrics).into_assignment()
}

/// Placements, clusters and the resulting assignment, kept together so callers
/// can inspect why a label ended up where it did.
#[derive(Debug, Clone, Default)]
pub struct DialLayout {
    placements: Vec<LabelPlacement>,
    clusters: Vec<Cluster>,
    assignment: OrbitAssignment,
}

impl DialLayout {
    pub fn compute(cities: &[City], at: DateTime<Utc>, metrics: &LabelMetrics) -> Self {
        Self::from_placements(place_labels(cities, at, metrics))
    }

    pub fn from_placements(placements: Vec<LabelPlacement>) -> Self {
        let intervals = placements.iter().flat_map(LabelPlacement::intervals).collect();
        let clusters = cluster::build_clusters(intervals);
        let assignment = orbit::balance(&clusters);

        log::debug!(
            "Laid out {} labels in {} clusters ({} inner, {} outer)",
            assignment.len(),
            clusters.len(),
            assignment.count(Orbit::Inner),
            assignment.count(Orbit::Outer)
        );

        Self {
            placements,
            clusters,
            assignment,
        }
    }

    pub fn placements(&self) -> &[LabelPlacement] {
        &self.placements
    }

    pub fn placement(&self, city: &CityId) -> Option<&LabelPlacement> {
        self.placements.iter().find(|p| &p.city == city)
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn cluster_of(&self, city: &CityId) -> Option<&Cluster> {
        self.clusters.iter().find(|c| c.contains(city))
    }

    pub fn assignment(&self) -> &OrbitAssignment {
        &self.assignment
    }

    pub fn into_assignment(self) -> OrbitAssignment {
        self.assignment
    }

    pub fn intervals_on(&self, orbit: Orbit) -> Vec<LabelInterval> {
        self.placements
            .iter()
            .filter(|p| self.assignment.get(&p.city) == Some(orbit))
            .flat_map(LabelPlacement::intervals)
            .collect()
    }

    /// Gaps on `orbit` where a label of at least `min_width` would still fit.
    pub fn free_sectors(&self, orbit: Orbit, min_width: f64) -> Vec<Sector> {
        angle::free_sectors(
            self.intervals_on(orbit).into_iter().map(|i| i.sector),
            min_width,
        )
    }

    /// Pairs of cities sharing a ring whose labels overlap, each pair ordered by id.
    pub fn collisions(&self) -> Vec<(CityId, CityId)> {
        let mut pairs = Vec::new();
        for orbit in Orbit::iter() {
            let intervals = self.intervals_on(orbit);
            for (i, a) in intervals.iter().enumerate() {
                for b in &intervals[i + 1..] {
                    if a.city == b.city || !a.overlaps(b) {
                        continue;
                    }
                    let pair = if a.city < b.city {
                        (a.city.clone(), b.city.clone())
                    } else {
                        (b.city.clone(), a.city.clone())
                    };
                    if !pairs.contains(&pair) {
                        pairs.push(pair);
                    }
                }
            }
        }
        pairs.sort();
        pairs
    }
}
