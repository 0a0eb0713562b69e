//! Grouping of label intervals that collide with each other.

use crate::city::CityId;
use crate::label::LabelInterval;
use std::f64::consts::{PI, TAU};

/// Largest gap across the 0/2π seam at which the last cluster still joins the
/// first one.
pub const SEAM_MERGE_GAP: f64 = 0.01;

/// Cities whose labels overlap directly, transitively, or through the two
/// halves of one seam-split label.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cluster {
    cities: Vec<CityId>,
    intervals: Vec<LabelInterval>,
}

impl Cluster {
    fn seeded(interval: LabelInterval) -> Self {
        let mut cluster = Self::default();
        cluster.push(interval);
        cluster
    }

    fn push(&mut self, interval: LabelInterval) {
        if !self.cities.contains(&interval.city) {
            self.cities.push(interval.city.clone());
        }
        self.intervals.push(interval);
    }

    fn absorb(&mut self, other: Cluster) {
        other.intervals.into_iter().for_each(|i| self.push(i));
    }

    fn collides_with(&self, interval: &LabelInterval) -> bool {
        self.intervals.iter().any(|i| i.overlaps(interval))
    }

    /// Unique members in the order they joined.
    pub fn cities(&self) -> &[CityId] {
        &self.cities
    }

    pub fn intervals(&self) -> &[LabelInterval] {
        &self.intervals
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    pub fn is_singleton(&self) -> bool {
        self.cities.len() == 1
    }

    pub fn contains(&self, city: &CityId) -> bool {
        self.cities.contains(city)
    }

    /// Members sorted by label center, ties broken by id.
    pub fn cities_by_angle(&self) -> Vec<&CityId> {
        let mut members: Vec<(&CityId, f64)> = self
            .cities
            .iter()
            .filter_map(|city| {
                self.intervals
                    .iter()
                    .find(|i| &i.city == city)
                    .map(|i| (city, i.center))
            })
            .collect();
        members.sort_by(|a, b| a.1.total_cmp(&b.1).then_with(|| a.0.cmp(b.0)));
        members.into_iter().map(|(city, _)| city).collect()
    }
}

/// Start ascending, ties by city id, so the result is independent of input order.
pub fn sort_intervals(intervals: &mut [LabelInterval]) {
    intervals.sort_by(|a, b| {
        a.sector
            .start
            .total_cmp(&b.sector.start)
            .then_with(|| a.city.cmp(&b.city))
    });
}

/// Single sorted pass followed by one first/last merge across the seam.
///
/// Only the first and last cluster are checked for seam adjacency. An earlier
/// cluster that also ends next to 2π stays on its own, and nothing is chained.
pub fn build_clusters(mut intervals: Vec<LabelInterval>) -> Vec<Cluster> {
    sort_intervals(&mut intervals);

    let mut clusters: Vec<Cluster> = Vec::new();
    for interval in intervals {
        let colliding = clusters.iter().position(|c| c.collides_with(&interval));
        let home = clusters.iter().position(|c| c.contains(&interval.city));

        let target = match (colliding, home) {
            (Some(a), Some(b)) if a != b => {
                // second half of a split label bridges two clusters
                let (keep, drop) = (a.min(b), a.max(b));
                let merged = clusters.remove(drop);
                clusters[keep].absorb(merged);
                Some(keep)
            }
            (Some(index), _) | (None, Some(index)) => Some(index),
            (None, None) => None,
        };

        match target {
            Some(index) => clusters[index].push(interval),
            None => clusters.push(Cluster::seeded(interval)),
        }
    }

    merge_across_seam(&mut clusters);
    clusters
}

fn seam_gap(last: &LabelInterval, first: &LabelInterval) -> f64 {
    (TAU - last.sector.end) + first.sector.start
}

fn merge_across_seam(clusters: &mut Vec<Cluster>) {
    if clusters.len() < 2 {
        return;
    }

    let (first, last) = (&clusters[0], &clusters[clusters.len() - 1]);
    let touching = first
        .intervals
        .iter()
        .filter(|f| f.sector.start < PI)
        .any(|f| {
            last.intervals
                .iter()
                .filter(|l| l.sector.end > PI)
                .any(|l| seam_gap(l, f) < SEAM_MERGE_GAP)
        });

    if touching && let Some(last) = clusters.pop() {
        log::trace!("Merging cluster {:?} across the seam", last.cities);
        clusters[0].absorb(last);
    }
}
