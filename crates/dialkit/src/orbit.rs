use crate::city::CityId;
use crate::cluster::Cluster;
use std::collections::BTreeMap;
use strum::{Display as StrumDisplay, EnumIter, EnumString, IntoEnumIterator};

/// One of the two label rings around the dial. Parses from "inner" or "outer".
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, EnumString, StrumDisplay,
)]
#[strum(ascii_case_insensitive)]
pub enum Orbit {
    #[strum(to_string = "inner")]
    Inner,
    #[strum(to_string = "outer")]
    Outer,
}

impl Orbit {
    pub fn number(self) -> u8 {
        match self {
            Orbit::Inner => 1,
            Orbit::Outer => 2,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        Self::iter().find(|orbit| orbit.number() == number)
    }

    /// Orbit for the `index`-th member of a cluster walked in angle order.
    fn alternating(index: usize) -> Self {
        if index % 2 == 0 {
            Orbit::Inner
        } else {
            Orbit::Outer
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrbitAssignment {
    orbits: BTreeMap<CityId, Orbit>,
}

impl OrbitAssignment {
    pub fn get(&self, city: &CityId) -> Option<Orbit> {
        self.orbits.get(city).copied()
    }

    pub fn contains(&self, city: &CityId) -> bool {
        self.orbits.contains_key(city)
    }

    pub fn len(&self) -> usize {
        self.orbits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orbits.is_empty()
    }

    /// Entries in city id order.
    pub fn iter(&self) -> impl Iterator<Item = (&CityId, Orbit)> {
        self.orbits.iter().map(|(city, orbit)| (city, *orbit))
    }

    pub fn count(&self, orbit: Orbit) -> usize {
        self.orbits.values().filter(|&&o| o == orbit).count()
    }

    pub fn cities_on(&self, orbit: Orbit) -> impl Iterator<Item = &CityId> {
        self.iter()
            .filter(move |(_, o)| *o == orbit)
            .map(|(city, _)| city)
    }

    /// Orbit holding fewer cities so far; the inner one on a tie.
    fn lighter(&self) -> Orbit {
        if self.count(Orbit::Outer) < self.count(Orbit::Inner) {
            Orbit::Outer
        } else {
            Orbit::Inner
        }
    }

    /// First assignment wins; later ones for the same city are ignored.
    fn place(&mut self, city: &CityId, orbit: Orbit) {
        if !self.orbits.contains_key(city) {
            self.orbits.insert(city.clone(), orbit);
        }
    }
}

/// Greedy balance over clusters in order.
///
/// Singletons go to the lighter orbit. Larger clusters alternate inner/outer
/// along the dial so neighbouring labels never share a ring. Clusters of three or
/// more still alternate, which leaves same-ring overlaps for the conflict policy
/// to report.
pub fn balance(clusters: &[Cluster]) -> OrbitAssignment {
    let mut assignment = OrbitAssignment::default();

    for cluster in clusters {
        if cluster.is_singleton() {
            let orbit = assignment.lighter();
            assignment.place(&cluster.cities()[0], orbit);
        } else {
            for (index, city) in cluster.cities_by_angle().into_iter().enumerate() {
                assignment.place(city, Orbit::alternating(index));
            }
        }
    }

    assignment
}
