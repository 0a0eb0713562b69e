//! Label layout for a 24-hour world-clock dial.
//!
//! Every city gets an arrow at the angle of its local time. Arrow labels are
//! spread over two rings ([`Orbit::Inner`] and [`Orbit::Outer`]) so that labels
//! sharing a ring do not overlap and both rings stay about equally full.
//!
//! ```no_run
//! use chrono::Utc;
//! use dialkit::{City, LabelMetrics, assign_orbits};
//!
//! let cities = [
//!     City::new("tokyo", "TYO", "Asia/Tokyo"),
//!     City::new("seoul", "SEL", "Asia/Seoul"),
//! ];
//! let assignment = assign_orbits(&cities, Utc::now(), &LabelMetrics::default());
//! for (city, orbit) in assignment.iter() {
//!     println!("{city}: {}", orbit.number());
//! }
//! ```

pub mod angle;
pub mod city;
pub mod cluster;
pub mod conflict;
pub mod label;
pub mod layout;
pub mod macros;
pub mod orbit;

pub use angle::{Sector, arrow_angle, intervals_overlap, normalize_angle};
pub use city::{City, CityCode, CityId, ZoneName};
pub use conflict::{AdditionError, Conflict, ConflictPolicy, check_addition, find_conflicts};
pub use label::{LabelMetrics, LabelPlacement};
pub use layout::{DialLayout, assign_orbits};
pub use orbit::{Orbit, OrbitAssignment};
