//! Plain-text rendering of layouts and conflicts for the terminal.

use chrono::{DateTime, Utc};
use dialkit::conflict::Conflict;
use dialkit::{City, DialLayout, Orbit, Sector};

/// One line per city in selection order. Cities without a usable zone are listed
/// but marked as not placed.
pub fn assignment_lines(cities: &[City], layout: &DialLayout, at: DateTime<Utc>) -> Vec<String> {
    cities
        .iter()
        .map(|city| {
            let orbit = layout.assignment().get(&city.id);
            match (orbit, layout.placement(&city.id), city.local_time(at)) {
                (Some(orbit), Some(placement), Some(local)) => format!(
                    "{:<4} {:<14} {}  {:>5.1}°  {} ({})",
                    city.code.as_str(),
                    city.id.as_str(),
                    local.format("%H:%M"),
                    placement.center.to_degrees(),
                    orbit,
                    orbit.number()
                ),
                _ => format!(
                    "{:<4} {:<14} --:--  not placed",
                    city.code.as_str(),
                    city.id.as_str()
                ),
            }
        })
        .collect()
}

pub fn orbit_summary(layout: &DialLayout, orbit: Orbit) -> String {
    let widest = layout
        .free_sectors(orbit, 0.0)
        .iter()
        .map(Sector::width)
        .fold(0.0_f64, f64::max);
    format!(
        "{}: {} labels, widest gap {:.1}°",
        orbit,
        layout.assignment().count(orbit),
        widest.to_degrees()
    )
}

pub fn free_sector_lines(layout: &DialLayout, orbit: Orbit, min_width: f64) -> Vec<String> {
    layout
        .free_sectors(orbit, min_width)
        .iter()
        .map(|sector| {
            format!(
                "{}: {:>5.1}° .. {:>5.1}°  ({:.1}°)",
                orbit,
                sector.start.to_degrees(),
                sector.end.to_degrees(),
                sector.width().to_degrees()
            )
        })
        .collect()
}

pub fn conflict_lines(conflicts: &[Conflict]) -> Vec<String> {
    if conflicts.is_empty() {
        return vec!["no conflicts".to_string()];
    }
    conflicts
        .iter()
        .map(|conflict| format!("crowded: {}", conflict))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use dialkit::{CityId, LabelMetrics};

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_assignment_lines() {
        let cities = vec![
            City::new("london", "LON", "Europe/London"),
            City::without_zone("unzoned", "UNZ"),
        ];
        let layout = DialLayout::compute(&cities, noon(), &LabelMetrics::default());
        let lines = assignment_lines(&cities, &layout, noon());

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "LON  london         12:00   90.0°  inner (1)");
        assert!(lines[1].ends_with("not placed"));
    }

    #[test]
    fn test_orbit_summary_on_empty_orbit() {
        let cities = vec![City::new("london", "LON", "Europe/London")];
        let layout = DialLayout::compute(&cities, noon(), &LabelMetrics::default());

        assert_eq!(
            orbit_summary(&layout, Orbit::Outer),
            "outer: 0 labels, widest gap 360.0°"
        );
    }

    #[test]
    fn test_conflict_lines() {
        assert_eq!(conflict_lines(&[]), vec!["no conflicts"]);

        let conflict = Conflict {
            cities: vec![CityId::new("a"), CityId::new("b"), CityId::new("c")],
            collisions: vec![(CityId::new("a"), CityId::new("c"))],
        };
        assert_eq!(
            conflict_lines(&[conflict]),
            vec!["crowded: a, b, c (1 same-ring overlaps)"]
        );
    }
}
