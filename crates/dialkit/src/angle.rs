//! Angles on the 24-hour dial and closed sectors of the circle.

use std::f64::consts::TAU;

/// Local hour drawn at angle zero.
pub const REFERENCE_HOUR: f64 = 18.0;
/// 15° per hour.
pub const RADIANS_PER_HOUR: f64 = TAU / 24.0;

/// Reduces `angle` into `[0, 2π)`. Non-finite input maps to zero.
pub fn normalize_angle(angle: f64) -> f64 {
    if !angle.is_finite() {
        return 0.0;
    }
    let reduced = angle.rem_euclid(TAU);
    // tiny negative inputs round up to exactly TAU
    if reduced >= TAU { 0.0 } else { reduced }
}

/// Dial angle of the arrow for a local time given as `hour + minute / 60`.
///
/// 18:00 sits at zero and every further hour moves the arrow back by 15°. Anything
/// that draws arrows has to go through this function, otherwise labels drift away
/// from the arrows they belong to.
pub fn arrow_angle(hour24: f64) -> f64 {
    normalize_angle((REFERENCE_HOUR - hour24) * RADIANS_PER_HOUR)
}

/// Closed sector `[start, end]` of the circle, in radians.
///
/// Sectors used for overlap tests never wrap: `start <= end`, both within
/// `[0, 2π]`. Free sectors returned by [`free_sectors`] may cross the seam, in
/// which case `start > end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sector {
    pub start: f64,
    pub end: f64,
}

impl Sector {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn full() -> Self {
        Self::new(0.0, TAU)
    }

    pub fn wraps(&self) -> bool {
        self.start > self.end
    }

    pub fn width(&self) -> f64 {
        if self.wraps() {
            TAU - self.start + self.end
        } else {
            self.end - self.start
        }
    }

    pub fn overlaps(&self, other: &Sector) -> bool {
        intervals_overlap(self, other)
    }
}

/// Closed-interval overlap. Touching endpoints count as overlapping.
pub fn intervals_overlap(a: &Sector, b: &Sector) -> bool {
    !(a.end < b.start || b.end < a.start)
}

/// Unions non-wrapping sectors into disjoint ones, sorted by start.
pub fn merge_sectors(sectors: impl IntoIterator<Item = Sector>) -> Vec<Sector> {
    let mut sorted: Vec<Sector> = sectors.into_iter().collect();
    sorted.sort_by(|a, b| a.start.total_cmp(&b.start));

    let mut merged: Vec<Sector> = Vec::with_capacity(sorted.len());
    for sector in sorted {
        match merged.last_mut() {
            Some(last) if last.overlaps(&sector) => last.end = last.end.max(sector.end),
            _ => merged.push(sector),
        }
    }
    merged
}

/// Arcs of the circle not covered by any of `occupied`, at least `min_width`
/// wide. The gap around the seam is reported as one wrapping sector.
pub fn free_sectors(occupied: impl IntoIterator<Item = Sector>, min_width: f64) -> Vec<Sector> {
    let merged = merge_sectors(occupied);
    let (Some(first), Some(last)) = (merged.first(), merged.last()) else {
        return vec![Sector::full()];
    };

    let mut gaps: Vec<Sector> = merged
        .windows(2)
        .map(|pair| Sector::new(pair[0].end, pair[1].start))
        .collect();

    let (tail, head) = (TAU - last.end, first.start);
    if tail + head > 0.0 {
        let seam_gap = if tail <= 0.0 {
            Sector::new(0.0, head)
        } else if head <= 0.0 {
            Sector::new(last.end, TAU)
        } else {
            Sector::new(last.end, head)
        };
        gaps.push(seam_gap);
    }

    gaps.retain(|gap| gap.width() > 0.0 && gap.width() >= min_width);
    gaps
}
