//! Label widths and the angular intervals they occupy on the dial.

use crate::angle::{self, Sector};
use crate::city::{City, CityCode, CityId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

pub const DEFAULT_FONT_SIZE_RATIO: f64 = 0.12;
/// Letter advance relative to the font size.
pub const LETTER_SPACING_FACTOR: f64 = 0.6;

/// Angular size of label text. `font_size_ratio` is the font size expressed as
/// radians of arc on the label ring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelMetrics {
    pub font_size_ratio: f64,
}

impl Default for LabelMetrics {
    fn default() -> Self {
        Self {
            font_size_ratio: DEFAULT_FONT_SIZE_RATIO,
        }
    }
}

impl LabelMetrics {
    pub fn new(font_size_ratio: f64) -> Self {
        Self { font_size_ratio }
    }

    pub fn letter_spacing(&self) -> f64 {
        let ratio = if self.font_size_ratio.is_finite() && self.font_size_ratio > 0.0 {
            self.font_size_ratio
        } else {
            DEFAULT_FONT_SIZE_RATIO
        };
        ratio * LETTER_SPACING_FACTOR
    }

    pub fn padding(&self) -> f64 {
        self.letter_spacing() * 0.5
    }

    /// Full arc taken by `code`, padding on both sides included.
    pub fn span(&self, code: &CityCode) -> f64 {
        self.span_for_letters(code.letter_count())
    }

    pub fn span_for_letters(&self, letters: usize) -> f64 {
        letters.max(1) as f64 * self.letter_spacing() + 2.0 * self.padding()
    }
}

/// Where one city's label sits on the dial before it is given an orbit.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelPlacement {
    pub city: CityId,
    pub center: f64,
    pub span: f64,
}

impl LabelPlacement {
    pub fn new(city: CityId, center: f64, span: f64) -> Self {
        Self {
            city,
            center: angle::normalize_angle(center),
            span: span.max(0.0),
        }
    }

    /// `None` when the city's zone cannot be resolved.
    pub fn for_city(city: &City, at: DateTime<Utc>, metrics: &LabelMetrics) -> Option<Self> {
        let hour24 = city.hour24(at)?;
        Some(Self::new(
            city.id.clone(),
            angle::arrow_angle(hour24),
            metrics.span(&city.code),
        ))
    }

    /// One interval, or two when the label crosses the 0/2π seam.
    pub fn intervals(&self) -> Vec<LabelInterval> {
        if self.span >= TAU {
            return vec![self.interval(Sector::full())];
        }

        let half = self.span / 2.0;
        let start = angle::normalize_angle(self.center - half);
        let end = angle::normalize_angle(self.center + half);

        if start > end {
            vec![
                self.interval(Sector::new(start, TAU)),
                self.interval(Sector::new(0.0, end)),
            ]
        } else {
            vec![self.interval(Sector::new(start, end))]
        }
    }

    fn interval(&self, sector: Sector) -> LabelInterval {
        LabelInterval {
            city: self.city.clone(),
            center: self.center,
            sector,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabelInterval {
    pub city: CityId,
    pub center: f64,
    pub sector: Sector,
}

impl LabelInterval {
    pub fn overlaps(&self, other: &LabelInterval) -> bool {
        self.sector.overlaps(&other.sector)
    }
}
