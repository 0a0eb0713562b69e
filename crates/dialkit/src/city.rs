use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;
use derive_more::{AsRef, Deref, Display, From, Into};
use serde::{Deserialize, Serialize};

#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    Deref,
    From,
    Into,
    AsRef,
)]
#[serde(transparent)]
pub struct CityId(String);

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct CityCode(String);

/// IANA time-zone name, e.g. `Asia/Tokyo`. Kept as text so a selection with a
/// stale or misspelled zone still loads; resolution happens per call.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct ZoneName(String);

crate::impl_string_newtype!(CityId, CityCode, ZoneName);

impl CityCode {
    /// Letters the label is drawn with. Never zero, so an empty code still
    /// occupies one letter of arc.
    pub fn letter_count(&self) -> usize {
        self.chars().count().max(1)
    }
}

impl ZoneName {
    pub fn resolve(&self) -> Option<Tz> {
        self.trim().parse::<Tz>().ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub id: CityId,
    pub code: CityCode,
    #[serde(default)]
    pub zone: Option<ZoneName>,
}

impl City {
    pub fn new(id: impl Into<String>, code: impl Into<String>, zone: impl Into<String>) -> Self {
        Self {
            id: CityId::new(id),
            code: CityCode::new(code),
            zone: Some(ZoneName::new(zone)),
        }
    }

    pub fn without_zone(id: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            id: CityId::new(id),
            code: CityCode::new(code),
            zone: None,
        }
    }

    pub fn time_zone(&self) -> Option<Tz> {
        self.zone.as_ref().and_then(ZoneName::resolve)
    }

    pub fn local_time(&self, at: DateTime<Utc>) -> Option<DateTime<Tz>> {
        self.time_zone().map(|tz| at.with_timezone(&tz))
    }

    /// Local civil time as `hour + minute / 60`, in `[0, 24)`.
    pub fn hour24(&self, at: DateTime<Utc>) -> Option<f64> {
        self.local_time(at)
            .map(|local| local.hour() as f64 + local.minute() as f64 / 60.0)
    }
}
