//! Itinerary data model
//!
//! Field names on the wire follow the planner's response shape
//! (`day`/`date`/`plan` per day, `order`/`place`/... per visit) so the same
//! types serialize straight into API responses and CLI output.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// A full multi-day plan, in presentation order
pub type Itinerary = Vec<Day>;

/// One day of an itinerary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Day {
    /// Display label ("Day 1", ...)
    #[serde(rename = "day", default)]
    pub label: String,

    /// ISO date (YYYY-MM-DD) or empty when unknown
    #[serde(default)]
    pub date: String,

    /// Visits in presentation order; `order` mirrors the 1-based position
    #[serde(rename = "plan", default)]
    pub visits: Vec<Visit>,
}

impl Day {
    /// Create an empty day
    pub fn new(label: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            date: date.into(),
            visits: Vec::new(),
        }
    }

    /// Default label for the day at a zero-based position
    pub fn default_label(index: usize) -> String {
        format!("Day {}", index + 1)
    }
}

/// One scheduled stop within a day
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Visit {
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub place: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub activity: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
}

impl Visit {
    /// Synthesize a visit for a place with a generic description/activity.
    ///
    /// `order` is left at 0; callers reindex once all mutations are done.
    pub fn generic(title: &str, info: &PlaceInfo) -> Self {
        debug!(%title, "Visit::generic: called");
        Self {
            order: 0,
            place: title.to_string(),
            description: generic_description(title),
            activity: GENERIC_ACTIVITY.to_string(),
            address: info.address.clone(),
            image: info.image.clone(),
            latitude: info.latitude,
            longitude: info.longitude,
        }
    }

    /// Fill blank fields from canonical place data, keeping what is already set
    pub fn backfill(&mut self, info: &PlaceInfo) {
        if self.address.trim().is_empty() {
            self.address = info.address.clone();
        }
        if self.image.trim().is_empty() {
            self.image = info.image.clone();
        }
        if self.latitude == 0.0 {
            self.latitude = info.latitude;
        }
        if self.longitude == 0.0 {
            self.longitude = info.longitude;
        }
    }
}

/// Activity text used for synthesized visits
pub const GENERIC_ACTIVITY: &str = "Recommended place visit";

/// Description text used for synthesized visits
pub fn generic_description(title: &str) -> String {
    format!("Visit {}", title)
}

/// An available, coordinate-bearing point of interest
///
/// Accepts both its own field names and the raw tourism-API names
/// (`addr1`, `firstimage`, `mapy`, `mapx`, `contentid`) when deserializing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidatePlace {
    pub title: String,
    #[serde(default, alias = "addr1")]
    pub address: String,
    #[serde(default, alias = "firstimage")]
    pub image: String,
    #[serde(default, alias = "mapy")]
    pub latitude: f64,
    #[serde(default, alias = "mapx")]
    pub longitude: f64,
    #[serde(default, alias = "contentid", skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
}

impl CandidatePlace {
    /// Create a candidate with the given title and coordinates
    pub fn new(title: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            title: title.into(),
            latitude,
            longitude,
            ..Default::default()
        }
    }

    /// Set the address
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    /// Set the image URL
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    /// True when both coordinates are non-zero
    pub fn has_coordinates(&self) -> bool {
        self.latitude != 0.0 && self.longitude != 0.0
    }

    /// Canonical data for this place
    pub fn info(&self) -> PlaceInfo {
        PlaceInfo {
            address: self.address.clone(),
            image: self.image.clone(),
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// Canonical enrichment data for a place title
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlaceInfo {
    pub address: String,
    pub image: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<&Visit> for PlaceInfo {
    fn from(visit: &Visit) -> Self {
        Self {
            address: visit.address.clone(),
            image: visit.image.clone(),
            latitude: visit.latitude,
            longitude: visit.longitude,
        }
    }
}

/// Desired visits per day for freshly generated itineraries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaceTarget {
    pub min_visits: usize,
    pub max_visits: usize,
}

/// Named pacing preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pace {
    Relaxed,
    Normal,
    Packed,
}

impl Pace {
    /// Visit-count bounds for this pace
    pub fn target(&self) -> PaceTarget {
        let (min_visits, max_visits) = match self {
            Self::Relaxed => (2, 3),
            Self::Normal => (3, 4),
            Self::Packed => (4, 5),
        };
        PaceTarget { min_visits, max_visits }
    }

    /// Parse a pacing preference, `None` when unrecognized
    pub fn parse(s: &str) -> Option<Self> {
        s.parse().ok()
    }
}

impl std::fmt::Display for Pace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Relaxed => write!(f, "relaxed"),
            Self::Normal => write!(f, "normal"),
            Self::Packed => write!(f, "packed"),
        }
    }
}

impl std::str::FromStr for Pace {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "여유롭게" | "relaxed" => Ok(Self::Relaxed),
            "보통" | "normal" => Ok(Self::Normal),
            "알차게" | "packed" => Ok(Self::Packed),
            _ => Err(format!("Unknown pace: {}", s)),
        }
    }
}

/// Rewrite every day's `order` fields to 1..N
pub fn reindex(itinerary: &mut [Day]) {
    for day in itinerary.iter_mut() {
        for (i, visit) in day.visits.iter_mut().enumerate() {
            visit.order = (i + 1) as u32;
        }
    }
}
