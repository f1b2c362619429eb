//! Planning request and response shapes

use itinerary::{Day, Itinerary, Pace};
use serde::{Deserialize, Serialize};

/// Travel types as sent by front ends: `"관광,문화시설"` or `["관광", "문화시설"]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TravelTypes {
    List(Vec<String>),
    Joined(String),
}

impl Default for TravelTypes {
    fn default() -> Self {
        Self::Joined(String::new())
    }
}

impl TravelTypes {
    /// Trimmed, non-empty labels
    pub fn labels(&self) -> Vec<String> {
        let raw: Vec<&str> = match self {
            Self::List(items) => items.iter().map(String::as_str).collect(),
            Self::Joined(s) => s.split(',').collect(),
        };
        raw.into_iter()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Who is travelling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Companions {
    Solo,
    Couple,
    Family,
    Friends,
}

impl Companions {
    /// Parse a companions label, `None` when unrecognized
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "혼자" | "solo" | "alone" => Some(Self::Solo),
            "커플" | "couple" => Some(Self::Couple),
            "가족" | "family" => Some(Self::Family),
            "친구들" | "친구" | "friends" => Some(Self::Friends),
            _ => None,
        }
    }
}

/// A planning request from a front end
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlanRequest {
    /// Free-text wishes or edit instruction
    pub user_input: String,
    /// Loose date range ("2025. 12. 09 ~ 2025. 12. 10")
    pub date: String,
    pub region: String,
    pub travel_type: TravelTypes,
    pub transportation: String,
    pub companions: String,
    pub pace: String,
    /// Itinerary being edited, if any
    #[serde(alias = "travelSchedule", skip_serializing_if = "Option::is_none")]
    pub current_schedule: Option<Itinerary>,
}

impl PlanRequest {
    pub fn travel_types(&self) -> Vec<String> {
        self.travel_type.labels()
    }

    pub fn pace(&self) -> Option<Pace> {
        Pace::parse(&self.pace)
    }

    pub fn companions(&self) -> Option<Companions> {
        Companions::parse(&self.companions)
    }

    /// The itinerary being edited; empty when generating from scratch
    pub fn base_schedule(&self) -> &[Day] {
        self.current_schedule.as_deref().unwrap_or(&[])
    }
}

/// Planner answer: a short message plus the itinerary to show
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResponse {
    pub text: String,
    pub travel_schedule: Itinerary,
}

impl PlanResponse {
    pub fn new(text: impl Into<String>, travel_schedule: Itinerary) -> Self {
        Self {
            text: text.into(),
            travel_schedule,
        }
    }
}
