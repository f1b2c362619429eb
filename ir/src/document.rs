//! Untrusted generated documents
//!
//! Output from the generative service is free text that should contain a JSON
//! object shaped like an itinerary. Nothing about it is trusted: the JSON is
//! dug out of surrounding noise and every field is coerced one by one into
//! [`RawDay`]/[`RawVisit`], defaulting whatever has the wrong type.

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ReconcileError;
use crate::model::{Day, Visit};

/// Key holding the itinerary array in a generated document
pub const SCHEDULE_KEY: &str = "travelSchedule";

/// Pull the first JSON object out of arbitrary text.
///
/// Tries the whole string first, then the span from the first `{` to the last
/// `}`. Arrays and scalars do not count.
pub fn extract_json_object(text: &str) -> Option<Map<String, Value>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(text) {
        return Some(map);
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str::<Value>(&text[start..=end]) {
        Ok(Value::Object(map)) => Some(map),
        _ => {
            debug!("extract_json_object: brace span did not parse");
            None
        }
    }
}

/// A parsed generated plan, still untrusted
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeneratedPlan {
    /// Model-written summary, when present and non-blank
    pub text: Option<String>,
    pub days: Vec<RawDay>,
}

impl GeneratedPlan {
    /// Parse model output; fails unless an object with a `travelSchedule` array is found
    pub fn from_text(text: &str) -> Result<Self, ReconcileError> {
        debug!(text_len = text.len(), "GeneratedPlan::from_text: called");
        let object = extract_json_object(text)
            .ok_or_else(|| ReconcileError::MalformedOutput("no JSON object found".to_string()))?;

        let Some(Value::Array(days)) = object.get(SCHEDULE_KEY) else {
            return Err(ReconcileError::MalformedOutput(format!(
                "missing '{}' array",
                SCHEDULE_KEY
            )));
        };

        let summary = object
            .get("text")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(Self {
            text: summary,
            days: days.iter().filter_map(RawDay::from_value).collect(),
        })
    }
}

/// A day as received, before cleaning
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawDay {
    pub label: String,
    pub date: String,
    pub visits: Vec<RawVisit>,
}

impl RawDay {
    /// Coerce one array element; non-objects are skipped
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let visits = match object.get("plan") {
            Some(Value::Array(items)) => items.iter().filter_map(RawVisit::from_value).collect(),
            _ => Vec::new(),
        };
        Some(Self {
            label: string_field(object, "day"),
            date: string_field(object, "date"),
            visits,
        })
    }
}

impl From<&Day> for RawDay {
    fn from(day: &Day) -> Self {
        Self {
            label: day.label.clone(),
            date: day.date.clone(),
            visits: day.visits.iter().map(RawVisit::from).collect(),
        }
    }
}

/// A visit as received, before cleaning
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawVisit {
    pub place: String,
    pub description: String,
    pub activity: String,
    pub address: String,
    pub image: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl RawVisit {
    /// Coerce one plan element; non-objects are skipped
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        Some(Self {
            place: string_field(object, "place"),
            description: string_field(object, "description"),
            activity: string_field(object, "activity"),
            address: string_field(object, "address"),
            image: string_field(object, "image"),
            latitude: float_field(object, "latitude"),
            longitude: float_field(object, "longitude"),
        })
    }
}

impl From<&Visit> for RawVisit {
    fn from(visit: &Visit) -> Self {
        Self {
            place: visit.place.clone(),
            description: visit.description.clone(),
            activity: visit.activity.clone(),
            address: visit.address.clone(),
            image: visit.image.clone(),
            latitude: visit.latitude,
            longitude: visit.longitude,
        }
    }
}

/// String field; numbers are rendered, anything else is empty
fn string_field(object: &Map<String, Value>, key: &str) -> String {
    match object.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Float field; numeric strings are accepted, anything else is 0.0
fn float_field(object: &Map<String, Value>, key: &str) -> f64 {
    match object.get(key) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}
