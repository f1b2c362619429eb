//! Prompts for the generative service
//!
//! Two modes share one payload shape: generation builds an itinerary from
//! the candidate list, edit rewrites `baseSchedule` according to the user's
//! instruction. Both ask for a bare JSON object matching [`response_shape`].

use itinerary::{CandidatePlace, Pace, parse_date_range};
use serde_json::{Value, json};
use tracing::debug;

use crate::request::{Companions, PlanRequest};

const GENERATION_SYSTEM: &str = "You are a travel planner who builds calm, well-paced trips.\n\
Always respect the requested region and date range.\n\
Only use places whose title appears in candidates; never invent places.\n\
Reply with JSON only, no prose and no markdown.\n\
Follow response_schema exactly.\n";

const EDIT_SYSTEM: &str = "You are a travel itinerary editor.\n\
Apply editRequest to baseSchedule.\n\
Keep every place and date the user did not mention.\n\
Newly added places must use a title from candidates.\n\
Remove every place, keyword or area the user asked to remove.\n\
Reply with JSON only, no prose and no markdown.\n\
Follow response_schema exactly.\n";

const GENERATION_RULES: &[&str] = &[
    "place must be one of candidates.title",
    "copy latitude/longitude from the matching candidate",
    "include one lodging for trips of two or more days",
    "choose places that match the keywords and mood of userInput first",
    "leave out places that do not fit travelTypes",
    "prefer candidates with an image over candidates without one",
    "with public transportation prefer short hops and easy access",
    "with a car, scenic drives and outlying spots are fine",
    "relaxed pace means 2-3 places a day, normal 3-4, packed 4-5",
];

const EDIT_RULES: &[&str] = &[
    "keep the day/date structure of baseSchedule where possible",
    "place must be an existing baseSchedule place or one of candidates.title",
    "remove places or areas the user asked to remove",
    "put additions on the day the user named",
    "order restarts at 1 on every day and has no gaps",
    "text briefly summarizes what changed",
];

/// Extra rule for the travelling party
pub fn companion_rule(companions: Companions) -> &'static str {
    match companions {
        Companions::Solo => {
            "solo trip: favor places that are comfortable alone, such as solo-friendly restaurants, walking trails and cultural spaces"
        }
        Companions::Couple => "couple trip: favor night views, mood cafes and small romantic places",
        Companions::Family => {
            "family trip with children: favor kid-friendly attractions, hands-on programs and wide, safe spaces"
        }
        Companions::Friends => "trip with friends: favor active, fun attractions and restaurants that seat groups",
    }
}

/// Extra rule for the pacing preference
pub fn pace_rule(pace: Pace) -> &'static str {
    match pace {
        Pace::Relaxed => "visit only 2-3 places a day and leave plenty of time at each",
        Pace::Normal => "spread 3-4 places evenly over each day",
        Pace::Packed => "visit up to 4-5 places a day and order them to keep travel short",
    }
}

/// Literal example of the expected reply
pub fn response_shape() -> Value {
    json!({
        "text": "string",
        "travelSchedule": [{
            "day": "Day 1",
            "date": "YYYY-MM-DD",
            "plan": [{
                "order": 1,
                "place": "string",
                "description": "string",
                "activity": "string",
                "address": "string",
                "image": "string",
                "latitude": 0.0,
                "longitude": 0.0
            }]
        }]
    })
}

/// System instruction and JSON payload for one call
#[derive(Debug, Clone)]
pub struct Prompt {
    pub system: String,
    pub payload: Value,
}

impl Prompt {
    /// Build the prompt; edit mode when the request carries an itinerary
    pub fn build(request: &PlanRequest, candidates: &[CandidatePlace], dates: &[String]) -> Self {
        let edit_mode = !request.base_schedule().is_empty();
        debug!(edit_mode, candidates = candidates.len(), "Prompt::build: called");

        let (start, end) = parse_date_range(&request.date);

        let base_rules = if edit_mode { EDIT_RULES } else { GENERATION_RULES };
        let mut rules: Vec<&str> = base_rules.to_vec();
        if let Some(companions) = request.companions() {
            rules.push(companion_rule(companions));
        }
        if let Some(pace) = request.pace() {
            rules.push(pace_rule(pace));
        }

        let mut payload = json!({
            "region": request.region,
            "date_range": {"start": start, "end": end},
            "travelTypes": request.travel_types(),
            "transportation": request.transportation,
            "companions": request.companions,
            "pace": request.pace,
            "candidates": candidates,
            "response_schema": response_shape(),
            "rules": rules,
            "date_hint_list": dates,
        });

        let system = if edit_mode {
            payload["editRequest"] = json!(request.user_input);
            payload["baseSchedule"] = json!(request.base_schedule());
            EDIT_SYSTEM
        } else {
            payload["userInput"] = json!(request.user_input);
            GENERATION_SYSTEM
        };

        Self {
            system: system.to_string(),
            payload,
        }
    }

    /// Payload as the user message text
    pub fn user_message(&self) -> String {
        self.payload.to_string()
    }
}
