//! Itinerary - edit and reconciliation core for PlanMyTrip
//!
//! Keeps multi-day travel itineraries valid while they are edited by
//! free-text instructions or rebuilt from untrusted generated output.
//! Everything here is synchronous and pure: every operation takes its inputs
//! by reference and returns a fresh copy.
//!
//! # Modules
//!
//! - [`normalize`] - Lowercase/whitespace-free comparison keys
//! - [`resolve`] - Fuzzy place-name resolution and candidate ranking
//! - [`intent`] - Edit instruction chunking and intent extraction
//! - [`edit`] - Local edit application
//! - [`clean`] - Generated-schedule cleaning
//! - [`pace`] - Visits-per-day enforcement
//! - [`catalog`] - Candidate list, place lookup and permitted titles
//! - [`document`] - Extraction of itineraries from generated text
//! - [`dates`] - Trip date ranges
//! - [`model`] - Itinerary data types

pub mod catalog;
pub mod clean;
pub mod dates;
pub mod document;
pub mod edit;
pub mod error;
pub mod intent;
pub mod model;
pub mod normalize;
pub mod pace;
pub mod resolve;
mod vocab;

pub use catalog::{Catalog, DEFAULT_CANDIDATE_LIMIT, PlaceLookup, build_candidates};
pub use clean::clean_schedule;
pub use dates::{DEFAULT_MAX_DAYS, date_list, expected_dates, normalize_date_str, parse_date_range};
pub use document::{GeneratedPlan, RawDay, RawVisit, SCHEDULE_KEY, extract_json_object};
pub use edit::{DEFAULT_EDIT_SUMMARY, EditOutcome, apply_edit_locally};
pub use error::ReconcileError;
pub use intent::{
    EditIntent, extract_intents, has_add_intent, has_edit_intent, has_replan_intent, needs_candidates, wants_local_edit,
};
pub use model::{CandidatePlace, Day, Itinerary, Pace, PaceTarget, PlaceInfo, Visit, reindex};
pub use normalize::normalize;
pub use pace::enforce_pace;
pub use resolve::{pick_candidate_for_term, resolve_against_known_titles};
