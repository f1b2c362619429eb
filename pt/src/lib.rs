//! PlanMyTrip - travel itinerary planner
//!
//! Builds day-by-day itineraries from tourism place data and a generative
//! model, and applies plain-language edits ("remove Haeundae", "add
//! Gamcheon Culture Village to day 2") locally when they can be understood
//! without a model call. The reconciliation rules themselves live in the
//! `itinerary` crate; this crate wires them to configuration, the place
//! service, the model service and the `pt` command line.

pub mod cli;
pub mod config;
pub mod llm;
pub mod places;
pub mod planner;
pub mod prompt;
pub mod request;

pub use config::Config;
pub use planner::{PlanError, Planner};
pub use request::{PlanRequest, PlanResponse};
