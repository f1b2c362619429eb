//! Local edit application
//!
//! Applies extracted intents straight onto a copy of an existing itinerary,
//! without a round trip to the generative service. Unmatched terms are
//! reported in the summary, never raised.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::intent::{EditIntent, extract_intents};
use crate::model::{CandidatePlace, Day, GENERIC_ACTIVITY, Itinerary, PlaceInfo, Visit, generic_description, reindex};
use crate::normalize::normalize;
use crate::resolve::{matches_term, pick_candidate_for_term};

/// Summary used when edits applied but produced no individual note
pub const DEFAULT_EDIT_SUMMARY: &str = "Updated the itinerary as requested.";

/// Result of a local edit
#[derive(Debug, Clone, PartialEq)]
pub struct EditOutcome {
    /// The updated copy; the caller's itinerary is untouched
    pub itinerary: Itinerary,
    /// Human-readable summary joining all notes
    pub summary: String,
    /// Per-term removal notes
    pub removed: Vec<String>,
    /// Per-place addition notes
    pub added: Vec<String>,
    /// Terms that could not be applied
    pub missed: Vec<String>,
}

/// Add requests and removal terms after flattening and dedup
#[derive(Debug, Default, PartialEq)]
struct EditPlan {
    remove_terms: Vec<String>,
    add_requests: Vec<(Option<usize>, String)>,
}

impl EditPlan {
    fn from_intents(intents: Vec<EditIntent>) -> Self {
        let mut plan = Self::default();
        let mut seen_remove = HashSet::new();
        let mut seen_add = HashSet::new();

        let mut push_remove = |plan: &mut Self, term: String| {
            let key = normalize(&term);
            if !key.is_empty() && seen_remove.insert(key) {
                plan.remove_terms.push(term);
            }
        };
        let mut push_add = |plan: &mut Self, day: Option<usize>, term: String| {
            let key = (day, normalize(&term));
            if !key.1.is_empty() && seen_add.insert(key) {
                plan.add_requests.push((day, term));
            }
        };

        for intent in intents {
            match intent {
                EditIntent::Remove { term } => push_remove(&mut plan, term),
                EditIntent::Add { day, term } => push_add(&mut plan, day, term),
                EditIntent::Replace { old, new, day } => {
                    push_remove(&mut plan, old);
                    push_add(&mut plan, day, new);
                }
            }
        }
        plan
    }

    fn is_empty(&self) -> bool {
        self.remove_terms.is_empty() && self.add_requests.is_empty()
    }
}

/// Apply a free-text edit instruction to an itinerary.
///
/// Returns `None` when the itinerary is empty, the instruction is blank, or no
/// add/remove/replace intent is recognized; the caller then falls back to
/// regeneration or shows guidance.
///
/// Add requests resolve against `places` first and then against places
/// already in the itinerary, so "move X to day 2" works without candidates.
pub fn apply_edit_locally(instruction: &str, current: &[Day], places: &[CandidatePlace]) -> Option<EditOutcome> {
    debug!(
        instruction_len = instruction.len(),
        day_count = current.len(),
        place_count = places.len(),
        "apply_edit_locally: called"
    );
    if current.is_empty() || instruction.trim().is_empty() {
        debug!("apply_edit_locally: empty itinerary or blank instruction");
        return None;
    }

    let plan = EditPlan::from_intents(extract_intents(instruction));
    if plan.is_empty() {
        debug!("apply_edit_locally: no recognized intent");
        return None;
    }

    let mut edited: Itinerary = current.to_vec();
    let mut removed = Vec::new();
    let mut added = Vec::new();
    let mut missed = Vec::new();

    for term in &plan.remove_terms {
        let count = remove_matching(&mut edited, term);
        if count > 0 {
            removed.push(format!("'{}' removed ({})", term, count));
        } else {
            missed.push(format!("'{}' no match found to remove", term));
        }
    }

    let pool = candidate_pool(places, current);
    for (day, term) in &plan.add_requests {
        let Some(candidate) = pick_candidate_for_term(term, &pool) else {
            missed.push(format!("'{}' no matching place found to add", term));
            continue;
        };
        let title = candidate.title.trim();
        if title.is_empty() {
            missed.push(format!("'{}' could not be added", term));
            continue;
        }

        let target = target_day_index(*day, edited.len());
        let visit = match detach_visit(&mut edited, title) {
            Some(mut existing) => {
                existing.backfill(&candidate.info());
                if existing.description.trim().is_empty() {
                    existing.description = generic_description(title);
                }
                if existing.activity.trim().is_empty() {
                    existing.activity = GENERIC_ACTIVITY.to_string();
                }
                existing
            }
            None => Visit::generic(title, &candidate.info()),
        };

        if let Some(target_day) = edited.get_mut(target) {
            target_day.visits.push(visit);
            added.push(format!("added '{}' to day {}", title, target + 1));
        }
    }

    reindex(&mut edited);

    let mut parts = Vec::new();
    if !removed.is_empty() {
        parts.push(removed.join(", "));
    }
    if !added.is_empty() {
        parts.push(added.join(", "));
    }
    if !missed.is_empty() {
        parts.push(format!("Not applied: {}", missed.join(", ")));
    }
    let summary = if parts.is_empty() {
        DEFAULT_EDIT_SUMMARY.to_string()
    } else {
        parts.join(" / ")
    };

    info!(
        removed = removed.len(),
        added = added.len(),
        missed = missed.len(),
        "apply_edit_locally: applied"
    );
    Some(EditOutcome {
        itinerary: edited,
        summary,
        removed,
        added,
        missed,
    })
}

/// Drop every visit whose place or address matches the term; returns the count
fn remove_matching(itinerary: &mut [Day], term: &str) -> usize {
    let mut count = 0;
    for day in itinerary.iter_mut() {
        let before = day.visits.len();
        day.visits.retain(|v| !matches_term(term, &v.place, &v.address));
        count += before - day.visits.len();
    }
    debug!(%term, count, "remove_matching: done");
    count
}

/// Take every visit of `title` out of the itinerary, returning the first one
fn detach_visit(itinerary: &mut [Day], title: &str) -> Option<Visit> {
    let key = normalize(title);
    let mut detached = None;
    for day in itinerary.iter_mut() {
        let mut kept = Vec::with_capacity(day.visits.len());
        for visit in day.visits.drain(..) {
            if normalize(&visit.place) == key {
                if detached.is_none() {
                    detached = Some(visit);
                }
            } else {
                kept.push(visit);
            }
        }
        day.visits = kept;
    }
    detached
}

/// Clamp a requested day into the itinerary; unspecified means the last day
fn target_day_index(requested: Option<usize>, day_count: usize) -> usize {
    let last = day_count.saturating_sub(1);
    requested.map_or(last, |d| d.min(last))
}

/// Supplied candidates followed by the places already scheduled, one entry per title
fn candidate_pool(places: &[CandidatePlace], current: &[Day]) -> Vec<CandidatePlace> {
    let mut seen: HashSet<String> = places.iter().map(|p| normalize(&p.title)).collect();
    let mut pool = places.to_vec();
    for visit in current.iter().flat_map(|d| d.visits.iter()) {
        let key = normalize(&visit.place);
        if key.is_empty() || !seen.insert(key) {
            continue;
        }
        let info = PlaceInfo::from(visit);
        pool.push(CandidatePlace {
            title: visit.place.trim().to_string(),
            address: info.address,
            image: info.image,
            latitude: info.latitude,
            longitude: info.longitude,
            external_id: None,
        });
    }
    pool
}
