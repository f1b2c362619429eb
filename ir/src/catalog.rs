//! Candidate catalog for one reconciliation call
//!
//! Bundles the candidate list offered to the generative service, the
//! canonical lookup used for backfilling, and the Permitted Title Universe.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::model::{CandidatePlace, Day, PlaceInfo};

/// Default cap on candidates offered per call
pub const DEFAULT_CANDIDATE_LIMIT: usize = 100;

/// Canonical place data keyed by exact title
#[derive(Debug, Clone, Default)]
pub struct PlaceLookup {
    entries: HashMap<String, PlaceInfo>,
}

impl PlaceLookup {
    /// Canonical data for a title
    pub fn get(&self, title: &str) -> Option<&PlaceInfo> {
        self.entries.get(title)
    }

    /// Insert unless the title is already known
    pub fn insert_if_absent(&mut self, title: &str, info: PlaceInfo) {
        let title = title.trim();
        if title.is_empty() {
            return;
        }
        self.entries.entry(title.to_string()).or_insert(info);
    }

    /// Data for a title, or empty data when unknown
    pub fn info_or_default(&self, title: &str) -> PlaceInfo {
        self.get(title).cloned().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Image-bearing candidates first (stable within each group), trimmed,
/// deduplicated by title, capped at `limit`
pub fn build_candidates(places: &[CandidatePlace], limit: usize) -> Vec<CandidatePlace> {
    let (with_image, without_image): (Vec<&CandidatePlace>, Vec<&CandidatePlace>) =
        places.iter().partition(|p| !p.image.trim().is_empty());

    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    for place in with_image.into_iter().chain(without_image) {
        if out.len() >= limit {
            break;
        }
        let title = place.title.trim();
        if title.is_empty() || !seen.insert(title.to_string()) {
            continue;
        }
        out.push(CandidatePlace {
            title: title.to_string(),
            ..place.clone()
        });
    }
    out
}

/// Everything the cleaner and pace enforcer need about available places
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    /// Capped, ordered candidate list
    pub candidates: Vec<CandidatePlace>,
    /// Canonical data for every supplied or already-scheduled title
    pub lookup: PlaceLookup,
    /// Titles an output visit may use
    pub allowed_titles: BTreeSet<String>,
}

impl Catalog {
    /// Build from supplied places and the itinerary currently in use.
    ///
    /// Places without coordinates are dropped. Supplied place data wins over
    /// data copied from the itinerary.
    pub fn build(places: &[CandidatePlace], current: &[Day], limit: usize) -> Self {
        let usable: Vec<CandidatePlace> = places.iter().filter(|p| p.has_coordinates()).cloned().collect();
        if usable.len() < places.len() {
            debug!(
                dropped = places.len() - usable.len(),
                "Catalog::build: dropped places without coordinates"
            );
        }

        let candidates = build_candidates(&usable, limit);

        let mut lookup = PlaceLookup::default();
        for place in &usable {
            lookup.insert_if_absent(&place.title, place.info());
        }

        let mut allowed_titles: BTreeSet<String> = candidates.iter().map(|c| c.title.clone()).collect();
        for visit in current.iter().flat_map(|d| d.visits.iter()) {
            let title = visit.place.trim();
            if title.is_empty() {
                continue;
            }
            lookup.insert_if_absent(title, PlaceInfo::from(visit));
            allowed_titles.insert(title.to_string());
        }

        debug!(
            candidates = candidates.len(),
            allowed = allowed_titles.len(),
            "Catalog::build: done"
        );
        Self {
            candidates,
            lookup,
            allowed_titles,
        }
    }
}
