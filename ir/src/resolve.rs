//! Fuzzy place resolution
//!
//! Matches user-typed terms and model-generated titles against a known set of
//! places. Everything compares on [`normalize`]d keys, so spacing and case
//! never decide a match.

use std::collections::BTreeSet;

use tracing::debug;

use crate::model::CandidatePlace;
use crate::normalize::normalize;

/// Score for an exact normalized title match
pub const SCORE_EXACT: u32 = 100;

/// Score for a title containing the term, or the term containing the title
pub const SCORE_SUBSTRING: u32 = 80;

/// Score for an address containing the term
pub const SCORE_ADDRESS: u32 = 60;

/// Region suffixes a user may tack onto a name ("해운대 지역", "Haeundae area")
const REGION_SUFFIXES: [&str; 3] = ["지역", "area", "region"];

/// Normalized search keys for a term: the term itself, plus the term with a
/// trailing region suffix removed when something is left over
pub fn term_variants(term: &str) -> Vec<String> {
    let key = normalize(term);
    if key.is_empty() {
        return Vec::new();
    }

    let mut variants = vec![key.clone()];
    for suffix in REGION_SUFFIXES {
        if let Some(stem) = key.strip_suffix(suffix)
            && !stem.is_empty()
        {
            variants.push(stem.to_string());
        }
    }
    variants
}

/// True when the term names this place, either through the title
/// (containment in either direction) or through the address
pub fn matches_term(term: &str, place: &str, address: &str) -> bool {
    let place_key = normalize(place);
    let address_key = normalize(address);

    term_variants(term).iter().any(|v| {
        (!place_key.is_empty() && (place_key.contains(v.as_str()) || v.contains(place_key.as_str())))
            || (!address_key.is_empty() && address_key.contains(v.as_str()))
    })
}

/// Map a raw title onto a permitted title.
///
/// Exact match first, then normalized equality, then containment in either
/// direction. Iteration follows the set's sorted order, so the result is
/// stable for a given universe. Callers scope `allowed` to the titles the
/// output may use; anything outside it can never come back.
pub fn resolve_against_known_titles(raw: &str, allowed: &BTreeSet<String>) -> Option<String> {
    let title = raw.trim();
    if title.is_empty() {
        return None;
    }
    if allowed.contains(title) {
        return Some(title.to_string());
    }

    let key = normalize(title);
    if let Some(hit) = allowed.iter().find(|t| normalize(t) == key) {
        debug!(%raw, %hit, "resolve_against_known_titles: normalized match");
        return Some(hit.clone());
    }

    let hit = allowed.iter().find(|t| {
        let candidate = normalize(t);
        !candidate.is_empty() && (candidate.contains(key.as_str()) || key.contains(candidate.as_str()))
    });
    debug!(%raw, ?hit, "resolve_against_known_titles: containment pass");
    hit.cloned()
}

/// Score one candidate against a set of variants, 0 when nothing matches
fn score_candidate(variants: &[String], place: &CandidatePlace) -> u32 {
    let title_key = normalize(&place.title);
    if title_key.is_empty() {
        return 0;
    }
    let address_key = normalize(&place.address);

    variants
        .iter()
        .map(|v| {
            if *v == title_key {
                SCORE_EXACT
            } else if title_key.contains(v.as_str()) || v.contains(title_key.as_str()) {
                SCORE_SUBSTRING
            } else if !address_key.is_empty() && address_key.contains(v.as_str()) {
                SCORE_ADDRESS
            } else {
                0
            }
        })
        .max()
        .unwrap_or(0)
}

/// Pick the best candidate for a term.
///
/// Highest score wins; on equal score a candidate with an image wins; on a
/// full tie the earliest candidate in `places` wins.
pub fn pick_candidate_for_term<'a>(term: &str, places: &'a [CandidatePlace]) -> Option<&'a CandidatePlace> {
    debug!(%term, place_count = places.len(), "pick_candidate_for_term: called");
    let variants = term_variants(term);
    if variants.is_empty() {
        return None;
    }

    let mut best: Option<((u32, bool), &CandidatePlace)> = None;
    for place in places {
        let score = score_candidate(&variants, place);
        if score == 0 {
            continue;
        }
        let rank = (score, !place.image.trim().is_empty());
        match best {
            Some((best_rank, _)) if best_rank >= rank => {}
            _ => best = Some((rank, place)),
        }
    }

    debug!(picked = ?best.map(|(_, p)| &p.title), "pick_candidate_for_term: done");
    best.map(|(_, p)| p)
}
