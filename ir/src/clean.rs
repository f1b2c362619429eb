//! Generated-schedule cleaning
//!
//! Turns an untrusted [`RawDay`] list into an [`Itinerary`] whose every visit
//! names a permitted title, whose orders are 1..N, and whose dates follow the
//! expected trip dates whenever those are known.

use std::collections::{BTreeSet, HashSet};

use tracing::debug;

use crate::catalog::PlaceLookup;
use crate::document::{RawDay, RawVisit};
use crate::model::{Day, Itinerary, Visit};
use crate::resolve::resolve_against_known_titles;

/// Clean a generated schedule.
///
/// * Visits whose place cannot be resolved against `allowed`, and repeats of a
///   title within one day, are dropped.
/// * Model-supplied address, image and coordinates are kept; blanks are filled
///   from `lookup`.
/// * A day's date comes from `expected_dates` when available, else from the
///   input, else from the same position in `fallback`.
/// * Days missing from `raw` but present in `fallback` are cleaned from the
///   fallback.
/// * With `expected_dates` non-empty the day count matches it exactly.
pub fn clean_schedule(
    raw: &[RawDay],
    expected_dates: &[String],
    fallback: &[Day],
    allowed: &BTreeSet<String>,
    lookup: &PlaceLookup,
) -> Itinerary {
    debug!(
        raw_days = raw.len(),
        expected_days = expected_dates.len(),
        fallback_days = fallback.len(),
        allowed = allowed.len(),
        "clean_schedule: called"
    );

    let mut cleaned: Itinerary = Vec::with_capacity(raw.len().max(expected_dates.len()));

    for (i, day) in raw.iter().enumerate() {
        let date = if let Some(expected) = expected_dates.get(i) {
            expected.clone()
        } else if !day.date.trim().is_empty() {
            day.date.trim().to_string()
        } else {
            fallback.get(i).map(|d| d.date.clone()).unwrap_or_default()
        };
        cleaned.push(Day {
            label: label_or_default(&day.label, i),
            date,
            visits: clean_visits(&day.visits, allowed, lookup),
        });
    }

    if cleaned.len() < fallback.len() {
        debug!(
            synthesized = fallback.len() - cleaned.len(),
            "clean_schedule: filling missing days from fallback"
        );
        for i in cleaned.len()..fallback.len() {
            let day = RawDay::from(&fallback[i]);
            let date = expected_dates.get(i).cloned().unwrap_or_else(|| day.date.clone());
            cleaned.push(Day {
                label: label_or_default(&day.label, i),
                date,
                visits: clean_visits(&day.visits, allowed, lookup),
            });
        }
    }

    if !expected_dates.is_empty() {
        if cleaned.len() > expected_dates.len() {
            debug!(
                dropped = cleaned.len() - expected_dates.len(),
                "clean_schedule: trimming days past the trip end"
            );
            cleaned.truncate(expected_dates.len());
        }
        while cleaned.len() < expected_dates.len() {
            let i = cleaned.len();
            cleaned.push(Day::new(Day::default_label(i), expected_dates[i].clone()));
        }
        for (day, date) in cleaned.iter_mut().zip(expected_dates) {
            day.date = date.clone();
        }
    }

    cleaned
}

fn label_or_default(label: &str, index: usize) -> String {
    let label = label.trim();
    if label.is_empty() {
        Day::default_label(index)
    } else {
        label.to_string()
    }
}

fn clean_visits(raw: &[RawVisit], allowed: &BTreeSet<String>, lookup: &PlaceLookup) -> Vec<Visit> {
    let mut seen = HashSet::new();
    let mut visits = Vec::new();

    for item in raw {
        let Some(title) = resolve_against_known_titles(&item.place, allowed) else {
            debug!(place = %item.place, "clean_visits: unresolved place dropped");
            continue;
        };
        if !seen.insert(title.clone()) {
            continue;
        }

        let mut visit = Visit {
            order: (visits.len() + 1) as u32,
            place: title,
            description: item.description.clone(),
            activity: item.activity.clone(),
            address: item.address.clone(),
            image: item.image.clone(),
            latitude: item.latitude,
            longitude: item.longitude,
        };
        if let Some(info) = lookup.get(&visit.place) {
            visit.backfill(info);
        }
        visits.push(visit);
    }
    visits
}
