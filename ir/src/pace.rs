//! Pace enforcement for freshly generated itineraries

use std::collections::HashSet;

use tracing::debug;

use crate::catalog::PlaceLookup;
use crate::model::{CandidatePlace, Day, Itinerary, PaceTarget, Visit, reindex};
use crate::normalize::normalize;

/// Bring every day's visit count within `target`.
///
/// Days are deduplicated by normalized place name and truncated to the
/// maximum, then days under the minimum are filled from `candidates`,
/// preferring places not yet used anywhere in the itinerary. Days and dates
/// are never added, removed, or changed. With no target the schedule is
/// returned as is.
pub fn enforce_pace(
    schedule: &[Day],
    target: Option<PaceTarget>,
    candidates: &[CandidatePlace],
    lookup: &PlaceLookup,
) -> Itinerary {
    let Some(target) = target else {
        return schedule.to_vec();
    };
    debug!(
        days = schedule.len(),
        min = target.min_visits,
        max = target.max_visits,
        candidates = candidates.len(),
        "enforce_pace: called"
    );

    let mut adjusted = schedule.to_vec();

    for day in adjusted.iter_mut() {
        let mut seen = HashSet::new();
        day.visits.retain(|v| {
            let key = normalize(&v.place);
            !key.is_empty() && seen.insert(key)
        });
        day.visits.truncate(target.max_visits);
    }

    let mut used: HashSet<String> = adjusted
        .iter()
        .flat_map(|d| d.visits.iter())
        .map(|v| normalize(&v.place))
        .collect();

    let titles: Vec<(&str, String)> = candidates
        .iter()
        .map(|c| c.title.trim())
        .filter(|t| !t.is_empty())
        .map(|t| (t, normalize(t)))
        .collect();

    for day in adjusted.iter_mut() {
        let mut seen: HashSet<String> = day.visits.iter().map(|v| normalize(&v.place)).collect();

        while day.visits.len() < target.min_visits {
            let chosen = titles
                .iter()
                .find(|(_, key)| !seen.contains(key) && !used.contains(key))
                .or_else(|| titles.iter().find(|(_, key)| !seen.contains(key)));
            let Some((title, key)) = chosen else {
                debug!(label = %day.label, visits = day.visits.len(), "enforce_pace: candidates exhausted");
                break;
            };

            day.visits.push(Visit::generic(title, &lookup.info_or_default(title)));
            seen.insert(key.clone());
            used.insert(key.clone());
        }
    }

    reindex(&mut adjusted);
    adjusted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::model::{GENERIC_ACTIVITY, Pace};
    use proptest::prelude::*;

    fn day(label: &str, places: &[&str]) -> Day {
        Day {
            label: label.to_string(),
            date: "2026-03-01".to_string(),
            visits: places
                .iter()
                .map(|p| Visit {
                    place: p.to_string(),
                    ..Default::default()
                })
                .collect(),
        }
    }

    fn candidates(titles: &[&str]) -> Vec<CandidatePlace> {
        titles
            .iter()
            .enumerate()
            .map(|(i, t)| CandidatePlace::new(*t, 35.0 + i as f64, 129.0).with_address(format!("addr {}", i)))
            .collect()
    }

    fn places(day: &Day) -> Vec<&str> {
        day.visits.iter().map(|v| v.place.as_str()).collect()
    }

    #[test]
    fn test_no_target_is_noop() {
        let schedule = vec![day("Day 1", &["A", "A", "B", "C", "D", "E", "F"])];
        assert_eq!(enforce_pace(&schedule, None, &[], &PlaceLookup::default()), schedule);
    }

    #[test]
    fn test_dedup_and_truncate() {
        let schedule = vec![day("Day 1", &["A", "a", " A", "B", "C", "D", "E", ""])];
        let out = enforce_pace(&schedule, Some(Pace::Relaxed.target()), &[], &PlaceLookup::default());
        assert_eq!(places(&out[0]), vec!["A", "B", "C"]);
        let orders: Vec<u32> = out[0].visits.iter().map(|v| v.order).collect();
        assert_eq!(orders, vec![1, 2, 3]);
    }

    #[test]
    fn test_fill_prefers_globally_unused() {
        let pool = candidates(&["A", "B", "C", "D"]);
        let catalog = Catalog::build(&pool, &[], 100);
        let schedule = vec![day("Day 1", &["A"]), day("Day 2", &["B"])];

        let out = enforce_pace(&schedule, Some(Pace::Relaxed.target()), &catalog.candidates, &catalog.lookup);

        assert_eq!(places(&out[0]), vec!["A", "C"]);
        assert_eq!(places(&out[1]), vec!["B", "D"]);
        let filler = &out[0].visits[1];
        assert_eq!(filler.activity, GENERIC_ACTIVITY);
        assert_eq!(filler.address, "addr 2");
        assert_eq!(filler.order, 2);
    }

    #[test]
    fn test_fill_falls_back_to_day_unused() {
        let pool = candidates(&["A", "B"]);
        let catalog = Catalog::build(&pool, &[], 100);
        let schedule = vec![day("Day 1", &["A"]), day("Day 2", &["B"])];

        let out = enforce_pace(&schedule, Some(Pace::Relaxed.target()), &catalog.candidates, &catalog.lookup);

        assert_eq!(places(&out[0]), vec!["A", "B"]);
        assert_eq!(places(&out[1]), vec!["B", "A"]);
    }

    #[test]
    fn test_stops_when_candidates_exhausted() {
        let pool = candidates(&["A"]);
        let schedule = vec![day("Day 1", &[]), day("Day 2", &["A"])];

        let out = enforce_pace(&schedule, Some(Pace::Packed.target()), &pool, &PlaceLookup::default());

        assert_eq!(places(&out[0]), vec!["A"]);
        assert_eq!(places(&out[1]), vec!["A"]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].date, "2026-03-01");
    }

    fn arb_schedule() -> impl Strategy<Value = Vec<Day>> {
        let names = ["A", "B", "C", "D", "E", "F", "a", " b "];
        prop::collection::vec(prop::collection::vec(0usize..names.len(), 0..8), 0..4).prop_map(move |days| {
            days.iter()
                .enumerate()
                .map(|(i, picks)| {
                    let chosen: Vec<&str> = picks.iter().map(|&p| names[p]).collect();
                    day(&Day::default_label(i), &chosen)
                })
                .collect()
        })
    }

    fn arb_pace() -> impl Strategy<Value = Pace> {
        prop_oneof![Just(Pace::Relaxed), Just(Pace::Normal), Just(Pace::Packed)]
    }

    proptest! {
        #[test]
        fn test_enforce_pace_is_idempotent(
            schedule in arb_schedule(),
            pace in arb_pace(),
            pool_size in 0usize..7,
        ) {
            let all = ["A", "B", "C", "D", "E", "F", "G"];
            let pool = candidates(&all[..pool_size]);
            let catalog = Catalog::build(&pool, &schedule, 100);
            let target = Some(pace.target());

            let once = enforce_pace(&schedule, target, &catalog.candidates, &catalog.lookup);
            let twice = enforce_pace(&once, target, &catalog.candidates, &catalog.lookup);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn test_enforce_pace_respects_bounds(
            schedule in arb_schedule(),
            pace in arb_pace(),
        ) {
            let pool = candidates(&["P1", "P2", "P3", "P4", "P5", "P6"]);
            let target = pace.target();

            let out = enforce_pace(&schedule, Some(target), &pool, &PlaceLookup::default());

            prop_assert_eq!(out.len(), schedule.len());
            for (day, original) in out.iter().zip(&schedule) {
                prop_assert_eq!(&day.date, &original.date);
                prop_assert!(day.visits.len() >= target.min_visits);
                prop_assert!(day.visits.len() <= target.max_visits);
                for (i, visit) in day.visits.iter().enumerate() {
                    prop_assert_eq!(visit.order as usize, i + 1);
                }
            }
        }
    }
}
