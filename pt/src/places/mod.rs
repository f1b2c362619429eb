//! Place-data service module
//!
//! Candidate places come from the Korea Tourism Organization's TourAPI.
//! This module maps user-facing region and travel-type labels to the
//! service's codes, defines the [`PlaceSource`] seam, and gathers a
//! deduplicated candidate list for one planning request.

use std::collections::HashSet;

use async_trait::async_trait;
use futures::future::try_join_all;
use itinerary::{CandidatePlace, normalize};
use thiserror::Error;
use tracing::{debug, info};

mod tourapi;

pub use tourapi::TourApiClient;

use crate::config::PlacesConfig;

/// Errors raised while fetching candidate places
#[derive(Debug, Error)]
pub enum PlaceError {
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Malformed payload: {0}")]
    Malformed(String),
}

/// One area-based listing request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceQuery {
    pub area_code: u32,
    pub content_type_id: Option<u32>,
    pub rows: u32,
}

/// Anything that can list coordinate-bearing places for an area
#[async_trait]
pub trait PlaceSource: Send + Sync {
    async fn area_based_list(&self, query: PlaceQuery) -> Result<Vec<CandidatePlace>, PlaceError>;
}

const AREA_CODES: &[(&str, u32)] = &[
    ("서울", 1),
    ("인천", 2),
    ("대전", 3),
    ("대구", 4),
    ("광주", 5),
    ("부산", 6),
    ("울산", 7),
    ("세종", 8),
    ("경기", 31),
    ("강원", 32),
    ("충북", 33),
    ("충남", 34),
    ("경북", 35),
    ("경남", 36),
    ("전북", 37),
    ("전남", 38),
    ("제주", 39),
    ("seoul", 1),
    ("incheon", 2),
    ("daejeon", 3),
    ("daegu", 4),
    ("gwangju", 5),
    ("busan", 6),
    ("ulsan", 7),
    ("sejong", 8),
    ("gyeonggi", 31),
    ("gangwon", 32),
    ("chungbuk", 33),
    ("chungnam", 34),
    ("gyeongbuk", 35),
    ("gyeongnam", 36),
    ("jeonbuk", 37),
    ("jeonnam", 38),
    ("jeju", 39),
];

const CONTENT_TYPES: &[(&str, u32)] = &[
    ("관광", 12),
    ("관광지", 12),
    ("문화시설", 14),
    ("축제", 15),
    ("공연", 15),
    ("행사", 15),
    ("축제/공연/행사", 15),
    ("숙박", 32),
    ("쇼핑", 38),
    ("음식점", 39),
    ("맛집", 39),
    ("sightseeing", 12),
    ("tourism", 12),
    ("culture", 14),
    ("festival", 15),
    ("event", 15),
    ("lodging", 32),
    ("accommodation", 32),
    ("shopping", 38),
    ("restaurant", 39),
    ("food", 39),
];

/// TourAPI area code for a region label, `default` when unknown
pub fn area_code_for(region: &str, default: u32) -> u32 {
    let key = normalize(region);
    AREA_CODES
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, code)| *code)
        .unwrap_or(default)
}

/// TourAPI content type id for a travel-type label; spacing and case are ignored
pub fn content_type_for(label: &str) -> Option<u32> {
    let key = normalize(label);
    CONTENT_TYPES.iter().find(|(name, _)| *name == key).map(|(_, id)| *id)
}

/// Distinct content type ids for the given labels, in first-seen order
pub fn content_types_for(labels: &[String]) -> Vec<u32> {
    let mut ids = Vec::new();
    for id in labels.iter().filter_map(|l| content_type_for(l)) {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

/// Drop repeats by external id, else by `title|lat|lng`
pub fn dedup_places(places: Vec<CandidatePlace>) -> Vec<CandidatePlace> {
    let mut seen = HashSet::new();
    places
        .into_iter()
        .filter(|p| {
            let key = match &p.external_id {
                Some(id) if !id.is_empty() => id.clone(),
                _ => format!("{}|{}|{}", p.title, p.latitude, p.longitude),
            };
            seen.insert(key)
        })
        .collect()
}

/// Collect candidates for a region and travel types.
///
/// One query per recognized content type (issued concurrently, merged in
/// type order), or one broad query when none is recognized; a thin result is widened with a larger broad query.
pub async fn gather_candidates(
    source: &dyn PlaceSource,
    region: &str,
    travel_types: &[String],
    config: &PlacesConfig,
) -> Result<Vec<CandidatePlace>, PlaceError> {
    let area_code = area_code_for(region, config.default_area_code);
    let content_types = content_types_for(travel_types);
    debug!(%region, area_code, ?content_types, "gather_candidates: called");

    let mut places = Vec::new();
    if content_types.is_empty() {
        places = source
            .area_based_list(PlaceQuery {
                area_code,
                content_type_id: None,
                rows: config.rows_broad,
            })
            .await?;
    } else {
        let queries = content_types.into_iter().map(|content_type_id| {
            source.area_based_list(PlaceQuery {
                area_code,
                content_type_id: Some(content_type_id),
                rows: config.rows_per_type,
            })
        });
        for found in try_join_all(queries).await? {
            places.extend(found);
        }
    }
    let mut places = dedup_places(places);

    if places.len() < config.min_candidates {
        debug!(found = places.len(), "gather_candidates: widening search");
        let wider = source
            .area_based_list(PlaceQuery {
                area_code,
                content_type_id: None,
                rows: config.rows_widen,
            })
            .await?;
        places.extend(wider);
        places = dedup_places(places);
    }

    info!(%region, count = places.len(), "gather_candidates: done");
    Ok(places)
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    /// In-memory place source; answers every query from a fixed list
    pub struct StaticPlaceSource {
        places: Vec<CandidatePlace>,
        by_type: Vec<(u32, Vec<CandidatePlace>)>,
        queries: Mutex<Vec<PlaceQuery>>,
    }

    impl StaticPlaceSource {
        pub fn new(places: Vec<CandidatePlace>) -> Self {
            Self {
                places,
                by_type: Vec::new(),
                queries: Mutex::new(Vec::new()),
            }
        }

        /// Answer queries for `content_type_id` with `places` instead
        pub fn with_type(mut self, content_type_id: u32, places: Vec<CandidatePlace>) -> Self {
            self.by_type.push((content_type_id, places));
            self
        }

        pub fn queries(&self) -> Vec<PlaceQuery> {
            self.queries.lock().map(|q| q.clone()).unwrap_or_default()
        }
    }

    #[async_trait]
    impl PlaceSource for StaticPlaceSource {
        async fn area_based_list(&self, query: PlaceQuery) -> Result<Vec<CandidatePlace>, PlaceError> {
            if let Ok(mut seen) = self.queries.lock() {
                seen.push(query);
            }
            let typed = query
                .content_type_id
                .and_then(|id| self.by_type.iter().find(|(t, _)| *t == id))
                .map(|(_, places)| places.clone());
            let mut places = typed.unwrap_or_else(|| self.places.clone());
            places.truncate(query.rows as usize);
            Ok(places)
        }
    }
}
