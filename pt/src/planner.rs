//! Planning orchestration
//!
//! Routes one [`PlanRequest`] through the local edit path or the generative
//! path, and substitutes safe responses when generation fails.

use std::sync::Arc;

use itinerary::{
    CandidatePlace, Catalog, Itinerary, apply_edit_locally, clean_schedule, enforce_pace, expected_dates,
    needs_candidates, wants_local_edit,
};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::llm::{self, CompletionRequest, LlmClient, LlmError, Message};
use crate::places::{self, PlaceError, PlaceSource, TourApiClient};
use crate::prompt::Prompt;
use crate::request::{PlanRequest, PlanResponse};

pub const NO_CANDIDATES_TEXT: &str = "No places with map coordinates were found for this region.";
pub const GENERATED_TEXT: &str = "Created an itinerary from your request.";
pub const EDITED_TEXT: &str = "Updated the itinerary as requested.";
pub const GENERATION_FAILED_TEXT: &str = "Something went wrong while generating the itinerary. Please try again.";
pub const EDIT_FAILED_TEXT: &str =
    "Something went wrong while applying your request, so the current itinerary was kept. Please try again.";

/// Errors surfaced by the planner
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Place lookup failed: {0}")]
    Places(#[from] PlaceError),

    #[error("Itinerary generation failed: {0}")]
    Generation(#[from] LlmError),
}

/// Plans and edits itineraries
pub struct Planner {
    config: Config,
    llm: Arc<dyn LlmClient>,
    places: Arc<dyn PlaceSource>,
}

impl Planner {
    pub fn new(config: Config, llm: Arc<dyn LlmClient>, places: Arc<dyn PlaceSource>) -> Self {
        Self { config, llm, places }
    }

    /// Build a planner with real service clients.
    ///
    /// Fails with [`PlanError::Config`] before any network traffic when a
    /// credential is missing.
    pub fn from_config(config: Config) -> Result<Self, PlanError> {
        debug!("Planner::from_config: called");
        config.validate().map_err(|e| PlanError::Config(e.to_string()))?;

        let llm = llm::create_client(&config.llm).map_err(|e| PlanError::Config(e.to_string()))?;
        let places: Arc<dyn PlaceSource> = Arc::new(
            TourApiClient::from_config(&config.places).map_err(|e| PlanError::Config(e.to_string()))?,
        );
        Ok(Self::new(config, llm, places))
    }

    /// Answer one planning request
    pub async fn plan(&self, request: &PlanRequest) -> Result<PlanResponse, PlanError> {
        let base = request.base_schedule();
        let edit_mode = !base.is_empty();
        let request_id = Uuid::now_v7();
        debug!(%request_id, edit_mode, region = %request.region, "plan: called");

        let mut fetched: Option<Vec<CandidatePlace>> = None;

        if edit_mode && wants_local_edit(&request.user_input) {
            let places = if needs_candidates(&request.user_input) {
                let found = self.fetch_candidates(request).await?;
                fetched = Some(found.clone());
                found
            } else {
                debug!("plan: nothing to add, offering scheduled places only");
                Vec::new()
            };

            if let Some(outcome) = apply_edit_locally(&request.user_input, base, &places) {
                info!(
                    %request_id,
                    removed = outcome.removed.len(),
                    added = outcome.added.len(),
                    missed = outcome.missed.len(),
                    "plan: local edit applied"
                );
                return Ok(PlanResponse::new(outcome.summary, outcome.itinerary));
            }
            debug!("plan: local edit not applicable, regenerating");
        }

        let places = match fetched {
            Some(places) => places,
            None => self.fetch_candidates(request).await?,
        };
        if places.is_empty() && !edit_mode {
            info!(%request_id, region = %request.region, "plan: no candidates");
            return Ok(PlanResponse::new(NO_CANDIDATES_TEXT, Vec::new()));
        }

        match self.generate(request, &places).await {
            Ok(response) => Ok(response),
            Err(PlanError::Generation(e)) => {
                warn!(%request_id, error = %e, edit_mode, "plan: generation failed, returning fallback");
                Ok(if edit_mode {
                    PlanResponse::new(EDIT_FAILED_TEXT, base.to_vec())
                } else {
                    PlanResponse::new(GENERATION_FAILED_TEXT, Vec::new())
                })
            }
            Err(e) => Err(e),
        }
    }

    async fn fetch_candidates(&self, request: &PlanRequest) -> Result<Vec<CandidatePlace>, PlanError> {
        let places = places::gather_candidates(
            self.places.as_ref(),
            &request.region,
            &request.travel_types(),
            &self.config.places,
        )
        .await?;
        Ok(places)
    }

    async fn generate(&self, request: &PlanRequest, places: &[CandidatePlace]) -> Result<PlanResponse, PlanError> {
        let base = request.base_schedule();
        let edit_mode = !base.is_empty();
        let dates = expected_dates(&request.date, self.config.planner.max_days);
        let catalog = Catalog::build(places, base, self.config.planner.candidate_limit);
        debug!(
            edit_mode,
            days = dates.len(),
            candidates = catalog.candidates.len(),
            "generate: called"
        );

        let prompt = Prompt::build(request, &catalog.candidates, &dates);
        let completion = CompletionRequest {
            system_prompt: prompt.system.clone(),
            messages: vec![Message::user(prompt.user_message())],
            max_tokens: self.config.llm.max_tokens,
            temperature: Some(self.config.llm.temperature),
        };

        let plan = llm::generate_plan(self.llm.as_ref(), completion, self.config.llm.retries).await?;

        let mut schedule: Itinerary =
            clean_schedule(&plan.days, &dates, base, &catalog.allowed_titles, &catalog.lookup);
        if !edit_mode {
            let target = request.pace().map(|p| p.target());
            schedule = enforce_pace(&schedule, target, &catalog.candidates, &catalog.lookup);
        }

        let text = plan
            .text
            .unwrap_or_else(|| if edit_mode { EDITED_TEXT } else { GENERATED_TEXT }.to_string());
        info!(days = schedule.len(), edit_mode, "generate: itinerary ready");
        Ok(PlanResponse::new(text, schedule))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::mock::MockLlmClient;
    use crate::places::mock::StaticPlaceSource;
    use itinerary::{Day, Visit};

    fn busan_places() -> Vec<CandidatePlace> {
        vec![
            CandidatePlace::new("해운대해수욕장", 35.1587, 129.1604).with_image("haeundae.jpg"),
            CandidatePlace::new("광안리해수욕장", 35.1532, 129.1186).with_image("gwangalli.jpg"),
            CandidatePlace::new("감천문화마을", 35.0975, 129.0106).with_address("부산 사하구"),
            CandidatePlace::new("자갈치시장", 35.0966, 129.0306),
            CandidatePlace::new("태종대", 35.0532, 129.0870),
            CandidatePlace::new("해동용궁사", 35.1884, 129.2233),
            CandidatePlace::new("국제시장", 35.1010, 129.0286),
            CandidatePlace::new("흰여울문화마을", 35.0781, 129.0445),
            CandidatePlace::new("송도해상케이블카", 35.0760, 129.0170),
            CandidatePlace::new("부산시민공원", 35.1686, 129.0573),
        ]
    }

    fn visit(place: &str) -> Visit {
        Visit {
            order: 1,
            place: place.to_string(),
            latitude: 35.1,
            longitude: 129.1,
            ..Default::default()
        }
    }

    fn current() -> Itinerary {
        vec![
            Day {
                label: "Day 1".to_string(),
                date: "2025-12-09".to_string(),
                visits: vec![visit("해운대해수욕장")],
            },
            Day {
                label: "Day 2".to_string(),
                date: "2025-12-10".to_string(),
                visits: vec![visit("광안리해수욕장")],
            },
        ]
    }

    fn request(user_input: &str, schedule: Option<Itinerary>) -> PlanRequest {
        PlanRequest {
            user_input: user_input.to_string(),
            date: "2025. 12. 09 ~ 2025. 12. 10".to_string(),
            region: "부산".to_string(),
            pace: "보통".to_string(),
            current_schedule: schedule,
            ..Default::default()
        }
    }

    fn planner(llm: Arc<MockLlmClient>, places: Arc<StaticPlaceSource>) -> Planner {
        Planner::new(Config::default(), llm, places)
    }

    #[tokio::test]
    async fn test_local_removal_skips_services() {
        let llm = Arc::new(MockLlmClient::new(vec![]));
        let places = Arc::new(StaticPlaceSource::new(busan_places()));
        let planner = planner(llm.clone(), places.clone());

        let response = planner.plan(&request("해운대 빼줘", Some(current()))).await.unwrap();

        assert!(response.travel_schedule[0].visits.is_empty());
        assert_eq!(response.travel_schedule[1].visits[0].place, "광안리해수욕장");
        assert!(response.text.contains("해운대"));
        assert_eq!(llm.call_count(), 0);
        assert!(places.queries().is_empty());
    }

    #[tokio::test]
    async fn test_local_addition_fetches_places() {
        let llm = Arc::new(MockLlmClient::new(vec![]));
        let places = Arc::new(StaticPlaceSource::new(busan_places()));
        let planner = planner(llm.clone(), places.clone());

        let response = planner
            .plan(&request("2일차에 감천문화마을 추가해줘", Some(current())))
            .await
            .unwrap();

        let day2: Vec<&str> = response.travel_schedule[1]
            .visits
            .iter()
            .map(|v| v.place.as_str())
            .collect();
        assert_eq!(day2, vec!["광안리해수욕장", "감천문화마을"]);
        assert_eq!(response.travel_schedule[1].visits[1].address, "부산 사하구");
        assert_eq!(llm.call_count(), 0);
        assert!(!places.queries().is_empty());
    }

    #[tokio::test]
    async fn test_local_replace_fetches_new_place() {
        let llm = Arc::new(MockLlmClient::new(vec![]));
        let places = Arc::new(StaticPlaceSource::new(vec![
            CandidatePlace::new("해운대해수욕장", 35.1587, 129.1604),
            CandidatePlace::new("감천문화마을", 35.0975, 129.0106).with_address("부산 사하구"),
        ]));
        let planner = planner(llm.clone(), places.clone());

        let response = planner
            .plan(&request("해운대를 감천문화마을로 바꿔줘", Some(current())))
            .await
            .unwrap();

        let all: Vec<&str> = response
            .travel_schedule
            .iter()
            .flat_map(|d| d.visits.iter().map(|v| v.place.as_str()))
            .collect();
        assert!(!all.contains(&"해운대해수욕장"));
        assert!(all.contains(&"감천문화마을"));
        assert!(response.text.contains("'감천문화마을'"));
        assert!(!response.text.contains("Not applied"));
        assert_eq!(llm.call_count(), 0);
        assert!(!places.queries().is_empty());

        let english = planner
            .plan(&request("replace 광안리 with 감천문화마을 on day 2", Some(current())))
            .await
            .unwrap();
        let day2: Vec<&str> = english.travel_schedule[1].visits.iter().map(|v| v.place.as_str()).collect();
        assert_eq!(day2, vec!["감천문화마을"]);
        assert_eq!(english.travel_schedule[1].visits[0].address, "부산 사하구");
    }

    #[tokio::test]
    async fn test_generation_cleans_and_paces() {
        let reply = r#"Here you go:
{"text": "부산 바다 여행",
 "travelSchedule": [
   {"day": "Day 1", "date": "1999-01-01", "plan": [
     {"order": 3, "place": "해운대", "description": "산책"},
     {"order": 1, "place": "롯데월드", "description": "not a candidate"},
     {"order": 2, "place": "해운대해수욕장"}
   ]},
   {"day": "Day 2", "plan": [
     {"place": "감천문화마을"}, {"place": "자갈치시장"}, {"place": "태종대"},
     {"place": "국제시장"}, {"place": "흰여울문화마을"}
   ]},
   {"day": "Day 3", "plan": [{"place": "해동용궁사"}]}
 ]}"#;
        let llm = Arc::new(MockLlmClient::with_texts(&[reply]));
        let places = Arc::new(StaticPlaceSource::new(busan_places()));
        let planner = planner(llm.clone(), places);

        let response = planner.plan(&request("바다 보고 싶어", None)).await.unwrap();
        let schedule = &response.travel_schedule;

        assert_eq!(response.text, "부산 바다 여행");
        assert_eq!(schedule.len(), 2);
        assert_eq!(schedule[0].date, "2025-12-09");
        assert_eq!(schedule[1].date, "2025-12-10");
        assert_eq!(schedule[0].visits[0].place, "해운대해수욕장");
        assert_eq!(schedule[0].visits[0].image, "haeundae.jpg");
        assert_eq!(schedule[0].visits.len(), 3);
        assert_eq!(schedule[1].visits.len(), 4);
        for day in schedule {
            for (i, visit) in day.visits.iter().enumerate() {
                assert_eq!(visit.order as usize, i + 1);
            }
        }
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_generation_failure_returns_empty_schedule() {
        let llm = Arc::new(MockLlmClient::with_texts(&["no json", "still no json"]));
        let places = Arc::new(StaticPlaceSource::new(busan_places()));
        let planner = planner(llm.clone(), places);

        let response = planner.plan(&request("바다 보고 싶어", None)).await.unwrap();

        assert_eq!(response.text, GENERATION_FAILED_TEXT);
        assert!(response.travel_schedule.is_empty());
        assert_eq!(llm.call_count(), 2);
    }

    #[tokio::test]
    async fn test_edit_failure_keeps_current_itinerary() {
        let llm = Arc::new(MockLlmClient::new(vec![]));
        let places = Arc::new(StaticPlaceSource::new(busan_places()));
        let planner = planner(llm, places);

        let response = planner
            .plan(&request("make the second day feel calmer", Some(current())))
            .await
            .unwrap();

        assert_eq!(response.text, EDIT_FAILED_TEXT);
        assert_eq!(response.travel_schedule, current());
    }

    #[tokio::test]
    async fn test_replan_goes_to_generation() {
        let reply = r#"{"travelSchedule": [{"plan": [{"place": "태종대"}]}]}"#;
        let llm = Arc::new(MockLlmClient::with_texts(&[reply]));
        let places = Arc::new(StaticPlaceSource::new(busan_places()));
        let planner = planner(llm.clone(), places);

        let response = planner
            .plan(&request("처음부터 다시 짜고 해운대는 빼줘", Some(current())))
            .await
            .unwrap();

        assert_eq!(llm.call_count(), 1);
        assert_eq!(response.text, EDITED_TEXT);
        assert_eq!(response.travel_schedule.len(), 2);
        assert_eq!(response.travel_schedule[0].visits[0].place, "태종대");
        // Day 2 is filled in from the current itinerary; no pace fill in edit mode
        assert_eq!(response.travel_schedule[1].visits.len(), 1);
        assert_eq!(response.travel_schedule[1].visits[0].place, "광안리해수욕장");
    }

    #[tokio::test]
    async fn test_no_candidates() {
        let llm = Arc::new(MockLlmClient::new(vec![]));
        let places = Arc::new(StaticPlaceSource::new(vec![]));
        let planner = planner(llm.clone(), places);

        let response = planner.plan(&request("아무거나", None)).await.unwrap();

        assert_eq!(response.text, NO_CANDIDATES_TEXT);
        assert!(response.travel_schedule.is_empty());
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_edit_prompt_carries_base_schedule() {
        let reply = r#"{"travelSchedule": []}"#;
        let llm = Arc::new(MockLlmClient::with_texts(&[reply]));
        let places = Arc::new(StaticPlaceSource::new(busan_places()));
        let planner = planner(llm.clone(), places);

        planner
            .plan(&request("make the second day feel calmer", Some(current())))
            .await
            .unwrap();

        let sent = llm.requests();
        assert_eq!(sent.len(), 1);
        let payload: serde_json::Value = serde_json::from_str(&sent[0].messages[0].content).unwrap();
        assert_eq!(payload["editRequest"], "make the second day feel calmer");
        assert_eq!(payload["baseSchedule"][1]["plan"][0]["place"], "광안리해수욕장");
    }
}
